//! Frame tick task
//!
//! Raises the frame tick flag at the rate the player programs. A new rate
//! restarts the period; `None` parks the task until the next start.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Ticker};

use crate::channels::{FRAME_RATE, FRAME_TICK, PLAYER_WAKE};

#[embassy_executor::task]
pub async fn frame_tick_task() {
    info!("Frame tick task started");

    let mut rate = None;

    loop {
        let Some(fps) = rate else {
            rate = FRAME_RATE.wait().await;
            continue;
        };

        debug!("Frame timer at {} Hz", fps);
        let mut ticker = Ticker::every(Duration::from_hz(u64::from(fps.max(1))));

        rate = loop {
            match select(ticker.next(), FRAME_RATE.wait()).await {
                Either::First(()) => {
                    FRAME_TICK.raise();
                    PLAYER_WAKE.signal(());
                }
                Either::Second(next) => break next,
            }
        };

        if rate.is_none() {
            debug!("Frame timer stopped");
        }
    }
}
