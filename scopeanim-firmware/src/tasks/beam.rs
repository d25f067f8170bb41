//! Beam release task
//!
//! Runs on the high-priority interrupt executor so the release lands while
//! the player is still writing the rest of the frame.
//!
//! This task owns the release: the beam gate only arms and disarms it, and
//! disabling the gate sends a disarm that cancels a pending expiry.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Duration, Timer};

use scopeanim_hal::OutputPin;

use crate::board::SharedZ;
use crate::channels::{BeamCommand, BEAM_TIMER};

#[embassy_executor::task]
pub async fn beam_task(settle: Duration) {
    info!("Beam task started, settle {} us", settle.as_micros());

    let mut z = SharedZ;

    loop {
        let mut command = BEAM_TIMER.wait().await;

        while command == BeamCommand::Arm {
            match select(Timer::after(settle), BEAM_TIMER.wait()).await {
                // A command that raced the expiry wins
                Either::First(()) => match BEAM_TIMER.try_take() {
                    Some(next) => command = next,
                    None => {
                        z.set_high();
                        break;
                    }
                },
                Either::Second(next) => command = next,
            }
        }
    }
}
