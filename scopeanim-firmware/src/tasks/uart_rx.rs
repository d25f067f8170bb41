//! Host UART receive task
//!
//! Moves bytes from the UART driver into the receive ring as they arrive.
//! Decoding happens in the player task; this side never blocks on it.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embedded_io_async::Read;

use scopeanim_protocol::{RxProducer, RX_RING_SIZE};

use crate::board::UART_READ_CHUNK;
use crate::channels::PLAYER_WAKE;

#[embassy_executor::task]
pub async fn uart_rx_task(mut rx: BufferedUartRx, mut ring: RxProducer<'static, RX_RING_SIZE>) {
    info!("UART RX task started");

    let mut buf = [0u8; UART_READ_CHUNK];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                let accepted = ring.push_slice(&buf[..n]);
                if accepted < n {
                    trace!("RX ring full, dropped {} bytes", n - accepted);
                }
                PLAYER_WAKE.signal(());
            }
            Ok(_) => {}
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
