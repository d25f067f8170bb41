//! Player task
//!
//! Owns the runtime: decoder, playback state and the output stage. Wakes on
//! received bytes or frame ticks and runs one service pass per wake.

use defmt::*;

use scopeanim_core::ServiceReport;
use scopeanim_protocol::{CommandCode, DecodeStats};

use crate::board::BoardRuntime;
use crate::channels::PLAYER_WAKE;

#[embassy_executor::task]
pub async fn player_task(runtime: &'static mut BoardRuntime) {
    info!("Player task started");

    let mut last_stats = runtime.stats();

    loop {
        PLAYER_WAKE.wait().await;

        let report = runtime.service();
        if report.is_eventful() {
            log_report(&report, &last_stats);
        }
        last_stats = report.stats;
    }
}

fn log_report(report: &ServiceReport, last: &DecodeStats) {
    match report.last_command {
        Some(CommandCode::PowerOn) => info!("Power on"),
        Some(CommandCode::PowerOff) => info!("Power off"),
        Some(code) => debug!("Applied {} packet(s), last {:?}", report.dispatched, code),
        None => {}
    }

    if let Some(err) = report.last_rejection {
        warn!("Rejected {} packet(s), last: {:?}", report.rejected, err);
    }

    if report.discarded > 0 {
        let stats = &report.stats;
        let framing = stats.framing_errors.wrapping_sub(last.framing_errors);
        let bad_tags = stats.bad_tags.wrapping_sub(last.bad_tags);
        let truncated = stats.truncated.wrapping_sub(last.truncated);
        let oversized = stats.oversized.wrapping_sub(last.oversized);
        warn!(
            "Discarded: framing={} bad_tag={} truncated={} oversized={}",
            framing, bad_tags, truncated, oversized
        );
    }

    if report.overflowed > 0 {
        warn!("RX ring overflow, {} bytes dropped", report.overflowed);
    }

    if report.ticks_elapsed > 1 {
        debug!("{} frame ticks coalesced", report.ticks_elapsed);
    }

    if let Some(tick) = report.tick {
        if let Some(next) = tick.advanced_to {
            trace!("Frame {} -> {}", tick.frame, next);
        }
        if tick.output_errors > 0 {
            warn!("{} point writes failed", tick.output_errors);
        }
    }
}
