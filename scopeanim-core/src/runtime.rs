//! Cooperative main loop
//!
//! One [`Runtime::service`] call is one pass of the controller's main loop:
//! render if the frame timer fired, then drain every complete packet from
//! the decode session through the dispatcher. Nothing here blocks; the
//! caller decides how to wait between passes.

use scopeanim_protocol::{CommandCode, DecodeSession, DecodeStats, MAX_PACKET_SIZE};

use crate::dispatch::{dispatch, DispatchError};
use crate::playback::{PlaybackContext, TickReport};
use crate::timing::TickFlag;
use crate::traits::{CoordinateOutput, FrameTimer, StatusIndicator};

/// What one pass of the main loop did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServiceReport {
    /// Set when the frame timer fired and the player was running
    pub tick: Option<TickReport>,
    /// Ticks that elapsed since the previous pass; more than one means some were coalesced
    pub ticks_elapsed: u32,
    /// Packets applied
    pub dispatched: u16,
    /// Packets decoded but rejected
    pub rejected: u16,
    /// Most recent command applied
    pub last_command: Option<CommandCode>,
    /// Most recent rejection
    pub last_rejection: Option<DispatchError>,
    /// Bytes the receive ring dropped since the previous pass
    pub overflowed: u32,
    /// Candidates the decoder discarded since the previous pass
    pub discarded: u32,
    /// Decoder counters after this pass
    pub stats: DecodeStats,
}

impl ServiceReport {
    /// True if anything worth logging happened
    pub fn is_eventful(&self) -> bool {
        self.dispatched > 0
            || self.rejected > 0
            || self.overflowed > 0
            || self.discarded > 0
            || self.ticks_elapsed > 1
    }
}

/// Main-loop state: decode session, playback context and tick flag
pub struct Runtime<'a, const N: usize, O, T, L> {
    session: DecodeSession<'a, N, MAX_PACKET_SIZE>,
    player: PlaybackContext<O, T, L>,
    tick: &'a TickFlag,
    overflows_seen: u32,
    discarded_seen: u32,
}

impl<'a, const N: usize, O, T, L> Runtime<'a, N, O, T, L>
where
    O: CoordinateOutput,
    T: FrameTimer,
    L: StatusIndicator,
{
    pub fn new(
        session: DecodeSession<'a, N, MAX_PACKET_SIZE>,
        player: PlaybackContext<O, T, L>,
        tick: &'a TickFlag,
    ) -> Self {
        let overflows_seen = session.overflow_count();
        let discarded_seen = session.stats().discarded();
        Self {
            session,
            player,
            tick,
            overflows_seen,
            discarded_seen,
        }
    }

    /// Run the player's boot sequence
    pub fn start(&mut self) -> Result<(), O::Error> {
        self.player.start()
    }

    /// One non-blocking pass of the main loop
    pub fn service(&mut self) -> ServiceReport {
        let mut report = ServiceReport {
            ticks_elapsed: self.tick.take_count(),
            ..ServiceReport::default()
        };
        if report.ticks_elapsed > 0 {
            report.tick = self.player.on_frame_tick();
        }

        while let Some(packet) = self.session.poll() {
            match dispatch(&mut self.player, &packet) {
                Ok(code) => {
                    if code == CommandCode::PowerOff {
                        // A tick raised before the timer stopped must not render
                        self.tick.clear();
                    }
                    report.dispatched = report.dispatched.saturating_add(1);
                    report.last_command = Some(code);
                }
                Err(err) => {
                    report.rejected = report.rejected.saturating_add(1);
                    report.last_rejection = Some(err);
                }
            }
        }

        let overflows = self.session.overflow_count();
        report.overflowed = overflows.wrapping_sub(self.overflows_seen);
        self.overflows_seen = overflows;
        if report.overflowed > 0 && self.player.config().indicator_on_overflow {
            self.player.set_indicator(true);
        }

        report.stats = self.session.stats();
        let discarded = report.stats.discarded();
        report.discarded = discarded.wrapping_sub(self.discarded_seen);
        self.discarded_seen = discarded;
        report
    }

    pub fn player(&self) -> &PlaybackContext<O, T, L> {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut PlaybackContext<O, T, L> {
        &mut self.player
    }

    pub fn stats(&self) -> DecodeStats {
        self.session.stats()
    }

    /// Bytes waiting in the receive ring
    pub fn backlog(&self) -> usize {
        self.session.backlog()
    }
}
