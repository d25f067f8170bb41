//! Inter-task signals
//!
//! The player task owns all playback state. The other tasks only feed it:
//! the receive task fills the ring, the frame tick task raises the tick
//! flag, and both wake the player.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use scopeanim_core::TickFlag;

/// Frame timer rate change; `None` stops the timer
pub static FRAME_RATE: Signal<CriticalSectionRawMutex, Option<u16>> = Signal::new();

/// Raised once per frame period while the frame timer runs
pub static FRAME_TICK: TickFlag = TickFlag::new();

/// Wake the player task: bytes arrived or a frame tick elapsed
pub static PLAYER_WAKE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Beam release timer command
#[derive(Debug, Clone, Copy, PartialEq, Eq, defmt::Format)]
pub enum BeamCommand {
    /// Restart the settle countdown
    Arm,
    /// Cancel a pending release
    Disarm,
}

pub static BEAM_TIMER: Signal<CriticalSectionRawMutex, BeamCommand> = Signal::new();
