//! Player power state machine
//!
//! While `Playing`, every frame tick runs one render/advance cycle; the
//! cycle itself has no state beyond the frame cursor and repeat counter
//! kept in the context.

/// Player states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerState {
    /// Frame timer stopped, output idled, beam held off
    Idle,
    /// Frame timer running, frames rendered on every tick
    Playing,
}

/// Events that change the power state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PlayerEvent {
    PowerOn,
    PowerOff,
}

impl PlayerState {
    pub fn is_playing(&self) -> bool {
        matches!(self, PlayerState::Playing)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: PlayerEvent) -> Self {
        match event {
            PlayerEvent::PowerOn => PlayerState::Playing,
            PlayerEvent::PowerOff => PlayerState::Idle,
        }
    }
}
