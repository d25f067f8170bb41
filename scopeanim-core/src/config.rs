//! Player configuration

/// Lowest tick rate the frame timer is ever programmed with
///
/// A 16-bit frame timer at the reference board's prescaler cannot go lower.
pub const DEFAULT_MIN_FPS: u16 = 5;

/// Behaviour knobs for the playback context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PlayerConfig {
    /// Floor applied to every frame rate
    pub min_fps: u16,
    /// Start playing at boot without waiting for `PowerOn`
    pub autostart: bool,
    /// Initial state of the return-to-origin flag
    pub return_to_origin: bool,
    /// Light the status indicator when the receive ring overflows
    pub indicator_on_overflow: bool,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            min_fps: DEFAULT_MIN_FPS,
            autostart: true,
            return_to_origin: false,
            indicator_on_overflow: true,
        }
    }
}

impl PlayerConfig {
    /// Frame rate actually programmed into the timer
    pub fn effective_fps(&self, fps: u16) -> u16 {
        fps.max(self.min_fps).max(1)
    }
}
