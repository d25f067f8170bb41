//! Z-blank beam gate
//!
//! The Z input of the scope hides the beam while it is low. Every new point
//! re-arms a short one-shot; the beam comes back on when it expires, so the
//! DAC outputs have settled before anything is drawn at the new position.
//! Blanked points additionally drop Z straight away.
//!
//! The gate only arms the one-shot. Raising Z on expiry belongs to whoever
//! owns the timer; on the board that is the firmware's beam task, and
//! [`BeamGate::disable`] disarms the timer so a pending release is dropped.

use scopeanim_hal::{OneShotTimer, OutputPin};

/// Beam gate timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeamConfig {
    /// Time between a point write and the beam being released
    pub settle_us: u32,
}

impl Default for BeamConfig {
    fn default() -> Self {
        Self { settle_us: 10 }
    }
}

/// Z output plus its release timer
pub struct BeamGate<Z, T> {
    z: Z,
    timer: T,
    config: BeamConfig,
    enabled: bool,
}

impl<Z: OutputPin, T: OneShotTimer> BeamGate<Z, T> {
    /// Create a disabled gate with the beam held off
    pub fn new(z: Z, timer: T, config: BeamConfig) -> Self {
        let mut gate = Self {
            z,
            timer,
            config,
            enabled: false,
        };
        gate.z.set_low();
        gate
    }

    pub fn config(&self) -> &BeamConfig {
        &self.config
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Is the beam currently visible?
    pub fn is_lit(&self) -> bool {
        self.z.is_set_high()
    }

    /// Turn the beam on and accept points
    pub fn enable(&mut self) {
        self.enabled = true;
        self.z.set_high();
    }

    /// Cancel any pending release and hold the beam off
    pub fn disable(&mut self) {
        self.enabled = false;
        self.timer.disarm();
        self.z.set_low();
    }

    /// A new point was loaded into the DAC
    pub fn on_point(&mut self, blank: bool) {
        if !self.enabled {
            return;
        }
        if blank {
            self.z.set_low();
        }
        self.timer.arm();
    }
}
