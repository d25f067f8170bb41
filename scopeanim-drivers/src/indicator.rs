//! GPIO status LED

use scopeanim_core::traits::StatusIndicator;
use scopeanim_hal::OutputPin;

/// LED on a GPIO pin
pub struct LedIndicator<P> {
    pin: P,
    /// Pin is active-low (sinks current to light)
    inverted: bool,
    on: bool,
}

impl<P: OutputPin> LedIndicator<P> {
    /// Create an indicator, initially off
    pub fn new(pin: P, inverted: bool) -> Self {
        let mut led = Self {
            pin,
            inverted,
            on: false,
        };
        led.set(false);
        led
    }

    pub fn new_active_high(pin: P) -> Self {
        Self::new(pin, false)
    }

    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    pub fn toggle(&mut self) {
        let on = !self.on;
        self.set(on);
    }
}

impl<P: OutputPin> StatusIndicator for LedIndicator<P> {
    fn set(&mut self, on: bool) {
        self.on = on;
        self.pin.set_state(on != self.inverted);
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
