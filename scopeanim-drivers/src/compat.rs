//! Adapters from `embedded-hal` 1.0 to the scopeanim-hal traits
//!
//! Board crates hand their HAL's pins and buses to the drivers through
//! these wrappers instead of implementing every trait by hand.

use embedded_hal::digital::OutputPin as EhOutputPin;
use embedded_hal::i2c::I2c;
use scopeanim_hal::{I2cBus, OutputPin};

/// Push-pull output pin
///
/// The driven level is tracked locally, so reads never touch the hardware.
/// Errors are dropped; on-chip GPIO cannot fail.
pub struct EhPin<P> {
    pin: P,
    high: bool,
}

impl<P: EhOutputPin> EhPin<P> {
    /// Wrap a pin, driving it low
    pub fn new(mut pin: P) -> Self {
        let _ = pin.set_low();
        Self { pin, high: false }
    }

    pub fn into_inner(self) -> P {
        self.pin
    }
}

impl<P: EhOutputPin> OutputPin for EhPin<P> {
    fn set_high(&mut self) {
        let _ = self.pin.set_high();
        self.high = true;
    }

    fn set_low(&mut self) {
        let _ = self.pin.set_low();
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

/// Blocking I2C master
pub struct EhI2c<B>(pub B);

impl<B: I2c> I2cBus for EhI2c<B> {
    type Error = B::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), B::Error> {
        self.0.write(address, data)
    }
}
