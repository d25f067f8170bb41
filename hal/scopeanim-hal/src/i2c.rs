//! I2C master
//!
//! The MCP4728 is only ever written, so reads and combined transfers are
//! left out.

/// Blocking I2C master that can address a device and write to it
pub trait I2cBus {
    type Error;

    /// Write `data` to the 7-bit `address` in one transfer
    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), Self::Error>;
}

/// Bus clock selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// SCL rate in Hz
    pub frequency: u32,
}

impl I2cConfig {
    /// 100 kHz
    pub const STANDARD: Self = Self::hz(100_000);

    /// 400 kHz
    pub const FAST: Self = Self::hz(400_000);

    /// 1 MHz; a 300-point frame at 30 FPS needs it
    pub const FAST_PLUS: Self = Self::hz(1_000_000);

    pub const fn hz(frequency: u32) -> Self {
        Self { frequency }
    }
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::FAST_PLUS
    }
}
