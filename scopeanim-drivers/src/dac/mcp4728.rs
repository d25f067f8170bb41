//! MCP4728 quad 12-bit DAC
//!
//! Two channels carry the X and Y deflection; the other two are powered
//! down. New codes are loaded with UDAC set and latched onto both outputs
//! together by pulsing LDAC, so the beam never takes an L-shaped detour.
//!
//! Command bytes used (datasheet section numbers in brackets):
//! - Multi-write (5.6.2): `0100 0 DAC1 DAC0 UDAC`, then `VREF PD1 PD0 Gx D11..D8`, `D7..D0`
//! - Sequential write (5.6.3): `0101 0 DAC1 DAC0 UDAC`, then two bytes per channel
//! - Select power-down (5.6.6): `101x PDA PDB`, `PDC PDD xxxx`

use scopeanim_core::animation::GRID_SIZE;
use scopeanim_hal::{I2cBus, I2cConfig, OutputPin};

/// Default 7-bit address with A2..A0 = 0
pub const DEFAULT_ADDRESS: u8 = 0x60;

const MULTI_WRITE: u8 = 0x40;
const SEQUENTIAL_WRITE: u8 = 0x50;
const SELECT_POWER_DOWN: u8 = 0xA0;

/// UDAC: hold the new code until LDAC falls
const UDAC: u8 = 0x01;
const VREF_INTERNAL: u8 = 0x80;
const GAIN_2X: u8 = 0x10;
/// PD1 = 1, PD0 = 0: output pulled to ground through 100 kΩ
const PD_100K: u8 = 0b10;

/// Shift from the 6-bit grid to the 12-bit code range
const GRID_SHIFT: u32 = 12 - GRID_SIZE.trailing_zeros();

/// DAC output channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Channel {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
}

impl Channel {
    const ALL: [Channel; 4] = [Channel::A, Channel::B, Channel::C, Channel::D];
}

/// MCP4728 configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Mcp4728Config {
    /// 7-bit I2C address
    pub address: u8,
    /// Bus speed the board should configure
    pub i2c: I2cConfig,
    /// Channel wired to X
    pub x: Channel,
    /// Channel wired to Y
    pub y: Channel,
    /// Use the internal 2.048 V reference instead of VDD
    pub internal_vref: bool,
    /// 2x gain (only with the internal reference)
    pub gain_2x: bool,
}

impl Default for Mcp4728Config {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS,
            i2c: I2cConfig::FAST_PLUS,
            x: Channel::A,
            y: Channel::B,
            internal_vref: true,
            gain_2x: true,
        }
    }
}

impl Mcp4728Config {
    /// High nibble of the first data byte for an active channel
    fn control_bits(&self) -> u8 {
        let mut bits = 0;
        if self.internal_vref {
            bits |= VREF_INTERNAL;
            if self.gain_2x {
                bits |= GAIN_2X;
            }
        }
        bits
    }

    fn is_active(&self, channel: Channel) -> bool {
        channel == self.x || channel == self.y
    }
}

/// Scale a grid coordinate to a 12-bit DAC code
pub fn grid_to_code(value: u8) -> u16 {
    u16::from(value % GRID_SIZE) << GRID_SHIFT
}

/// MCP4728 with its LDAC line
pub struct Mcp4728<I, P> {
    i2c: I,
    ldac: P,
    config: Mcp4728Config,
}

impl<I: I2cBus, P: OutputPin> Mcp4728<I, P> {
    /// Create the driver; LDAC idles high so loaded codes wait for a latch
    pub fn new(i2c: I, ldac: P, config: Mcp4728Config) -> Self {
        let mut dac = Self { i2c, ldac, config };
        dac.ldac.set_high();
        dac
    }

    pub fn config(&self) -> &Mcp4728Config {
        &self.config
    }

    pub fn bus(&self) -> &I {
        &self.i2c
    }

    pub fn bus_mut(&mut self) -> &mut I {
        &mut self.i2c
    }

    /// Power the X/Y channels up at code 0 and park the rest in 100 kΩ
    pub fn init(&mut self) -> Result<(), I::Error> {
        let active = [self.config.control_bits(), 0x00];
        let parked = [PD_100K << 5, 0x00];

        let mut frame = [0u8; 1 + 2 * 4];
        frame[0] = SEQUENTIAL_WRITE;
        for (channel, bytes) in Channel::ALL.iter().zip(frame[1..].chunks_exact_mut(2)) {
            let data = if self.config.is_active(*channel) {
                active
            } else {
                parked
            };
            bytes.copy_from_slice(&data);
        }
        self.i2c.write(self.config.address, &frame)
    }

    /// Put all four outputs into 100 kΩ power-down
    pub fn power_down(&mut self) -> Result<(), I::Error> {
        let all = (PD_100K << 6) | (PD_100K << 4) | (PD_100K << 2) | PD_100K;
        let frame = [SELECT_POWER_DOWN | (all >> 4), (all & 0x0F) << 4];
        self.i2c.write(self.config.address, &frame)
    }

    /// Load new X/Y codes without changing the outputs yet
    pub fn load(&mut self, x: u16, y: u16) -> Result<(), I::Error> {
        self.ldac.set_high();
        let mut frame = [0u8; 6];
        frame[..3].copy_from_slice(&self.multi_write(self.config.x, x));
        frame[3..].copy_from_slice(&self.multi_write(self.config.y, y));
        self.i2c.write(self.config.address, &frame)
    }

    /// Move both outputs to the loaded codes at once
    pub fn latch(&mut self) {
        self.ldac.set_low();
    }

    /// Load and latch in one go
    pub fn write_xy(&mut self, x: u16, y: u16) -> Result<(), I::Error> {
        self.load(x, y)?;
        self.latch();
        Ok(())
    }

    fn multi_write(&self, channel: Channel, code: u16) -> [u8; 3] {
        let code = code & 0x0FFF;
        [
            MULTI_WRITE | ((channel as u8) << 1) | UDAC,
            self.config.control_bits() | (code >> 8) as u8,
            code as u8,
        ]
    }
}
