//! Oscilloscope XY output
//!
//! Ties the DAC and the beam gate together behind `CoordinateOutput`. A point
//! is drawn as: load both codes with LDAC held high, gate the beam, then
//! drop LDAC so X and Y move together.

use scopeanim_core::traits::CoordinateOutput;
use scopeanim_hal::{I2cBus, OneShotTimer, OutputPin};

use crate::beam::BeamGate;
use crate::dac::{grid_to_code, Mcp4728};

/// DAC-driven XY output with Z blanking
pub struct ScopeOutput<I, L, Z, T> {
    dac: Mcp4728<I, L>,
    beam: BeamGate<Z, T>,
}

impl<I, L, Z, T> ScopeOutput<I, L, Z, T>
where
    I: I2cBus,
    L: OutputPin,
    Z: OutputPin,
    T: OneShotTimer,
{
    pub fn new(dac: Mcp4728<I, L>, beam: BeamGate<Z, T>) -> Self {
        Self { dac, beam }
    }

    pub fn dac(&self) -> &Mcp4728<I, L> {
        &self.dac
    }

    pub fn beam(&self) -> &BeamGate<Z, T> {
        &self.beam
    }
}

impl<I, L, Z, T> CoordinateOutput for ScopeOutput<I, L, Z, T>
where
    I: I2cBus,
    L: OutputPin,
    Z: OutputPin,
    T: OneShotTimer,
{
    type Error = I::Error;

    fn set_output(&mut self, x: u8, y: u8, blank: bool) -> Result<(), I::Error> {
        self.dac.load(grid_to_code(x), grid_to_code(y))?;
        self.beam.on_point(blank);
        self.dac.latch();
        Ok(())
    }

    fn power_up(&mut self) -> Result<(), I::Error> {
        self.dac.init()?;
        self.beam.enable();
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), I::Error> {
        self.beam.disable();
        self.dac.power_down()
    }
}
