//! Hardware driver implementations
//!
//! This crate provides concrete implementations of the collaborator traits
//! defined in scopeanim-core for the player's output stage:
//!
//! - MCP4728 quad DAC driving the X and Y deflection inputs
//! - Z-blank beam gate with a settle-time release
//! - GPIO status LED
//! - [`output::ScopeOutput`], which combines DAC and beam gate into a
//!   `CoordinateOutput`
//! - Adapters from `embedded-hal` 1.0 pins and buses to the scopeanim-hal traits

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod beam;
pub mod compat;
pub mod dac;
pub mod indicator;
pub mod output;

#[cfg(test)]
pub(crate) mod mock;

pub use beam::{BeamConfig, BeamGate};
pub use dac::{Channel, Mcp4728, Mcp4728Config};
pub use indicator::LedIndicator;
pub use output::ScopeOutput;
