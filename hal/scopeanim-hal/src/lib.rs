//! Scopeanim Hardware Abstraction Layer
//!
//! This crate defines the small set of hardware traits the XY output stage
//! needs. Chip-specific code (the RP2040 firmware) implements them; the
//! drivers crate builds on them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  scopeanim-firmware (board glue)        │
//! └─────────────────────────────────────────┘
//!                     │ implements
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  scopeanim-hal (this crate - traits)    │
//! └─────────────────────────────────────────┘
//!                     ▲ consumed by
//!                     │
//! ┌─────────────────────────────────────────┐
//! │  scopeanim-drivers (DAC, beam gate)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`] - Digital output (LDAC, Z-blank, status LED)
//! - [`i2c::I2cBus`] - I2C master writes to the DAC
//! - [`timer::OneShotTimer`] - Short one-shot delay used to release the beam

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use gpio::OutputPin;
pub use i2c::{I2cBus, I2cConfig};
pub use timer::OneShotTimer;
