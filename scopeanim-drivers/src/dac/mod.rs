//! DAC drivers

pub mod mcp4728;

pub use mcp4728::{grid_to_code, Channel, Mcp4728, Mcp4728Config};
