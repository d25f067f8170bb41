//! Collaborator traits
//!
//! These traits define the interface between the playback logic and the
//! hardware that draws, times and signals.

pub mod indicator;
pub mod output;
pub mod timer;

pub use indicator::StatusIndicator;
pub use output::CoordinateOutput;
pub use timer::FrameTimer;
