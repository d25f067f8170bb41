//! Animation playback
//!
//! [`PlayerState`] is the power state machine; [`PlaybackContext`] owns the
//! animation table, the frame cursor and the collaborators, and is the only
//! thing the dispatcher and the tick handler touch.

pub mod context;
pub mod state;

pub use context::{PlaybackContext, TickReport};
pub use state::{PlayerEvent, PlayerState};
