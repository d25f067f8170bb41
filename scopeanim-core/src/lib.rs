//! Board-agnostic playback logic for the XY animation player
//!
//! This crate contains everything between the decoded packet and the
//! hardware:
//!
//! - Animation model (frames, points, the built-in boot pattern)
//! - Playback state machine and its context
//! - Command dispatcher
//! - Tick flag shared with the frame timer interrupt
//! - Collaborator traits (coordinate output, frame timer, status indicator)
//! - Cooperative main-loop runtime

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod animation;
pub mod config;
pub mod dispatch;
pub mod playback;
pub mod runtime;
pub mod timing;
pub mod traits;

#[cfg(test)]
pub(crate) mod mock;

pub use animation::{Animation, AnimationError, Frame, Point};
pub use config::PlayerConfig;
pub use dispatch::{dispatch, DispatchError};
pub use playback::{PlaybackContext, PlayerEvent, PlayerState, TickReport};
pub use runtime::{Runtime, ServiceReport};
pub use timing::TickFlag;
