//! Scopeanim Serial Protocol
//!
//! This crate defines the one-way serial link between the host (animation
//! editor) and the controller (XY player). The link has no acknowledgements:
//! a lost or mangled message costs one dropped command, never a stalled
//! protocol.
//!
//! # Protocol Overview
//!
//! Every packet is laid out as:
//! ```text
//! ┌────────────────────┬──────────┬─────────────────┐
//! │ HEADER             │ LENGTH   │ PAYLOAD         │
//! │ 1B (tag | command) │ 2B (LE)  │ 0–1021B         │
//! └────────────────────┴──────────┴─────────────────┘
//! ```
//!
//! On the wire the packet is COBS-stuffed and *preceded* by a single `0x00`:
//! ```text
//! 0x00 │ stuffed(HEADER LENGTH PAYLOAD) │ 0x00 │ stuffed(...) │ ...
//! ```
//!
//! Because the delimiter leads, the receiver never has to wait for a
//! trailing terminator before it can start decoding, and a message cut
//! short is recognised the moment the next one starts.
//!
//! # Controller side
//!
//! The receive interrupt pushes bytes into an [`RxRing`] through its
//! [`RxProducer`] half. The main loop owns a [`DecodeSession`] built on the
//! [`RxConsumer`] half and drains it with [`DecodeSession::poll`], which
//! yields each complete [`RawPacket`] exactly once.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod cobs;
pub mod commands;
pub mod decoder;
pub mod packet;
pub mod ring;

pub use cobs::{CodecError, DELIMITER, MAX_ENCODED_SIZE};
pub use commands::{
    encode_frame, AnimationSlot, Command, CommandCode, CommandError, FrameUpdate, PointList,
    WirePoint, ANIMATION_SLOTS, GRID_SIZE, MAX_FRAMES, MAX_POINTS_PER_FRAME,
};
pub use decoder::{DecodeSession, DecodeStats, StreamDecoder};
pub use packet::{
    HeaderProbe, Packet, PacketBuilder, PacketError, PacketHeader, PayloadReader, RawPacket,
    HEADER_SIZE, MAGIC_TAG, MAX_PACKET_SIZE, MAX_PAYLOAD_SIZE,
};
pub use ring::{RingFull, RxConsumer, RxProducer, RxRing, RX_RING_SIZE};

/// Serial line rate shared by host and controller
pub const BAUD_RATE: u32 = 115_200;
