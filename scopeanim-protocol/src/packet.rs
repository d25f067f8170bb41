//! Packet layout for the Scopeanim serial protocol.
//!
//! Packet format (before stuffing):
//! - HEADER (1 byte): high nibble is the magic tag `0xA`, low nibble the command code
//! - LENGTH (2 bytes, little-endian): number of payload bytes that follow
//! - PAYLOAD (0-1021 bytes): command-specific data

use heapless::Vec;

use crate::cobs::{self, CodecError, MAX_ENCODED_SIZE};

/// Magic tag carried in the high nibble of every header byte
pub const MAGIC_TAG: u8 = 0xA0;

/// Mask selecting the tag nibble of a header byte
pub const TAG_MASK: u8 = 0xF0;

/// Mask selecting the command nibble of a header byte
pub const COMMAND_MASK: u8 = 0x0F;

/// HEADER + LENGTH
pub const HEADER_SIZE: usize = 3;

/// Maximum size of an unstuffed packet, header included
pub const MAX_PACKET_SIZE: usize = 1024;

/// Maximum payload a single packet can carry
pub const MAX_PAYLOAD_SIZE: usize = MAX_PACKET_SIZE - HEADER_SIZE;

/// Errors that can occur while building a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Command code does not fit in the header nibble
    InvalidCommand,
    /// Payload exceeds [`MAX_PAYLOAD_SIZE`]
    PayloadTooLarge,
}

/// Outcome of probing the first bytes of an unstuffed candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HeaderProbe {
    /// Fewer than [`HEADER_SIZE`] bytes available
    Incomplete,
    /// Tag nibble is not [`MAGIC_TAG`]
    BadTag,
    /// Declared length can never fit in [`MAX_PACKET_SIZE`]
    Oversized,
    /// Header is well formed
    Valid(PacketHeader),
}

/// Decoded packet header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PacketHeader {
    /// Command code (0-15)
    pub command: u8,
    /// Payload length in bytes
    pub length: u16,
}

impl PacketHeader {
    pub fn new(command: u8, length: u16) -> Self {
        Self { command, length }
    }

    /// Header byte as it appears on the wire
    pub fn header_byte(&self) -> u8 {
        MAGIC_TAG | (self.command & COMMAND_MASK)
    }

    pub fn to_bytes(&self) -> [u8; HEADER_SIZE] {
        let [lo, hi] = self.length.to_le_bytes();
        [self.header_byte(), lo, hi]
    }

    /// Inspect the start of an unstuffed candidate
    pub fn probe(bytes: &[u8]) -> HeaderProbe {
        if bytes.len() < HEADER_SIZE {
            return HeaderProbe::Incomplete;
        }
        if bytes[0] & TAG_MASK != MAGIC_TAG {
            return HeaderProbe::BadTag;
        }
        let length = u16::from_le_bytes([bytes[1], bytes[2]]);
        if length as usize > MAX_PAYLOAD_SIZE {
            return HeaderProbe::Oversized;
        }
        HeaderProbe::Valid(Self {
            command: bytes[0] & COMMAND_MASK,
            length,
        })
    }
}

/// A complete packet borrowed from the decoder's working buffer
///
/// Only valid until the decoder is polled again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawPacket<'a> {
    /// Command code (0-15)
    pub command: u8,
    /// Exactly `length` payload bytes; trailing stuffing artefacts are cut off
    pub payload: &'a [u8],
}

impl<'a> RawPacket<'a> {
    pub fn new(command: u8, payload: &'a [u8]) -> Self {
        Self { command, payload }
    }

    pub fn length(&self) -> usize {
        self.payload.len()
    }

    /// Little-endian reader over the payload
    pub fn reader(&self) -> PayloadReader<'a> {
        PayloadReader::new(self.payload)
    }
}

/// Sequential little-endian field reader over a payload slice
#[derive(Debug, Clone)]
pub struct PayloadReader<'a> {
    bytes: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    pub fn remaining(&self) -> usize {
        self.bytes.len()
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        let (&first, rest) = self.bytes.split_first()?;
        self.bytes = rest;
        Some(first)
    }

    pub fn read_u16_le(&mut self) -> Option<u16> {
        let bytes = self.take(2)?;
        Some(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    /// Take the next `len` bytes, or nothing if fewer remain
    pub fn take(&mut self, len: usize) -> Option<&'a [u8]> {
        if self.bytes.len() < len {
            return None;
        }
        let (head, rest) = self.bytes.split_at(len);
        self.bytes = rest;
        Some(head)
    }
}

/// Incrementally assembles a packet, patching LENGTH on [`finish`](Self::finish)
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    bytes: Vec<u8, MAX_PACKET_SIZE>,
}

impl PacketBuilder {
    /// Start a packet for `command`
    pub fn new(command: u8) -> Result<Self, PacketError> {
        if command > COMMAND_MASK {
            return Err(PacketError::InvalidCommand);
        }
        let mut bytes = Vec::new();
        bytes
            .extend_from_slice(&PacketHeader::new(command, 0).to_bytes())
            .map_err(|_| PacketError::PayloadTooLarge)?;
        Ok(Self { bytes })
    }

    pub fn push_u8(&mut self, value: u8) -> Result<&mut Self, PacketError> {
        self.bytes
            .push(value)
            .map_err(|_| PacketError::PayloadTooLarge)?;
        Ok(self)
    }

    pub fn push_u16_le(&mut self, value: u16) -> Result<&mut Self, PacketError> {
        self.extend(&value.to_le_bytes())
    }

    pub fn extend(&mut self, data: &[u8]) -> Result<&mut Self, PacketError> {
        self.bytes
            .extend_from_slice(data)
            .map_err(|_| PacketError::PayloadTooLarge)?;
        Ok(self)
    }

    pub fn payload_len(&self) -> usize {
        self.bytes.len() - HEADER_SIZE
    }

    /// Seal the packet by writing the final payload length into the header
    pub fn finish(mut self) -> Packet {
        let [lo, hi] = (self.payload_len() as u16).to_le_bytes();
        self.bytes[1] = lo;
        self.bytes[2] = hi;
        Packet { bytes: self.bytes }
    }
}

/// A complete, unstuffed packet ready for transmission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    bytes: Vec<u8, MAX_PACKET_SIZE>,
}

impl Packet {
    /// Build a packet from a command code and a complete payload
    pub fn new(command: u8, payload: &[u8]) -> Result<Self, PacketError> {
        let mut builder = PacketBuilder::new(command)?;
        builder.extend(payload)?;
        Ok(builder.finish())
    }

    /// Build a packet with no payload
    pub fn empty(command: u8) -> Result<Self, PacketError> {
        Ok(PacketBuilder::new(command)?.finish())
    }

    pub fn command(&self) -> u8 {
        self.bytes[0] & COMMAND_MASK
    }

    pub fn payload(&self) -> &[u8] {
        &self.bytes[HEADER_SIZE..]
    }

    /// Header, length and payload, unstuffed
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_raw(&self) -> RawPacket<'_> {
        RawPacket::new(self.command(), self.payload())
    }

    /// Write the wire form (leading delimiter plus stuffed packet) into `buffer`
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, CodecError> {
        cobs::encode_message(&self.bytes, buffer)
    }

    /// Wire form of this packet as a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_ENCODED_SIZE>, CodecError> {
        let mut buffer = [0u8; MAX_ENCODED_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| CodecError::BufferTooSmall)?;
        Ok(vec)
    }
}
