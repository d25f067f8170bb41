//! Command set carried in the packet header's low nibble
//!
//! Parsing only checks that the payload is long enough for the command's
//! shape. Range checks against the animation table belong to the dispatcher.

use crate::packet::{Packet, PacketBuilder, PacketError, PayloadReader, RawPacket};

/// Coordinates run 0..GRID_SIZE on both axes
pub const GRID_SIZE: u8 = 64;

/// Coordinate bits of a wire point byte
pub const COORD_MASK: u8 = 0x3F;

/// Blank flag, carried in byte 0 of a wire point
pub const BLANK_BIT: u8 = 0x40;

/// Wire size of one point
pub const POINT_SIZE: usize = 2;

/// index(1) + fps(2) + repeat_count(2) + point_count(2)
pub const FRAME_UPDATE_HEADER_SIZE: usize = 7;

/// Frames per animation
pub const MAX_FRAMES: usize = 10;

/// Points per frame
pub const MAX_POINTS_PER_FRAME: usize = 300;

/// Selectable animations
pub const ANIMATION_SLOTS: usize = 2;

/// Command codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum CommandCode {
    PowerOn = 0,
    PowerOff = 1,
    SelectAnimation0 = 2,
    SelectAnimation1 = 3,
    UpdateFrame = 4,
    UpdateFrameCount = 5,
    InfoLedOn = 6,
    InfoLedOff = 7,
    ReturnToOriginOn = 8,
    ReturnToOriginOff = 9,
}

impl TryFrom<u8> for CommandCode {
    type Error = CommandError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::PowerOn,
            1 => Self::PowerOff,
            2 => Self::SelectAnimation0,
            3 => Self::SelectAnimation1,
            4 => Self::UpdateFrame,
            5 => Self::UpdateFrameCount,
            6 => Self::InfoLedOn,
            7 => Self::InfoLedOff,
            8 => Self::ReturnToOriginOn,
            9 => Self::ReturnToOriginOff,
            other => return Err(CommandError::Reserved(other)),
        })
    }
}

/// Errors from command parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Code 10-15, not assigned
    Reserved(u8),
    /// Payload shorter than the command's shape requires
    Truncated { needed: usize, got: usize },
}

/// One of the two animation slots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationSlot {
    Zero,
    One,
}

impl AnimationSlot {
    pub fn index(self) -> usize {
        match self {
            Self::Zero => 0,
            Self::One => 1,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Zero),
            1 => Some(Self::One),
            _ => None,
        }
    }
}

/// A point as carried on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WirePoint {
    pub x: u8,
    pub y: u8,
    pub blank: bool,
}

impl WirePoint {
    pub fn new(x: u8, y: u8, blank: bool) -> Self {
        Self { x, y, blank }
    }

    /// Coordinates outside the grid are masked, not rejected
    pub fn to_bytes(self) -> [u8; POINT_SIZE] {
        let blank = if self.blank { BLANK_BIT } else { 0 };
        [(self.x & COORD_MASK) | blank, self.y & COORD_MASK]
    }

    pub fn from_bytes(bytes: [u8; POINT_SIZE]) -> Self {
        Self {
            x: bytes[0] & COORD_MASK,
            y: bytes[1] & COORD_MASK,
            blank: bytes[0] & BLANK_BIT != 0,
        }
    }

    pub fn in_grid(&self) -> bool {
        self.x < GRID_SIZE && self.y < GRID_SIZE
    }
}

/// Point list borrowed from a packet payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PointList<'a> {
    bytes: &'a [u8],
}

impl<'a> PointList<'a> {
    /// Wrap wire bytes; a trailing odd byte is ignored
    pub fn from_wire(bytes: &'a [u8]) -> Self {
        let even = bytes.len() - bytes.len() % POINT_SIZE;
        Self {
            bytes: &bytes[..even],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / POINT_SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub fn get(&self, index: usize) -> Option<WirePoint> {
        let at = index.checked_mul(POINT_SIZE)?;
        let pair = self.bytes.get(at..at + POINT_SIZE)?;
        Some(WirePoint::from_bytes([pair[0], pair[1]]))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = WirePoint> + 'a {
        self.bytes
            .chunks_exact(POINT_SIZE)
            .map(|pair| WirePoint::from_bytes([pair[0], pair[1]]))
    }
}

/// Replacement content for one frame of the selected animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameUpdate<'a> {
    pub index: u8,
    pub fps: u16,
    pub repeat_count: u16,
    pub points: PointList<'a>,
}

/// Decoded command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command<'a> {
    /// Start the frame tick and enable the beam
    PowerOn,
    /// Stop the frame tick and idle the output
    PowerOff,
    /// Make a slot the active animation
    SelectAnimation(AnimationSlot),
    /// Replace one frame of the active animation
    UpdateFrame(FrameUpdate<'a>),
    /// Replace the active animation's frame count
    UpdateFrameCount(u8),
    /// Drive the status indicator
    InfoLed(bool),
    /// Emit an origin point after each rendered frame
    ReturnToOrigin(bool),
}

impl<'a> Command<'a> {
    pub fn code(&self) -> CommandCode {
        match self {
            Command::PowerOn => CommandCode::PowerOn,
            Command::PowerOff => CommandCode::PowerOff,
            Command::SelectAnimation(AnimationSlot::Zero) => CommandCode::SelectAnimation0,
            Command::SelectAnimation(AnimationSlot::One) => CommandCode::SelectAnimation1,
            Command::UpdateFrame(_) => CommandCode::UpdateFrame,
            Command::UpdateFrameCount(_) => CommandCode::UpdateFrameCount,
            Command::InfoLed(true) => CommandCode::InfoLedOn,
            Command::InfoLed(false) => CommandCode::InfoLedOff,
            Command::ReturnToOrigin(true) => CommandCode::ReturnToOriginOn,
            Command::ReturnToOrigin(false) => CommandCode::ReturnToOriginOff,
        }
    }

    /// Parse a command from a decoded packet
    ///
    /// Payload bytes beyond what the command needs are ignored.
    pub fn from_packet(packet: &RawPacket<'a>) -> Result<Self, CommandError> {
        let mut reader = packet.reader();
        Ok(match CommandCode::try_from(packet.command)? {
            CommandCode::PowerOn => Command::PowerOn,
            CommandCode::PowerOff => Command::PowerOff,
            CommandCode::SelectAnimation0 => Command::SelectAnimation(AnimationSlot::Zero),
            CommandCode::SelectAnimation1 => Command::SelectAnimation(AnimationSlot::One),
            CommandCode::UpdateFrame => {
                let truncated = |needed| CommandError::Truncated {
                    needed,
                    got: packet.length(),
                };
                let header = FRAME_UPDATE_HEADER_SIZE;
                let index = reader.read_u8().ok_or(truncated(header))?;
                let fps = reader.read_u16_le().ok_or(truncated(header))?;
                let repeat_count = reader.read_u16_le().ok_or(truncated(header))?;
                let point_count = reader.read_u16_le().ok_or(truncated(header))?;
                let point_bytes = usize::from(point_count) * POINT_SIZE;
                let points = reader
                    .take(point_bytes)
                    .ok_or(truncated(header + point_bytes))?;
                Command::UpdateFrame(FrameUpdate {
                    index,
                    fps,
                    repeat_count,
                    points: PointList::from_wire(points),
                })
            }
            CommandCode::UpdateFrameCount => {
                let count = reader
                    .read_u8()
                    .ok_or(CommandError::Truncated { needed: 1, got: 0 })?;
                Command::UpdateFrameCount(count)
            }
            CommandCode::InfoLedOn => Command::InfoLed(true),
            CommandCode::InfoLedOff => Command::InfoLed(false),
            CommandCode::ReturnToOriginOn => Command::ReturnToOrigin(true),
            CommandCode::ReturnToOriginOff => Command::ReturnToOrigin(false),
        })
    }

    /// Encode this command into a packet
    pub fn to_packet(&self) -> Result<Packet, PacketError> {
        let mut builder = PacketBuilder::new(self.code() as u8)?;
        match self {
            Command::UpdateFrame(update) => {
                let point_count =
                    u16::try_from(update.points.len()).map_err(|_| PacketError::PayloadTooLarge)?;
                builder
                    .push_u8(update.index)?
                    .push_u16_le(update.fps)?
                    .push_u16_le(update.repeat_count)?
                    .push_u16_le(point_count)?
                    .extend(update.points.as_bytes())?;
            }
            Command::UpdateFrameCount(count) => {
                builder.push_u8(*count)?;
            }
            _ => {}
        }
        Ok(builder.finish())
    }
}

/// Build an `UpdateFrame` packet from owned points
pub fn encode_frame(
    index: u8,
    fps: u16,
    repeat_count: u16,
    points: &[WirePoint],
) -> Result<Packet, PacketError> {
    let point_count = u16::try_from(points.len()).map_err(|_| PacketError::PayloadTooLarge)?;
    let mut builder = PacketBuilder::new(CommandCode::UpdateFrame as u8)?;
    builder
        .push_u8(index)?
        .push_u16_le(fps)?
        .push_u16_le(repeat_count)?
        .push_u16_le(point_count)?;
    for point in points {
        builder.extend(&point.to_bytes())?;
    }
    Ok(builder.finish())
}
