//! Animation files
//!
//! An animation is a TOML file with one `[[frame]]` table per frame:
//!
//! ```toml
//! slot = 0                  # target slot, 0 or 1
//! return_to_origin = false  # optional, sends the origin flag when present
//! power_on = true           # optional, send PowerOn after the upload
//!
//! [[frame]]
//! fps = 30                  # default 30
//! repeat = 2                # default 1
//! points = [[0, 0], [63, 63, true], { x = 10, y = 20, blank = false }]
//! ```
//!
//! A point is `[x, y]`, `[x, y, blank]` or an inline table.

use std::fs;
use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;

use scopeanim_protocol::{
    encode_frame, AnimationSlot, Command, Packet, WirePoint, ANIMATION_SLOTS, GRID_SIZE,
    MAX_FRAMES, MAX_POINTS_PER_FRAME,
};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnimationFile {
    #[serde(default)]
    pub slot: u8,
    #[serde(default)]
    pub return_to_origin: Option<bool>,
    #[serde(default)]
    pub power_on: bool,
    #[serde(rename = "frame", default)]
    pub frames: Vec<FrameDef>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FrameDef {
    #[serde(default = "FrameDef::default_fps")]
    pub fps: u16,
    #[serde(default = "FrameDef::default_repeat")]
    pub repeat: u16,
    #[serde(default)]
    pub points: Vec<PointDef>,
}

impl FrameDef {
    fn default_fps() -> u16 {
        30
    }
    fn default_repeat() -> u16 {
        1
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
pub enum PointDef {
    Pair(u8, u8),
    Flagged(u8, u8, bool),
    Table {
        x: u8,
        y: u8,
        #[serde(default)]
        blank: bool,
    },
}

impl PointDef {
    pub fn to_wire(self) -> WirePoint {
        match self {
            PointDef::Pair(x, y) => WirePoint::new(x, y, false),
            PointDef::Flagged(x, y, blank) | PointDef::Table { x, y, blank } => {
                WirePoint::new(x, y, blank)
            }
        }
    }
}

impl AnimationFile {
    pub fn load(path: &Path) -> Result<Self> {
        let txt = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::parse(&txt).with_context(|| format!("in {}", path.display()))
    }

    pub fn parse(txt: &str) -> Result<Self> {
        let file: AnimationFile = toml::from_str(txt).context("invalid animation TOML")?;
        file.validate()?;
        Ok(file)
    }

    pub fn slot(&self) -> Result<AnimationSlot> {
        AnimationSlot::from_index(usize::from(self.slot))
            .ok_or_else(|| anyhow!("slot must be below {ANIMATION_SLOTS}, got {}", self.slot))
    }

    fn validate(&self) -> Result<()> {
        self.slot()?;
        if self.frames.is_empty() {
            bail!("animation has no [[frame]] tables");
        }
        if self.frames.len() > MAX_FRAMES {
            bail!(
                "animation has {} frames, the player holds at most {MAX_FRAMES}",
                self.frames.len()
            );
        }
        for (i, frame) in self.frames.iter().enumerate() {
            if frame.fps == 0 {
                bail!("frame {i}: fps must be at least 1");
            }
            if frame.points.len() > MAX_POINTS_PER_FRAME {
                bail!(
                    "frame {i}: {} points, at most {MAX_POINTS_PER_FRAME} allowed",
                    frame.points.len()
                );
            }
            for (j, point) in frame.points.iter().enumerate() {
                let p = point.to_wire();
                if !p.in_grid() {
                    bail!(
                        "frame {i} point {j}: ({}, {}) is outside the {GRID_SIZE}x{GRID_SIZE} grid",
                        p.x,
                        p.y
                    );
                }
            }
        }
        Ok(())
    }

    /// Packets that upload this animation, in send order
    ///
    /// Select the slot first: frame updates land in the selected animation.
    pub fn packets(&self) -> Result<Vec<Packet>> {
        let mut packets = Vec::with_capacity(self.frames.len() + 4);
        packets.push(command_packet(Command::SelectAnimation(self.slot()?))?);

        for (i, frame) in self.frames.iter().enumerate() {
            let points: Vec<WirePoint> = frame.points.iter().map(|p| p.to_wire()).collect();
            let index = u8::try_from(i).context("frame index")?;
            let packet = encode_frame(index, frame.fps, frame.repeat, &points)
                .map_err(|e| anyhow!("frame {i}: {e:?}"))?;
            packets.push(packet);
        }

        let count = u8::try_from(self.frames.len()).context("frame count")?;
        packets.push(command_packet(Command::UpdateFrameCount(count))?);

        if let Some(enabled) = self.return_to_origin {
            packets.push(command_packet(Command::ReturnToOrigin(enabled))?);
        }
        if self.power_on {
            packets.push(command_packet(Command::PowerOn)?);
        }
        Ok(packets)
    }
}

pub fn command_packet(command: Command<'_>) -> Result<Packet> {
    command
        .to_packet()
        .map_err(|e| anyhow!("cannot build {:?} packet: {e:?}", command.code()))
}
