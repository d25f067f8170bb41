//! Animation model
//!
//! An animation is a fixed table of [`MAX_FRAMES`] frame slots of which the
//! first `frame_count` are played. Frames are replaced in place by the
//! dispatcher and otherwise only read once per tick.

use heapless::Vec;
use scopeanim_protocol::WirePoint;

pub use scopeanim_protocol::{ANIMATION_SLOTS, GRID_SIZE, MAX_FRAMES, MAX_POINTS_PER_FRAME};

/// Errors from editing an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AnimationError {
    /// Frame index at or beyond [`MAX_FRAMES`]
    FrameIndexOutOfRange(usize),
    /// More than [`MAX_POINTS_PER_FRAME`] points
    TooManyPoints(usize),
}

/// One grid position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: u8,
    pub y: u8,
    /// Hide the beam while it travels to this point
    pub blank: bool,
}

impl Point {
    pub const ORIGIN: Point = Point::new(0, 0);

    pub const fn new(x: u8, y: u8) -> Self {
        Self { x, y, blank: false }
    }

    pub const fn blanked(x: u8, y: u8) -> Self {
        Self { x, y, blank: true }
    }
}

impl From<WirePoint> for Point {
    fn from(point: WirePoint) -> Self {
        Self {
            x: point.x,
            y: point.y,
            blank: point.blank,
        }
    }
}

/// A point list with its timing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Tick rate while this frame is selected
    pub fps: u16,
    /// Ticks before advancing; 0 behaves as 1
    pub repeat_count: u16,
    points: Vec<Point, MAX_POINTS_PER_FRAME>,
}

impl Default for Frame {
    fn default() -> Self {
        Self::empty()
    }
}

impl Frame {
    pub const fn empty() -> Self {
        Self {
            fps: 0,
            repeat_count: 1,
            points: Vec::new(),
        }
    }

    pub fn new(fps: u16, repeat_count: u16, points: &[Point]) -> Result<Self, AnimationError> {
        let mut frame = Self::empty();
        frame.replace(fps, repeat_count, points.iter().copied())?;
        Ok(frame)
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Ticks this frame stays selected
    pub fn repeats(&self) -> u16 {
        self.repeat_count.max(1)
    }

    /// Replace timing and points
    ///
    /// The frame is left untouched if the points do not fit.
    pub fn replace<I>(&mut self, fps: u16, repeat_count: u16, points: I) -> Result<(), AnimationError>
    where
        I: ExactSizeIterator<Item = Point>,
    {
        if points.len() > MAX_POINTS_PER_FRAME {
            return Err(AnimationError::TooManyPoints(points.len()));
        }
        self.points.clear();
        for point in points {
            self.points
                .push(point)
                .map_err(|_| AnimationError::TooManyPoints(MAX_POINTS_PER_FRAME + 1))?;
        }
        self.fps = fps;
        self.repeat_count = repeat_count;
        Ok(())
    }
}

/// A fixed table of frames
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Animation {
    frames: [Frame; MAX_FRAMES],
    frame_count: usize,
}

impl Default for Animation {
    fn default() -> Self {
        Self::new()
    }
}

impl Animation {
    /// One empty frame
    pub fn new() -> Self {
        Self {
            frames: core::array::from_fn(|_| Frame::empty()),
            frame_count: 1,
        }
    }

    /// Build from a list of frames, which becomes the frame count
    pub fn from_frames(frames: &[Frame]) -> Result<Self, AnimationError> {
        if frames.len() > MAX_FRAMES {
            return Err(AnimationError::FrameIndexOutOfRange(frames.len() - 1));
        }
        let mut animation = Self::new();
        for (slot, frame) in animation.frames.iter_mut().zip(frames) {
            *slot = frame.clone();
        }
        animation.frame_count = frames.len().max(1);
        Ok(animation)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    /// Clamp into `[1, MAX_FRAMES]` and apply; returns the stored count
    pub fn set_frame_count(&mut self, count: u8) -> usize {
        self.frame_count = usize::from(count).clamp(1, MAX_FRAMES);
        self.frame_count
    }

    /// Any of the [`MAX_FRAMES`] slots, played or not
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn frame_mut(&mut self, index: usize) -> Result<&mut Frame, AnimationError> {
        self.frames
            .get_mut(index)
            .ok_or(AnimationError::FrameIndexOutOfRange(index))
    }
}

/// Boot pattern shown before anything is uploaded
///
/// Slot 0 alternates between two corner dots, slot 1 holds a centre dot.
pub fn default_animations() -> [Animation; ANIMATION_SLOTS] {
    build_default_animations().unwrap_or_else(|_| [Animation::new(), Animation::new()])
}

fn build_default_animations() -> Result<[Animation; ANIMATION_SLOTS], AnimationError> {
    let corners = Animation::from_frames(&[
        Frame::new(60, 1, &[Point::new(2, 2)])?,
        Frame::new(60, 1, &[Point::new(63, 63)])?,
    ])?;
    let centre = Animation::from_frames(&[Frame::new(60, 1, &[Point::new(31, 31)])?])?;
    Ok([corners, centre])
}
