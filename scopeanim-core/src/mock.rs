//! Recording collaborators for tests

use std::vec::Vec;

use crate::traits::{CoordinateOutput, FrameTimer, StatusIndicator};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusFault;

#[derive(Debug, Default)]
pub struct RecordingOutput {
    pub points: Vec<(u8, u8, bool)>,
    pub powered: bool,
    pub power_ups: u32,
    pub power_downs: u32,
    pub fail: bool,
    pub fail_power_up: bool,
}

impl RecordingOutput {
    pub fn take(&mut self) -> Vec<(u8, u8, bool)> {
        core::mem::take(&mut self.points)
    }
}

impl CoordinateOutput for RecordingOutput {
    type Error = BusFault;

    fn set_output(&mut self, x: u8, y: u8, blank: bool) -> Result<(), BusFault> {
        if self.fail {
            return Err(BusFault);
        }
        self.points.push((x, y, blank));
        Ok(())
    }

    fn power_up(&mut self) -> Result<(), BusFault> {
        if self.fail_power_up {
            return Err(BusFault);
        }
        self.power_ups += 1;
        self.powered = true;
        Ok(())
    }

    fn power_down(&mut self) -> Result<(), BusFault> {
        self.power_downs += 1;
        self.powered = false;
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MockTimer {
    pub rate: Option<u16>,
    pub rates: Vec<u16>,
    pub running: bool,
}

impl FrameTimer for MockTimer {
    fn set_rate(&mut self, fps: u16) {
        self.rate = Some(fps);
        self.rates.push(fps);
    }

    fn start(&mut self) {
        self.running = true;
    }

    fn stop(&mut self) {
        self.running = false;
    }
}

#[derive(Debug, Default)]
pub struct MockIndicator {
    pub on: bool,
}

impl StatusIndicator for MockIndicator {
    fn set(&mut self, on: bool) {
        self.on = on;
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
