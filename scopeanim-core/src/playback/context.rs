//! Playback context
//!
//! Owns the animation table, the frame cursor and the collaborators. The
//! dispatcher mutates it in response to commands; the main loop calls
//! [`PlaybackContext::on_frame_tick`] whenever the frame timer fired.

use scopeanim_protocol::{AnimationSlot, FrameUpdate};

use super::state::{PlayerEvent, PlayerState};
use crate::animation::{
    default_animations, Animation, AnimationError, Point, ANIMATION_SLOTS, MAX_FRAMES,
    MAX_POINTS_PER_FRAME,
};
use crate::config::PlayerConfig;
use crate::traits::{CoordinateOutput, FrameTimer, StatusIndicator};

/// What a single frame tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// Animation slot rendered
    pub animation: usize,
    /// Frame rendered
    pub frame: usize,
    /// Outputs written, origin point included
    pub points: usize,
    /// Outputs the collaborator rejected
    pub output_errors: usize,
    /// Frame selected after this tick, if the repeat count ran out
    pub advanced_to: Option<usize>,
}

/// Process-wide playback state
pub struct PlaybackContext<O, T, L> {
    config: PlayerConfig,
    state: PlayerState,
    animations: [Animation; ANIMATION_SLOTS],
    selected_animation: AnimationSlot,
    selected_frame: usize,
    repeat_counter: u16,
    return_to_origin: bool,
    output: O,
    timer: T,
    indicator: L,
}

impl<O, T, L> PlaybackContext<O, T, L>
where
    O: CoordinateOutput,
    T: FrameTimer,
    L: StatusIndicator,
{
    /// Create a context holding the built-in boot pattern
    pub fn new(config: PlayerConfig, output: O, timer: T, indicator: L) -> Self {
        Self::with_animations(config, default_animations(), output, timer, indicator)
    }

    pub fn with_animations(
        config: PlayerConfig,
        animations: [Animation; ANIMATION_SLOTS],
        output: O,
        timer: T,
        indicator: L,
    ) -> Self {
        Self {
            config,
            state: PlayerState::Idle,
            animations,
            selected_animation: AnimationSlot::Zero,
            selected_frame: 0,
            repeat_counter: 0,
            return_to_origin: config.return_to_origin,
            output,
            timer,
            indicator,
        }
    }

    /// Boot sequence: select slot 0 and, with autostart, begin playing
    pub fn start(&mut self) -> Result<(), O::Error> {
        self.select_animation(AnimationSlot::Zero);
        if self.config.autostart {
            self.power_on()
        } else {
            self.power_off()
        }
    }

    /// Restart at frame 0 with the tick running and the beam enabled
    pub fn power_on(&mut self) -> Result<(), O::Error> {
        // Nothing changes until the output is up
        self.output.power_up()?;
        self.select_frame(0);
        self.timer.start();
        self.state = self.state.transition(PlayerEvent::PowerOn);
        Ok(())
    }

    /// Stop the tick and idle the output
    pub fn power_off(&mut self) -> Result<(), O::Error> {
        self.timer.stop();
        self.state = self.state.transition(PlayerEvent::PowerOff);
        self.output.power_down()
    }

    pub fn select_animation(&mut self, slot: AnimationSlot) {
        self.selected_animation = slot;
        self.select_frame(0);
    }

    /// Make `index` current, reset its repeat counter and reprogram the tick
    ///
    /// Indices beyond the frame count are ignored and return `false`.
    pub fn select_frame(&mut self, index: usize) -> bool {
        let animation = &self.animations[self.selected_animation.index()];
        if index >= animation.frame_count() {
            return false;
        }
        let fps = animation.frame(index).map_or(0, |frame| frame.fps);

        self.selected_frame = index;
        self.repeat_counter = 0;
        self.timer.set_rate(self.config.effective_fps(fps));
        true
    }

    /// Replace one frame of the selected animation
    ///
    /// The stored rate is floored at `min_fps`. Replacing the frame that is
    /// currently playing restarts it at the new rate.
    pub fn update_frame(&mut self, update: &FrameUpdate<'_>) -> Result<(), AnimationError> {
        let index = usize::from(update.index);
        if index >= MAX_FRAMES {
            return Err(AnimationError::FrameIndexOutOfRange(index));
        }
        if update.points.len() > MAX_POINTS_PER_FRAME {
            return Err(AnimationError::TooManyPoints(update.points.len()));
        }

        let fps = self.config.effective_fps(update.fps);
        let frame = self.animations[self.selected_animation.index()].frame_mut(index)?;
        frame.replace(fps, update.repeat_count, update.points.iter().map(Point::from))?;

        if index == self.selected_frame {
            self.select_frame(index);
        }
        Ok(())
    }

    /// Set the selected animation's frame count, clamped into `[1, MAX_FRAMES]`
    ///
    /// Playback restarts at frame 0. Returns the count applied.
    pub fn set_frame_count(&mut self, count: u8) -> usize {
        let applied = self.animations[self.selected_animation.index()].set_frame_count(count);
        self.select_frame(0);
        applied
    }

    pub fn set_indicator(&mut self, on: bool) {
        self.indicator.set(on);
    }

    pub fn set_return_to_origin(&mut self, enabled: bool) {
        self.return_to_origin = enabled;
    }

    /// Render the current frame once and advance when its repeats run out
    ///
    /// Returns `None` while idle.
    pub fn on_frame_tick(&mut self) -> Option<TickReport> {
        if !self.state.is_playing() {
            return None;
        }

        let slot = self.selected_animation.index();
        let animation = &self.animations[slot];
        let frame = animation.frame(self.selected_frame)?;

        let mut report = TickReport {
            animation: slot,
            frame: self.selected_frame,
            points: 0,
            output_errors: 0,
            advanced_to: None,
        };

        let origin = self.return_to_origin.then_some(Point::ORIGIN);
        for point in frame.points().iter().chain(origin.iter()) {
            match self.output.set_output(point.x, point.y, point.blank) {
                Ok(()) => report.points += 1,
                Err(_) => report.output_errors += 1,
            }
        }

        let repeats = frame.repeats();
        let frame_count = animation.frame_count();

        self.repeat_counter = self.repeat_counter.saturating_add(1);
        if self.repeat_counter >= repeats {
            let next = if self.selected_frame + 1 >= frame_count {
                0
            } else {
                self.selected_frame + 1
            };
            self.select_frame(next);
            report.advanced_to = Some(next);
        }

        Some(report)
    }

    pub fn state(&self) -> PlayerState {
        self.state
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn selected_animation(&self) -> AnimationSlot {
        self.selected_animation
    }

    pub fn selected_frame(&self) -> usize {
        self.selected_frame
    }

    pub fn repeat_counter(&self) -> u16 {
        self.repeat_counter
    }

    pub fn return_to_origin(&self) -> bool {
        self.return_to_origin
    }

    pub fn animation(&self, slot: AnimationSlot) -> &Animation {
        &self.animations[slot.index()]
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn output_mut(&mut self) -> &mut O {
        &mut self.output
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Frame;
    use crate::mock::{BusFault, MockIndicator, MockTimer, RecordingOutput};
    use scopeanim_protocol::{PointList, WirePoint};
    use std::vec;
    use std::vec::Vec;

    type Context = PlaybackContext<RecordingOutput, MockTimer, MockIndicator>;

    fn context_with(frames: &[Frame], config: PlayerConfig) -> Context {
        let animations = [Animation::from_frames(frames).unwrap(), Animation::new()];
        PlaybackContext::with_animations(
            config,
            animations,
            RecordingOutput::default(),
            MockTimer::default(),
            MockIndicator::default(),
        )
    }

    fn dot(x: u8) -> Frame {
        Frame::new(30, 1, &[Point::new(x, x)]).unwrap()
    }

    fn rendered_x(ctx: &mut Context) -> Vec<u8> {
        ctx.output_mut().take().into_iter().map(|(x, _, _)| x).collect()
    }

    #[test]
    fn test_autostart_plays_slot_zero() {
        let mut ctx = PlaybackContext::new(
            PlayerConfig::default(),
            RecordingOutput::default(),
            MockTimer::default(),
            MockIndicator::default(),
        );
        ctx.start().unwrap();

        assert_eq!(ctx.state(), PlayerState::Playing);
        assert!(ctx.timer().running);
        assert_eq!(ctx.timer().rate, Some(60));
        assert!(ctx.output().powered);

        ctx.on_frame_tick().unwrap();
        assert_eq!(ctx.output_mut().take(), vec![(2, 2, false)]);
    }

    #[test]
    fn test_without_autostart_stays_idle() {
        let config = PlayerConfig {
            autostart: false,
            ..PlayerConfig::default()
        };
        let mut ctx = context_with(&[dot(1)], config);
        ctx.start().unwrap();

        assert_eq!(ctx.state(), PlayerState::Idle);
        assert!(!ctx.timer().running);
        assert!(ctx.on_frame_tick().is_none());
        assert!(ctx.output().points.is_empty());
    }

    #[test]
    fn test_failed_power_up_leaves_player_idle() {
        let config = PlayerConfig {
            autostart: false,
            ..PlayerConfig::default()
        };
        let mut ctx = context_with(&[dot(1)], config);
        ctx.start().unwrap();
        ctx.output_mut().fail_power_up = true;

        assert_eq!(ctx.power_on(), Err(BusFault));
        assert_eq!(ctx.state(), PlayerState::Idle);
        assert!(!ctx.timer().running);
        assert!(!ctx.output().powered);
        assert!(ctx.on_frame_tick().is_none());
    }

    #[test]
    fn test_repeat_count_three_renders_three_times() {
        let frames = [
            Frame::new(30, 3, &[Point::new(1, 1)]).unwrap(),
            Frame::new(30, 1, &[Point::new(2, 2)]).unwrap(),
        ];
        let mut ctx = context_with(&frames, PlayerConfig::default());
        ctx.power_on().unwrap();

        for _ in 0..5 {
            ctx.on_frame_tick();
        }
        assert_eq!(rendered_x(&mut ctx), vec![1, 1, 1, 2, 1]);
    }

    #[test]
    fn test_last_frame_wraps_to_zero() {
        let mut ctx = context_with(&[dot(1), dot(2), dot(3)], PlayerConfig::default());
        ctx.power_on().unwrap();

        assert_eq!(ctx.on_frame_tick().unwrap().advanced_to, Some(1));
        assert_eq!(ctx.on_frame_tick().unwrap().advanced_to, Some(2));
        let report = ctx.on_frame_tick().unwrap();
        assert_eq!(report.frame, 2);
        assert_eq!(report.advanced_to, Some(0));
        assert_eq!(ctx.selected_frame(), 0);
    }

    #[test]
    fn test_advance_reprograms_rate() {
        let frames = [
            Frame::new(30, 1, &[]).unwrap(),
            Frame::new(2, 1, &[]).unwrap(),
        ];
        let mut ctx = context_with(&frames, PlayerConfig::default());
        ctx.power_on().unwrap();
        assert_eq!(ctx.timer().rate, Some(30));

        ctx.on_frame_tick();
        // Floored at min_fps
        assert_eq!(ctx.timer().rate, Some(5));
    }

    #[test]
    fn test_return_to_origin_appends_point() {
        let mut ctx = context_with(&[dot(9)], PlayerConfig::default());
        ctx.power_on().unwrap();
        ctx.set_return_to_origin(true);

        let report = ctx.on_frame_tick().unwrap();
        assert_eq!(report.points, 2);
        assert_eq!(ctx.output_mut().take(), vec![(9, 9, false), (0, 0, false)]);
    }

    #[test]
    fn test_blank_flag_reaches_output() {
        let frame = Frame::new(30, 1, &[Point::blanked(4, 5), Point::new(6, 7)]).unwrap();
        let mut ctx = context_with(&[frame], PlayerConfig::default());
        ctx.power_on().unwrap();
        ctx.on_frame_tick();
        assert_eq!(ctx.output_mut().take(), vec![(4, 5, true), (6, 7, false)]);
    }

    #[test]
    fn test_power_off_stops_and_idles() {
        let mut ctx = context_with(&[dot(1)], PlayerConfig::default());
        ctx.power_on().unwrap();
        ctx.power_off().unwrap();

        assert_eq!(ctx.state(), PlayerState::Idle);
        assert!(!ctx.timer().running);
        assert!(!ctx.output().powered);
        assert_eq!(ctx.output().power_downs, 1);
        assert!(ctx.on_frame_tick().is_none());
    }

    #[test]
    fn test_power_on_restarts_at_frame_zero() {
        let mut ctx = context_with(&[dot(1), dot(2)], PlayerConfig::default());
        ctx.power_on().unwrap();
        ctx.on_frame_tick();
        assert_eq!(ctx.selected_frame(), 1);

        ctx.power_on().unwrap();
        assert_eq!(ctx.selected_frame(), 0);
        assert_eq!(ctx.repeat_counter(), 0);
    }

    #[test]
    fn test_update_current_frame_reselects() {
        let mut ctx = context_with(&[dot(1), dot(2)], PlayerConfig::default());
        ctx.power_on().unwrap();

        let bytes = [WirePoint::new(7, 8, false).to_bytes(), WirePoint::new(9, 10, true).to_bytes()];
        let flat: Vec<u8> = bytes.iter().flatten().copied().collect();
        let update = FrameUpdate {
            index: 0,
            fps: 48,
            repeat_count: 2,
            points: PointList::from_wire(&flat),
        };
        ctx.update_frame(&update).unwrap();

        assert_eq!(ctx.timer().rate, Some(48));
        let frame = ctx.animation(AnimationSlot::Zero).frame(0).unwrap();
        assert_eq!(frame.points(), &[Point::new(7, 8), Point::blanked(9, 10)]);
        assert_eq!(frame.repeat_count, 2);
    }

    #[test]
    fn test_update_other_frame_keeps_rate() {
        let mut ctx = context_with(&[dot(1), dot(2)], PlayerConfig::default());
        ctx.power_on().unwrap();
        let rates_before = ctx.timer().rates.len();

        let update = FrameUpdate {
            index: 1,
            fps: 1,
            repeat_count: 1,
            points: PointList::from_wire(&[]),
        };
        ctx.update_frame(&update).unwrap();

        assert_eq!(ctx.timer().rates.len(), rates_before);
        // Stored rate is floored
        assert_eq!(ctx.animation(AnimationSlot::Zero).frame(1).unwrap().fps, 5);
    }

    #[test]
    fn test_update_rejects_frame_index_ten() {
        let mut ctx = context_with(&[dot(1)], PlayerConfig::default());
        let before = ctx.animation(AnimationSlot::Zero).clone();

        let update = FrameUpdate {
            index: MAX_FRAMES as u8,
            fps: 30,
            repeat_count: 1,
            points: PointList::from_wire(&[]),
        };
        assert_eq!(
            ctx.update_frame(&update),
            Err(AnimationError::FrameIndexOutOfRange(MAX_FRAMES))
        );
        assert_eq!(ctx.animation(AnimationSlot::Zero), &before);
    }

    #[test]
    fn test_update_targets_selected_animation() {
        let mut ctx = context_with(&[dot(1)], PlayerConfig::default());
        ctx.select_animation(AnimationSlot::One);

        let flat = WirePoint::new(3, 3, false).to_bytes();
        let update = FrameUpdate {
            index: 0,
            fps: 30,
            repeat_count: 1,
            points: PointList::from_wire(&flat),
        };
        ctx.update_frame(&update).unwrap();

        assert_eq!(
            ctx.animation(AnimationSlot::One).frame(0).unwrap().points(),
            &[Point::new(3, 3)]
        );
        assert_eq!(
            ctx.animation(AnimationSlot::Zero).frame(0).unwrap().points(),
            &[Point::new(1, 1)]
        );
    }

    #[test]
    fn test_frame_count_clamps_and_restarts() {
        let mut ctx = context_with(&[dot(1), dot(2)], PlayerConfig::default());
        ctx.power_on().unwrap();
        ctx.on_frame_tick();
        assert_eq!(ctx.selected_frame(), 1);

        assert_eq!(ctx.set_frame_count(0), 1);
        assert_eq!(ctx.selected_frame(), 0);
        assert_eq!(ctx.set_frame_count(99), MAX_FRAMES);
    }

    #[test]
    fn test_select_animation_resets_cursor() {
        let mut ctx = context_with(&[dot(1), dot(2)], PlayerConfig::default());
        ctx.power_on().unwrap();
        ctx.on_frame_tick();

        ctx.select_animation(AnimationSlot::One);
        assert_eq!(ctx.selected_animation(), AnimationSlot::One);
        assert_eq!(ctx.selected_frame(), 0);
    }

    #[test]
    fn test_select_frame_beyond_count_ignored() {
        let mut ctx = context_with(&[dot(1), dot(2)], PlayerConfig::default());
        assert!(!ctx.select_frame(2));
        assert!(ctx.select_frame(1));
        assert_eq!(ctx.selected_frame(), 1);
    }

    #[test]
    fn test_output_errors_counted() {
        let mut ctx = context_with(&[dot(1)], PlayerConfig::default());
        ctx.power_on().unwrap();
        ctx.output_mut().fail = true;

        let report = ctx.on_frame_tick().unwrap();
        assert_eq!(report.points, 0);
        assert_eq!(report.output_errors, 1);
        // Playback still advances
        assert_eq!(report.advanced_to, Some(0));
    }

    #[test]
    fn test_indicator() {
        let mut ctx = context_with(&[dot(1)], PlayerConfig::default());
        ctx.set_indicator(true);
        assert!(ctx.indicator().on);
        ctx.set_indicator(false);
        assert!(!ctx.indicator().on);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn each_frame_renders_its_repeat_count(
                repeats in prop::collection::vec(0u16..6, 1..=MAX_FRAMES),
            ) {
                let frames: Vec<Frame> = repeats
                    .iter()
                    .enumerate()
                    .map(|(i, &r)| Frame::new(30, r, &[Point::new(i as u8, 0)]).unwrap())
                    .collect();
                let mut ctx = context_with(&frames, PlayerConfig::default());
                ctx.power_on().unwrap();

                let cycle: u32 = repeats.iter().map(|&r| u32::from(r.max(1))).sum();
                for _ in 0..cycle * 2 {
                    ctx.on_frame_tick();
                }

                let mut expected = Vec::new();
                for _ in 0..2 {
                    for (i, &r) in repeats.iter().enumerate() {
                        for _ in 0..r.max(1) {
                            expected.push(i as u8);
                        }
                    }
                }
                prop_assert_eq!(rendered_x(&mut ctx), expected);
                prop_assert_eq!(ctx.selected_frame(), 0);
            }
        }
    }
}
