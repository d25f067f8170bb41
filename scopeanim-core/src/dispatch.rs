//! Command dispatcher
//!
//! Turns a decoded packet into a call on the [`PlaybackContext`]. Every
//! check happens before any state is touched, so a rejected command leaves
//! the context exactly as it was.

use scopeanim_protocol::{Command, CommandCode, CommandError, RawPacket};

use crate::animation::AnimationError;
use crate::playback::PlaybackContext;
use crate::traits::{CoordinateOutput, FrameTimer, StatusIndicator};

/// Why a packet was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchError {
    /// Reserved code or payload too short for the command
    Command(CommandError),
    /// Frame index or point count out of range
    Animation(AnimationError),
    /// The coordinate output failed while powering up or down
    Output(CommandCode),
}

impl From<CommandError> for DispatchError {
    fn from(err: CommandError) -> Self {
        DispatchError::Command(err)
    }
}

impl From<AnimationError> for DispatchError {
    fn from(err: AnimationError) -> Self {
        DispatchError::Animation(err)
    }
}

/// Apply one decoded packet
///
/// Returns the command that was executed.
pub fn dispatch<O, T, L>(
    ctx: &mut PlaybackContext<O, T, L>,
    packet: &RawPacket<'_>,
) -> Result<CommandCode, DispatchError>
where
    O: CoordinateOutput,
    T: FrameTimer,
    L: StatusIndicator,
{
    let command = Command::from_packet(packet)?;
    let code = command.code();

    match command {
        Command::PowerOn => ctx.power_on().map_err(|_| DispatchError::Output(code))?,
        Command::PowerOff => ctx.power_off().map_err(|_| DispatchError::Output(code))?,
        Command::SelectAnimation(slot) => ctx.select_animation(slot),
        Command::UpdateFrame(update) => ctx.update_frame(&update)?,
        Command::UpdateFrameCount(count) => {
            ctx.set_frame_count(count);
        }
        Command::InfoLed(on) => ctx.set_indicator(on),
        Command::ReturnToOrigin(enabled) => ctx.set_return_to_origin(enabled),
    }

    Ok(code)
}
