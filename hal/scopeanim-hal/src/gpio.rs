//! Output lines
//!
//! LDAC, Z and the status LED are all push-pull outputs; nothing on the
//! board is read back, so there is no input trait.

/// A push-pull output whose driven level can be queried
pub trait OutputPin {
    fn set_high(&mut self);

    fn set_low(&mut self);

    /// Drive `high` as a level
    fn set_state(&mut self, high: bool) {
        match high {
            true => self.set_high(),
            false => self.set_low(),
        }
    }

    /// Level last driven, not a read of the pad
    fn is_set_high(&self) -> bool;

    fn is_set_low(&self) -> bool {
        !self.is_set_high()
    }
}

impl<P: OutputPin + ?Sized> OutputPin for &mut P {
    fn set_high(&mut self) {
        P::set_high(self);
    }

    fn set_low(&mut self) {
        P::set_low(self);
    }

    fn is_set_high(&self) -> bool {
        P::is_set_high(self)
    }
}
