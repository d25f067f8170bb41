//! Timer abstractions

/// One-shot hardware timer
///
/// Armed from the main loop; when it expires the owner's handler runs once
/// and the timer disarms itself. Arming an already armed timer restarts the
/// countdown.
pub trait OneShotTimer {
    /// Start (or restart) the countdown
    fn arm(&mut self);

    /// Cancel a pending expiry
    fn disarm(&mut self);
}

impl<T: OneShotTimer + ?Sized> OneShotTimer for &mut T {
    fn arm(&mut self) {
        (**self).arm();
    }

    fn disarm(&mut self) {
        (**self).disarm();
    }
}
