//! Coordinate output trait

/// Drives the analog XY output and the beam
///
/// Called once per point per frame tick, so implementations must not block
/// for longer than a point's settle time.
pub trait CoordinateOutput {
    type Error;

    /// Move the beam to `(x, y)` on the grid
    ///
    /// With `blank` set the beam is hidden while it travels.
    fn set_output(&mut self, x: u8, y: u8, blank: bool) -> Result<(), Self::Error>;

    /// Bring the output out of idle and enable the beam
    fn power_up(&mut self) -> Result<(), Self::Error>;

    /// Idle the output and hold the beam off
    fn power_down(&mut self) -> Result<(), Self::Error>;
}
