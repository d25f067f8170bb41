//! Frame timer trait

/// Periodic frame tick source
///
/// Implementations raise the shared [`TickFlag`](crate::timing::TickFlag)
/// at the programmed rate while started.
pub trait FrameTimer {
    /// Program the tick rate; takes effect on the next period
    fn set_rate(&mut self, fps: u16);

    fn start(&mut self);

    fn stop(&mut self);
}
