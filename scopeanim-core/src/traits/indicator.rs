//! Status indicator trait

/// A single on/off signal, typically an LED
pub trait StatusIndicator {
    fn set(&mut self, on: bool);

    fn is_on(&self) -> bool;
}
