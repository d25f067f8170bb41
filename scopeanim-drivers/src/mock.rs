//! Test doubles for the hal traits

use scopeanim_hal::{I2cBus, OneShotTimer, OutputPin};

use crate::dac::mcp4728::DEFAULT_ADDRESS;

/// Event log shared by mocks that need a global ordering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Write,
    LdacHigh,
    LdacLow,
    ZHigh,
    ZLow,
    Arm,
    Disarm,
}

/// Records I2C writes, keeping the last eight
#[derive(Default)]
pub(crate) struct MockBus {
    pub writes: [[u8; 9]; 8],
    pub lens: [usize; 8],
    pub count: usize,
    pub fail: bool,
}

impl MockBus {
    pub fn last(&self) -> &[u8] {
        let i = (self.count - 1) % 8;
        &self.writes[i][..self.lens[i]]
    }
}

impl I2cBus for MockBus {
    type Error = ();

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
        assert_eq!(address, DEFAULT_ADDRESS);
        if self.fail {
            return Err(());
        }
        let i = self.count % 8;
        self.writes[i] = [0; 9];
        self.writes[i][..data.len()].copy_from_slice(data);
        self.lens[i] = data.len();
        self.count += 1;
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct MockPin {
    pub high: bool,
    pub falls: u32,
}

impl MockPin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OutputPin for MockPin {
    fn set_high(&mut self) {
        self.high = true;
    }

    fn set_low(&mut self) {
        if self.high {
            self.falls += 1;
        }
        self.high = false;
    }

    fn is_set_high(&self) -> bool {
        self.high
    }
}

#[derive(Default)]
pub(crate) struct MockTimer {
    pub armed: bool,
    pub arms: u32,
}

impl OneShotTimer for MockTimer {
    fn arm(&mut self) {
        self.armed = true;
        self.arms += 1;
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

/// Appends to an event log so tests can assert cross-device ordering
pub(crate) struct Logged<'a, T> {
    pub inner: T,
    pub log: &'a core::cell::RefCell<std::vec::Vec<Event>>,
    pub high: Event,
    pub low: Event,
}

impl<T: OutputPin> OutputPin for Logged<'_, T> {
    fn set_high(&mut self) {
        self.log.borrow_mut().push(self.high);
        self.inner.set_high();
    }

    fn set_low(&mut self) {
        self.log.borrow_mut().push(self.low);
        self.inner.set_low();
    }

    fn is_set_high(&self) -> bool {
        self.inner.is_set_high()
    }
}

impl<T: I2cBus> I2cBus for Logged<'_, T> {
    type Error = T::Error;

    fn write(&mut self, address: u8, data: &[u8]) -> Result<(), T::Error> {
        self.log.borrow_mut().push(Event::Write);
        self.inner.write(address, data)
    }
}

impl<T: OneShotTimer> OneShotTimer for Logged<'_, T> {
    fn arm(&mut self) {
        self.log.borrow_mut().push(self.high);
        self.inner.arm();
    }

    fn disarm(&mut self) {
        self.log.borrow_mut().push(self.low);
        self.inner.disarm();
    }
}
