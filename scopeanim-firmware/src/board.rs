//! Board wiring for a Raspberry Pi Pico
//!
//! | Signal | GPIO | Notes |
//! |---|---|---|
//! | UART0 TX | 0 | unused, host link is receive-only |
//! | UART0 RX | 1 | host packets at 115200 8N1 |
//! | I2C0 SDA | 4 | MCP4728 |
//! | I2C0 SCL | 5 | MCP4728 |
//! | LDAC | 6 | MCP4728 latch, active low |
//! | Z | 7 | scope Z input, low hides the beam |
//! | LED | 25 | on-board status LED |
//!
//! Also adapts embassy peripherals to the scopeanim-hal and scopeanim-core
//! traits where the embedded-hal wrappers don't fit.

use core::cell::RefCell;

use embassy_rp::gpio::Output;
use embassy_rp::i2c::{Blocking, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;

use scopeanim_core::traits::FrameTimer;
use scopeanim_core::Runtime;
use scopeanim_drivers::compat::{EhI2c, EhPin};
use scopeanim_drivers::{LedIndicator, ScopeOutput};
use scopeanim_hal::{OneShotTimer, OutputPin};
use scopeanim_protocol::RX_RING_SIZE;

use crate::channels::{BeamCommand, BEAM_TIMER, FRAME_RATE};

/// Size of the UART driver's own receive buffer
pub const UART_RX_BUF_SIZE: usize = 256;

/// Bytes moved from the UART driver into the ring per read
pub const UART_READ_CHUNK: usize = 64;

pub type DacBus = EhI2c<I2c<'static, I2C0, Blocking>>;
pub type DacLatch = EhPin<Output<'static>>;
pub type BoardOutput = ScopeOutput<DacBus, DacLatch, SharedZ, BeamTimer>;
pub type BoardIndicator = LedIndicator<EhPin<Output<'static>>>;
pub type BoardRuntime = Runtime<'static, RX_RING_SIZE, BoardOutput, SignalFrameTimer, BoardIndicator>;

/// Z line, driven by the player and released by the beam task
static Z_PIN: Mutex<CriticalSectionRawMutex, RefCell<Option<Output<'static>>>> =
    Mutex::new(RefCell::new(None));

/// Hand the Z pin to the shared slot; call once before the beam task starts
pub fn install_z_pin(pin: Output<'static>) {
    Z_PIN.lock(|slot| *slot.borrow_mut() = Some(pin));
}

/// Handle to the shared Z pin
pub struct SharedZ;

impl OutputPin for SharedZ {
    fn set_high(&mut self) {
        Z_PIN.lock(|slot| {
            if let Some(pin) = slot.borrow_mut().as_mut() {
                pin.set_high();
            }
        });
    }

    fn set_low(&mut self) {
        Z_PIN.lock(|slot| {
            if let Some(pin) = slot.borrow_mut().as_mut() {
                pin.set_low();
            }
        });
    }

    fn is_set_high(&self) -> bool {
        Z_PIN.lock(|slot| slot.borrow().as_ref().is_some_and(|pin| pin.is_set_high()))
    }
}

/// Beam release timer backed by the beam task
pub struct BeamTimer;

impl OneShotTimer for BeamTimer {
    fn arm(&mut self) {
        BEAM_TIMER.signal(BeamCommand::Arm);
    }

    fn disarm(&mut self) {
        BEAM_TIMER.signal(BeamCommand::Disarm);
    }
}

/// Frame timer backed by the frame tick task
pub struct SignalFrameTimer {
    fps: u16,
    running: bool,
}

impl SignalFrameTimer {
    pub const fn new() -> Self {
        Self {
            fps: 1,
            running: false,
        }
    }
}

impl FrameTimer for SignalFrameTimer {
    fn set_rate(&mut self, fps: u16) {
        self.fps = fps;
        if self.running {
            FRAME_RATE.signal(Some(fps));
        }
    }

    fn start(&mut self) {
        self.running = true;
        FRAME_RATE.signal(Some(self.fps));
    }

    fn stop(&mut self) {
        self.running = false;
        FRAME_RATE.signal(None);
    }
}
