//! Scopeanim - XY Vector Animation Player Firmware
//!
//! Receives animation packets from a host over UART and redraws the selected
//! animation on an oscilloscope in XY mode through an MCP4728 DAC.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::{InterruptExecutor, Spawner};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Level, Output};
use embassy_rp::i2c::{self, I2c};
use embassy_rp::interrupt;
use embassy_rp::interrupt::{InterruptExt, Priority};
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_time::Duration;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use scopeanim_core::{PlaybackContext, PlayerConfig, Runtime};
use scopeanim_drivers::compat::{EhI2c, EhPin};
use scopeanim_drivers::{BeamConfig, BeamGate, LedIndicator, Mcp4728, Mcp4728Config, ScopeOutput};
use scopeanim_protocol::{DecodeSession, RxRing, BAUD_RATE, RX_RING_SIZE};

use crate::board::{BeamTimer, BoardRuntime, SharedZ, SignalFrameTimer, UART_RX_BUF_SIZE};

mod board;
mod channels;
mod tasks;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

/// Runs the beam release above the thread-mode tasks
static BEAM_EXECUTOR: InterruptExecutor = InterruptExecutor::new();

#[interrupt]
unsafe fn SWI_IRQ_1() {
    BEAM_EXECUTOR.on_interrupt()
}

// Static cells for buffers and state that tasks borrow forever
static TX_BUF: StaticCell<[u8; 16]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; UART_RX_BUF_SIZE]> = StaticCell::new();
static RX_RING: StaticCell<RxRing<RX_RING_SIZE>> = StaticCell::new();
static RUNTIME: StaticCell<BoardRuntime> = StaticCell::new();

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Scopeanim firmware starting...");

    let p = embassy_rp::init(Default::default());

    let dac_config = Mcp4728Config::default();
    let beam_config = BeamConfig::default();
    let player_config = PlayerConfig::default();

    // Host link: receive only
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = BAUD_RATE;
    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let tx_buf = TX_BUF.init([0u8; 16]);
    let rx_buf = RX_BUF.init([0u8; UART_RX_BUF_SIZE]);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (_tx, rx) = uart.split();

    let (producer, consumer) = RX_RING.init(RxRing::new()).split();
    info!("UART at {} baud, {} byte ring", BAUD_RATE, RX_RING_SIZE);

    // DAC on I2C0 with its LDAC latch
    let mut i2c_config = i2c::Config::default();
    i2c_config.frequency = dac_config.i2c.frequency;
    let i2c = I2c::new_blocking(p.I2C0, p.PIN_5, p.PIN_4, i2c_config);
    let ldac = EhPin::new(Output::new(p.PIN_6, Level::High));
    let dac = Mcp4728::new(EhI2c(i2c), ldac, dac_config);
    info!("MCP4728 at {:#x}, {} Hz", dac_config.address, dac_config.i2c.frequency);

    // Beam starts hidden
    board::install_z_pin(Output::new(p.PIN_7, Level::Low));
    let beam = BeamGate::new(SharedZ, BeamTimer, beam_config);

    let led = LedIndicator::new_active_high(EhPin::new(Output::new(p.PIN_25, Level::Low)));

    let player = PlaybackContext::new(
        player_config,
        ScopeOutput::new(dac, beam),
        SignalFrameTimer::new(),
        led,
    );
    let runtime = RUNTIME.init(Runtime::new(
        DecodeSession::new(consumer),
        player,
        &channels::FRAME_TICK,
    ));

    // Beam task first so the first point's arm isn't lost
    interrupt::SWI_IRQ_1.set_priority(Priority::P2);
    let beam_spawner = BEAM_EXECUTOR.start(interrupt::SWI_IRQ_1);
    beam_spawner.spawn(unwrap!(tasks::beam_task(Duration::from_micros(u64::from(
        beam_config.settle_us
    )))));

    spawner.spawn(unwrap!(tasks::frame_tick_task()));
    spawner.spawn(unwrap!(tasks::uart_rx_task(rx, producer)));

    match runtime.start() {
        Ok(()) => info!("Player started, state {:?}", runtime.player().state()),
        Err(e) => warn!("DAC fault during start: {:?}", e),
    }

    spawner.spawn(unwrap!(tasks::player_task(runtime)));

    info!("All tasks spawned, firmware running");
}
