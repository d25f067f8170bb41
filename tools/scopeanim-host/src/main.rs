mod animation;
mod link;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use animation::{command_packet, AnimationFile};
use link::{describe_ports, encode_wire, hex, Link};
use scopeanim_protocol::{AnimationSlot, Command, Packet, BAUD_RATE, MAX_FRAMES};

/// scopeanim: drive the oscilloscope animation player over its serial link.
#[derive(Parser, Debug)]
#[command(name = "scopeanim", version)]
struct Cli {
    /// Serial port of the player.
    #[arg(long, short, env = "SCOPEANIM_PORT", global = true)]
    port: Option<String>,
    /// Baud rate.
    #[arg(long, default_value_t = BAUD_RATE, global = true)]
    baud: u32,
    /// Pause after each packet, in milliseconds.
    #[arg(long, default_value_t = 20, global = true)]
    gap_ms: u64,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Start or stop playback.
    Power {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Make an animation slot active.
    Select {
        #[arg(value_parser = clap::value_parser!(u8).range(0..2))]
        slot: u8,
    },
    /// Set the frame count of the active animation.
    FrameCount {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=MAX_FRAMES as i64))]
        count: u8,
    },
    /// Drive the status LED.
    Led {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Emit an origin point after every frame.
    Origin {
        #[arg(value_enum)]
        state: Switch,
    },
    /// Upload an animation file.
    Upload {
        file: PathBuf,
        /// Override the file's target slot.
        #[arg(long)]
        slot: Option<u8>,
        /// Send PowerOn after the upload even if the file doesn't ask for it.
        #[arg(long, default_value_t = false)]
        power_on: bool,
    },
    /// Print the wire bytes of an animation upload without sending it.
    Encode { file: PathBuf },
    /// List serial ports.
    Ports,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl Switch {
    fn is_on(self) -> bool {
        matches!(self, Switch::On)
    }
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let packets = match &cli.cmd {
        Cmd::Ports => {
            let ports = describe_ports()?;
            if ports.is_empty() {
                println!("no serial ports found");
            }
            for line in ports {
                println!("{line}");
            }
            return Ok(());
        }
        Cmd::Encode { file } => {
            let anim = AnimationFile::load(file)?;
            for packet in anim.packets()? {
                println!("{}", hex(&encode_wire(&packet)?));
            }
            return Ok(());
        }
        Cmd::Upload {
            file,
            slot,
            power_on,
        } => {
            let mut anim = AnimationFile::load(file)?;
            if let Some(slot) = slot {
                anim.slot = *slot;
                anim.slot().context("--slot")?;
            }
            anim.power_on |= *power_on;
            println!(
                "{}: {} frame(s) -> slot {}",
                file.display(),
                anim.frames.len(),
                anim.slot
            );
            anim.packets()?
        }
        cmd => vec![single_command(cmd)?],
    };

    let Some(port) = cli.port.as_deref() else {
        bail!("no serial port given, use --port or SCOPEANIM_PORT (see `scopeanim ports`)");
    };
    let mut link = Link::open(port, cli.baud, Duration::from_millis(cli.gap_ms))?;
    link.send_all(&packets)?;
    println!("sent {} packet(s), {} bytes", packets.len(), link.sent_bytes());
    Ok(())
}

fn single_command(cmd: &Cmd) -> Result<Packet> {
    let command = match cmd {
        Cmd::Power { state } if state.is_on() => Command::PowerOn,
        Cmd::Power { .. } => Command::PowerOff,
        Cmd::Select { slot } => Command::SelectAnimation(
            AnimationSlot::from_index(usize::from(*slot)).context("slot out of range")?,
        ),
        Cmd::FrameCount { count } => Command::UpdateFrameCount(*count),
        Cmd::Led { state } => Command::InfoLed(state.is_on()),
        Cmd::Origin { state } => Command::ReturnToOrigin(state.is_on()),
        Cmd::Upload { .. } | Cmd::Encode { .. } | Cmd::Ports => {
            bail!("not a single-packet command")
        }
    };
    command_packet(command)
}
