//! Serial link to the player
//!
//! The link is one-way: packets are stuffed, prefixed with the delimiter and
//! written out. A short gap after each packet gives the firmware time to
//! drain its receive ring while it renders.

use std::io::Write;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serialport::{available_ports, SerialPort, SerialPortType};

use scopeanim_protocol::Packet;

/// Wire bytes for one packet, leading delimiter included
pub fn encode_wire(packet: &Packet) -> Result<Vec<u8>> {
    let encoded = packet
        .encode_to_vec()
        .map_err(|e| anyhow!("encode packet 0x{:02x}: {e:?}", packet.command()))?;
    Ok(encoded.to_vec())
}

pub fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub struct Link<W> {
    writer: W,
    gap: Duration,
    sent_bytes: usize,
}

impl Link<Box<dyn SerialPort>> {
    pub fn open(path: &str, baud: u32, gap: Duration) -> Result<Self> {
        let port = serialport::new(path, baud)
            .timeout(Duration::from_secs(1))
            .open()
            .with_context(|| format!("open serial port {path} at {baud} baud"))?;
        Ok(Self::new(port, gap))
    }
}

impl<W: Write> Link<W> {
    pub fn new(writer: W, gap: Duration) -> Self {
        Self {
            writer,
            gap,
            sent_bytes: 0,
        }
    }

    /// Send one packet; returns its size on the wire
    pub fn send(&mut self, packet: &Packet) -> Result<usize> {
        let wire = encode_wire(packet)?;
        self.writer.write_all(&wire).context("serial write")?;
        self.writer.flush().context("serial flush")?;
        self.sent_bytes += wire.len();
        if !self.gap.is_zero() {
            thread::sleep(self.gap);
        }
        Ok(wire.len())
    }

    pub fn send_all(&mut self, packets: &[Packet]) -> Result<usize> {
        packets.iter().try_fold(0, |total, p| Ok(total + self.send(p)?))
    }

    pub fn sent_bytes(&self) -> usize {
        self.sent_bytes
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// One line per detected port
pub fn describe_ports() -> Result<Vec<String>> {
    let ports = available_ports().context("enumerate serial ports")?;
    Ok(ports
        .into_iter()
        .map(|p| {
            let extra = match &p.port_type {
                SerialPortType::UsbPort(info) => format!(
                    "usb vid={:04x} pid={:04x} {}",
                    info.vid,
                    info.pid,
                    info.product.as_deref().unwrap_or("")
                ),
                SerialPortType::PciPort => "pci".to_string(),
                SerialPortType::BluetoothPort => "bluetooth".to_string(),
                SerialPortType::Unknown => String::new(),
            };
            format!("{} {extra}", p.port_name).trim_end().to_string()
        })
        .collect())
}
