//! Raw frame devices
//!
//! A device moves whole Ethernet frames. `recv` never blocks: it either has a
//! frame ready or reports that there is nothing to read.

use std::collections::VecDeque;
use std::io;
use tun_tap::{Iface, Mode};

pub trait Device {
    /// Transmit one complete frame.
    fn send(&mut self, frame: &[u8]) -> io::Result<()>;

    /// Read one frame into `buf`, returning its length, or `None` when no
    /// frame is waiting.
    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>>;
}

/// Linux TAP interface.
pub struct TapDevice {
    iface: Iface,
}

impl TapDevice {
    /// Open (or create) the TAP interface `name` in non-blocking mode.
    pub fn open(name: &str) -> io::Result<Self> {
        let iface = Iface::without_packet_info(name, Mode::Tap)?;
        iface.set_non_blocking()?;
        Ok(TapDevice { iface })
    }

    pub fn name(&self) -> &str {
        self.iface.name()
    }
}

impl Device for TapDevice {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.iface.send(frame)?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        match self.iface.recv(buf) {
            Ok(n) => Ok(Some(n)),
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}

/// In-memory device: frames injected with `inject` are received in order,
/// and every sent frame is kept until taken.
#[derive(Debug, Default)]
pub struct MemoryDevice {
    rx_queue: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
}

impl MemoryDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a frame for the next `recv`.
    pub fn inject(&mut self, frame: Vec<u8>) {
        self.rx_queue.push_back(frame);
    }

    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    pub fn take_sent(&mut self) -> Vec<Vec<u8>> {
        std::mem::take(&mut self.sent)
    }
}

impl Device for MemoryDevice {
    fn send(&mut self, frame: &[u8]) -> io::Result<()> {
        self.sent.push(frame.to_vec());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8]) -> io::Result<Option<usize>> {
        let frame = match self.rx_queue.pop_front() {
            Some(frame) => frame,
            None => return Ok(None),
        };
        if frame.len() > buf.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("frame of {} bytes exceeds receive buffer", frame.len()),
            ));
        }
        buf[..frame.len()].copy_from_slice(&frame);
        Ok(Some(frame.len()))
    }
}
