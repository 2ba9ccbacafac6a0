//! Error type shared by every layer.
//!
//! Malformed packets are not errors; they are dropped where they are found.
//! What ends up here are faults the caller can act on: buffer limits, full
//! tables, ports already taken and device I/O.

use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("buffer has no room to grow by {requested} bytes (available {available})")]
    BufferOverflow { requested: usize, available: usize },

    #[error("cannot remove {requested} bytes from a {len}-byte buffer")]
    BufferUnderflow { requested: usize, len: usize },

    #[error("table is full ({capacity} entries)")]
    TableFull { capacity: usize },

    #[error("payload of {len} bytes exceeds the {max}-byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("udp port {0} is already open")]
    PortInUse(u16),

    #[error("device i/o: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
