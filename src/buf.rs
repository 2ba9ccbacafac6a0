//! Packet buffer with headroom and tailroom
//!
//! Layers push their header in front of the payload on the way down and pop
//! it on the way up. The bytes exposed by `add_header` are left as they were,
//! so a header that was just removed can be put back unchanged.

use crate::error::{Error, Result};

/// Room reserved in front of the payload: Ethernet + IPv4 + UDP/ICMP headers.
pub const DEFAULT_HEADROOM: usize = 64;

/// Room reserved behind the payload, enough to pad to a minimum Ethernet frame.
pub const DEFAULT_TAILROOM: usize = 64;

/// Owned byte region with adjustable front and back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buf {
    storage: Vec<u8>,
    start: usize,
    end: usize,
}

impl Buf {
    /// Create a zeroed buffer holding `len` bytes of data.
    pub fn new(len: usize) -> Self {
        Self::with_room(DEFAULT_HEADROOM, len, DEFAULT_TAILROOM)
    }

    /// Create a zeroed buffer with explicit head and tail room.
    pub fn with_room(headroom: usize, len: usize, tailroom: usize) -> Self {
        Buf {
            storage: vec![0u8; headroom + len + tailroom],
            start: headroom,
            end: headroom + len,
        }
    }

    /// Create a buffer holding a copy of `data`.
    pub fn from_slice(data: &[u8]) -> Self {
        let mut buf = Self::new(data.len());
        buf.data_mut().copy_from_slice(data);
        buf
    }

    pub fn data(&self) -> &[u8] {
        &self.storage[self.start..self.end]
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.storage[self.start..self.end]
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn headroom(&self) -> usize {
        self.start
    }

    pub fn tailroom(&self) -> usize {
        self.storage.len() - self.end
    }

    /// Expose `n` more bytes in front of the data.
    pub fn add_header(&mut self, n: usize) -> Result<()> {
        if n > self.start {
            return Err(Error::BufferOverflow {
                requested: n,
                available: self.start,
            });
        }
        self.start -= n;
        Ok(())
    }

    /// Drop `n` bytes from the front.
    pub fn remove_header(&mut self, n: usize) -> Result<()> {
        if n > self.len() {
            return Err(Error::BufferUnderflow {
                requested: n,
                len: self.len(),
            });
        }
        self.start += n;
        Ok(())
    }

    /// Append `n` zero bytes.
    pub fn add_padding(&mut self, n: usize) -> Result<()> {
        if n > self.tailroom() {
            return Err(Error::BufferOverflow {
                requested: n,
                available: self.tailroom(),
            });
        }
        let end = self.end + n;
        self.storage[self.end..end].fill(0);
        self.end = end;
        Ok(())
    }

    /// Drop `n` bytes from the back.
    pub fn remove_padding(&mut self, n: usize) -> Result<()> {
        if n > self.len() {
            return Err(Error::BufferUnderflow {
                requested: n,
                len: self.len(),
            });
        }
        self.end -= n;
        Ok(())
    }

    /// Shorten the data to `len` bytes. Longer lengths are ignored.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len() {
            self.end = self.start + len;
        }
    }

    /// Put the data window back at the default headroom and make it `len`
    /// bytes long, growing the storage when needed. Contents are not cleared.
    pub fn reset(&mut self, len: usize) {
        let needed = DEFAULT_HEADROOM + len + DEFAULT_TAILROOM;
        if self.storage.len() < needed {
            self.storage.resize(needed, 0);
        }
        self.start = DEFAULT_HEADROOM;
        self.end = DEFAULT_HEADROOM + len;
    }
}
