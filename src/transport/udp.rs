//! UDP (User Datagram Protocol)
//!
//! Header parsing, checksum helpers and the handler capability that bound
//! ports deliver into.

use crate::network::{protocol, transport_checksum};
use byteorder::{BigEndian, ByteOrder};
use std::net::Ipv4Addr;

/// UDP header length in bytes
pub const UDP_HEADER_LEN: usize = 8;

/// UDP packet header structure
///
/// Represents the standard 8-byte UDP header as defined in RFC 768
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UdpHeader {
    pub src_port: u16,
    pub dst_port: u16,
    pub length: u16, // Length of UDP header and data
    pub checksum: u16,
}

impl UdpHeader {
    /// Parse UDP header from byte slice
    ///
    /// Returns None if the data is too short to contain a valid UDP header
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < UDP_HEADER_LEN {
            return None;
        }

        Some(UdpHeader {
            src_port: BigEndian::read_u16(&data[0..2]),
            dst_port: BigEndian::read_u16(&data[2..4]),
            length: BigEndian::read_u16(&data[4..6]),
            checksum: BigEndian::read_u16(&data[6..8]),
        })
    }

    /// Convert UDP header to bytes
    pub fn to_bytes(&self) -> [u8; UDP_HEADER_LEN] {
        let mut bytes = [0u8; UDP_HEADER_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.src_port);
        BigEndian::write_u16(&mut bytes[2..4], self.dst_port);
        BigEndian::write_u16(&mut bytes[4..6], self.length);
        BigEndian::write_u16(&mut bytes[6..8], self.checksum);
        bytes
    }
}

/// Checksum of a whole UDP datagram, computed with its checksum field zeroed.
///
/// The datagram is modified only for the duration of the call.
pub fn datagram_checksum(src: Ipv4Addr, dst: Ipv4Addr, datagram: &mut [u8]) -> u16 {
    let saved = [datagram[6], datagram[7]];
    datagram[6..8].copy_from_slice(&[0, 0]);
    let sum = transport_checksum(protocol::UDP, src, dst, datagram);
    datagram[6..8].copy_from_slice(&saved);
    sum
}

/// Receives the datagrams arriving on an open port.
///
/// Returning `Some(payload)` sends `payload` back to the sender, from the
/// port the datagram arrived on.
pub trait UdpHandler {
    fn on_datagram(&mut self, payload: &[u8], src_ip: Ipv4Addr, src_port: u16) -> Option<Vec<u8>>;
}

impl<F> UdpHandler for F
where
    F: FnMut(&[u8], Ipv4Addr, u16) -> Option<Vec<u8>>,
{
    fn on_datagram(&mut self, payload: &[u8], src_ip: Ipv4Addr, src_port: u16) -> Option<Vec<u8>> {
        self(payload, src_ip, src_port)
    }
}
