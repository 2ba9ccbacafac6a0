//! Network layer wire formats
//!
//! - IPv4: Internet Protocol version 4
//! - ICMP: Internet Control Message Protocol
//!
//! plus the Internet checksum shared by IPv4, ICMP and UDP.

pub mod icmp;
pub mod ipv4;

use std::net::Ipv4Addr;

pub use icmp::IcmpHeader;
pub use ipv4::{flags, protocol, Ipv4Header};

/// Add `data` as big-endian 16-bit words to a running sum. An odd trailing
/// byte is padded with zero.
fn sum_words(mut sum: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(2);
    for chunk in &mut chunks {
        sum += u16::from_be_bytes([chunk[0], chunk[1]]) as u32;
    }
    if let [last] = chunks.remainder() {
        sum += (*last as u32) << 8;
    }
    sum
}

fn fold(mut sum: u32) -> u16 {
    while (sum >> 16) > 0 {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    !sum as u16
}

/// Calculate Internet checksum
///
/// Algorithm: Sum data in 16-bit chunks, add carry bits to the sum,
/// and return the one's complement of the result.
pub fn checksum(data: &[u8]) -> u16 {
    fold(sum_words(0, data))
}

/// Checksum of a transport segment including the IPv4 pseudo header:
/// src(4) + dst(4) + zero(1) + protocol(1) + length(2).
pub fn transport_checksum(protocol: u8, src: Ipv4Addr, dst: Ipv4Addr, segment: &[u8]) -> u16 {
    let mut pseudo = [0u8; 12];
    pseudo[0..4].copy_from_slice(&src.octets());
    pseudo[4..8].copy_from_slice(&dst.octets());
    pseudo[9] = protocol;
    pseudo[10..12].copy_from_slice(&(segment.len() as u16).to_be_bytes());

    fold(sum_words(sum_words(0, &pseudo), segment))
}
