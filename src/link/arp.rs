//! ARP packet for Ethernet/IPv4 (RFC 826)
//!
//! hw_type(2) | proto_type(2) | hw_len(1) | proto_len(1) | opcode(2) |
//! sender_mac(6) | sender_ip(4) | target_mac(6) | target_ip(4)

use super::ethernet::{ethertype, MacAddr};
use byteorder::{BigEndian, ByteOrder};
use std::net::Ipv4Addr;

pub const ARP_PACKET_LEN: usize = 28;

pub const HW_TYPE_ETHERNET: u16 = 1;
pub const HW_LEN_ETHERNET: u8 = 6;
pub const PROTO_LEN_IPV4: u8 = 4;

pub mod opcode {
    pub const REQUEST: u16 = 1;
    pub const REPLY: u16 = 2;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpPacket {
    pub hw_type: u16,
    pub proto_type: u16,
    pub hw_len: u8,
    pub proto_len: u8,
    pub opcode: u16,
    pub sender_mac: MacAddr,
    pub sender_ip: Ipv4Addr,
    pub target_mac: MacAddr,
    pub target_ip: Ipv4Addr,
}

impl ArpPacket {
    /// Ethernet/IPv4 template with the given operation and addresses.
    pub fn new(
        opcode: u16,
        sender_mac: MacAddr,
        sender_ip: Ipv4Addr,
        target_mac: MacAddr,
        target_ip: Ipv4Addr,
    ) -> Self {
        ArpPacket {
            hw_type: HW_TYPE_ETHERNET,
            proto_type: ethertype::IPV4,
            hw_len: HW_LEN_ETHERNET,
            proto_len: PROTO_LEN_IPV4,
            opcode,
            sender_mac,
            sender_ip,
            target_mac,
            target_ip,
        }
    }

    /// Parse the fixed 28-byte packet. Field values are not checked here.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < ARP_PACKET_LEN {
            return None;
        }

        let mut sender_mac = [0u8; 6];
        let mut target_mac = [0u8; 6];
        sender_mac.copy_from_slice(&data[8..14]);
        target_mac.copy_from_slice(&data[18..24]);

        Some(ArpPacket {
            hw_type: BigEndian::read_u16(&data[0..2]),
            proto_type: BigEndian::read_u16(&data[2..4]),
            hw_len: data[4],
            proto_len: data[5],
            opcode: BigEndian::read_u16(&data[6..8]),
            sender_mac: MacAddr(sender_mac),
            sender_ip: Ipv4Addr::new(data[14], data[15], data[16], data[17]),
            target_mac: MacAddr(target_mac),
            target_ip: Ipv4Addr::new(data[24], data[25], data[26], data[27]),
        })
    }

    pub fn to_bytes(&self) -> [u8; ARP_PACKET_LEN] {
        let mut bytes = [0u8; ARP_PACKET_LEN];
        BigEndian::write_u16(&mut bytes[0..2], self.hw_type);
        BigEndian::write_u16(&mut bytes[2..4], self.proto_type);
        bytes[4] = self.hw_len;
        bytes[5] = self.proto_len;
        BigEndian::write_u16(&mut bytes[6..8], self.opcode);
        bytes[8..14].copy_from_slice(&self.sender_mac.0);
        bytes[14..18].copy_from_slice(&self.sender_ip.octets());
        bytes[18..24].copy_from_slice(&self.target_mac.0);
        bytes[24..28].copy_from_slice(&self.target_ip.octets());
        bytes
    }

    /// True for an Ethernet/IPv4 request or reply.
    pub fn is_supported(&self) -> bool {
        self.hw_type == HW_TYPE_ETHERNET
            && self.proto_type == ethertype::IPV4
            && self.hw_len == HW_LEN_ETHERNET
            && self.proto_len == PROTO_LEN_IPV4
            && (self.opcode == opcode::REQUEST || self.opcode == opcode::REPLY)
    }
}
