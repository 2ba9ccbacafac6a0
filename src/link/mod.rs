//! Link layer wire formats
//!
//! - Ethernet II framing
//! - ARP for Ethernet/IPv4

pub mod arp;
pub mod ethernet;

pub use arp::{ArpPacket, ARP_PACKET_LEN};
pub use ethernet::{ethertype, EthernetHeader, MacAddr, ETHERNET_HEADER_LEN};
