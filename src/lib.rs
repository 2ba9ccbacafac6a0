//! A small polling-driven network stack in Rust
//!
//! This library provides the data path of a single host interface:
//! - Ethernet framing and a busy-poll receive loop
//! - ARP resolution with a resolved-address cache and one pending packet per address
//! - IPv4 validation and outbound fragmentation
//! - ICMP echo replies and destination-unreachable reports
//! - UDP port demultiplexing
//!
//! Everything runs synchronously inside `Interface::poll` or a send call; there
//! are no threads and no blocking.

pub mod buf;
pub mod config;
pub mod device;
pub mod error;
pub mod iface;
pub mod link;
pub mod map;
pub mod network;
pub mod time;
pub mod transport;

// Re-export commonly used types
pub use buf::Buf;
pub use config::Config;
pub use device::{Device, MemoryDevice, TapDevice};
pub use error::{Error, Result};
pub use iface::Interface;
pub use link::MacAddr;
pub use network::icmp::{IcmpHeader, ICMP_TYPE_ECHO_REPLY, ICMP_TYPE_ECHO_REQUEST};
pub use network::Ipv4Header;
pub use time::{Clock, ManualClock, SystemClock};
pub use transport::{UdpHandler, UdpHeader};
