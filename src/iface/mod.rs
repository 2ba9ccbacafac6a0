//! Network interface and packet processing
//!
//! The `Interface` owns every piece of per-stack state and implements each
//! layer as a group of methods:
//! - `ethernet`: framing, deframing and the poll loop
//! - `arp`: address resolution with a one-packet pending buffer
//! - `ipv4`: validation, fragmentation and protocol dispatch
//! - `icmp`: echo replies and unreachable reports
//! - `udp`: port demultiplexing

pub mod interface;

mod arp;
mod ethernet;
mod icmp;
mod ipv4;
mod udp;

// Re-export commonly used items
pub use interface::{Dispatch, Interface, IpHandler, LinkHandler, Registry};
