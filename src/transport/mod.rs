//! Transport layer protocols
//!
//! - UDP: User Datagram Protocol

pub mod udp;

// Re-export commonly used items
pub use udp::{UdpHandler, UdpHeader, UDP_HEADER_LEN};
