//! Interface configuration.

use crate::link::MacAddr;
use crate::network::ipv4::{FRAGMENT_UNIT, IPV4_HEADER_LEN};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Addresses and tunables of one interface.
#[derive(Debug, Clone)]
pub struct Config {
    /// Link address written as the source of every outgoing frame.
    pub mac: MacAddr,
    /// The only destination address inbound datagrams are accepted for.
    pub ip: Ipv4Addr,
    /// Largest Ethernet payload.
    pub mtu: usize,
    /// TTL of outgoing datagrams.
    pub ttl: u8,
    /// Lifetime of a resolved ARP entry.
    pub arp_timeout: Duration,
    /// How long a packet waits for an ARP reply; also the earliest a new
    /// request for the same address can go out.
    pub arp_min_interval: Duration,
    pub arp_capacity: usize,
    pub udp_capacity: usize,
}

impl Config {
    pub fn new(mac: MacAddr, ip: Ipv4Addr) -> Self {
        Config {
            mac,
            ip,
            ..Config::default()
        }
    }

    /// Largest IPv4 payload per fragment, kept on an 8-byte boundary.
    pub fn max_ip_payload(&self) -> usize {
        let room = self.mtu.saturating_sub(IPV4_HEADER_LEN) / FRAGMENT_UNIT * FRAGMENT_UNIT;
        room.max(FRAGMENT_UNIT)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            mac: MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]),
            ip: Ipv4Addr::new(192, 168, 163, 103),
            mtu: 1500,
            ttl: 64,
            arp_timeout: Duration::from_secs(300),
            arp_min_interval: Duration::from_secs(1),
            arp_capacity: 64,
            udp_capacity: 64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_ip_payload() {
        let mut config = Config::default();
        assert_eq!(config.max_ip_payload(), 1480);
        config.mtu = 1006;
        assert_eq!(config.max_ip_payload(), 984);
    }
}
