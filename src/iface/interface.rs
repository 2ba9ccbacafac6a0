//! Interface state and protocol registries
//!
//! One `Interface` is one host on one link: a device, a configured address
//! pair, and the tables each layer keeps between calls. Nothing here is
//! global; dropping the interface drops all of it.

use crate::buf::Buf;
use crate::config::Config;
use crate::device::Device;
use crate::error::Result;
use crate::link::{ethertype, MacAddr, ETHERNET_HEADER_LEN};
use crate::map::TtlMap;
use crate::network::protocol;
use crate::time::{Clock, SystemClock};
use crate::transport::UdpHandler;
use std::collections::HashMap;
use std::hash::Hash;
use std::net::Ipv4Addr;
use std::time::Instant;

/// Handlers for the ethertypes the link layer delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkHandler {
    Arp,
    Ipv4,
}

/// Handlers for the IP protocol numbers the network layer delivers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpHandler {
    Icmp,
    Udp,
}

/// Outcome of handing a payload to the next layer up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Delivered,
    NoHandler,
}

/// Protocol identifier to handler mapping.
#[derive(Debug, Clone)]
pub struct Registry<K, H> {
    handlers: HashMap<K, H>,
}

impl<K: Eq + Hash, H: Copy> Registry<K, H> {
    pub fn new() -> Self {
        Registry {
            handlers: HashMap::new(),
        }
    }

    /// Register `handler` for `id`, returning the handler it replaced.
    pub fn register(&mut self, id: K, handler: H) -> Option<H> {
        self.handlers.insert(id, handler)
    }

    pub fn unregister(&mut self, id: &K) -> Option<H> {
        self.handlers.remove(id)
    }

    pub fn lookup(&self, id: &K) -> Option<H> {
        self.handlers.get(id).copied()
    }
}

impl<K: Eq + Hash, H: Copy> Default for Registry<K, H> {
    fn default() -> Self {
        Self::new()
    }
}

/// A single host interface on top of a raw frame device.
pub struct Interface<D> {
    pub(super) config: Config,
    pub(super) device: D,
    pub(super) clock: Box<dyn Clock>,
    /// Receive buffer reused by every `poll`.
    pub(super) rx_buf: Buf,
    pub(super) link_protocols: Registry<u16, LinkHandler>,
    pub(super) ip_protocols: Registry<u8, IpHandler>,
    /// Resolved addresses, expiring after `arp_timeout`.
    pub(super) arp_table: TtlMap<Ipv4Addr, MacAddr>,
    /// One packet per address waiting for a reply, expiring after
    /// `arp_min_interval`.
    pub(super) arp_pending: TtlMap<Ipv4Addr, Buf>,
    pub(super) udp_ports: TtlMap<u16, Box<dyn UdpHandler>>,
    /// Identifier of the next outgoing datagram.
    pub(super) next_ip_id: u16,
}

impl<D: Device> Interface<D> {
    /// Bring up an interface on `device` using the system clock.
    pub fn new(config: Config, device: D) -> Result<Self> {
        Self::with_clock(config, device, SystemClock)
    }

    /// Bring up an interface reading time from `clock`.
    ///
    /// Registers the built-in protocols and broadcasts an ARP request for
    /// our own address.
    pub fn with_clock(config: Config, device: D, clock: impl Clock + 'static) -> Result<Self> {
        let mut link_protocols = Registry::new();
        link_protocols.register(ethertype::ARP, LinkHandler::Arp);
        link_protocols.register(ethertype::IPV4, LinkHandler::Ipv4);

        let mut ip_protocols = Registry::new();
        ip_protocols.register(protocol::ICMP, IpHandler::Icmp);
        ip_protocols.register(protocol::UDP, IpHandler::Udp);

        let mut iface = Interface {
            arp_table: TtlMap::new(config.arp_capacity, Some(config.arp_timeout)),
            arp_pending: TtlMap::new(config.arp_capacity, Some(config.arp_min_interval)),
            udp_ports: TtlMap::new(config.udp_capacity, None),
            rx_buf: Buf::new(config.mtu + ETHERNET_HEADER_LEN),
            config,
            device,
            clock: Box::new(clock),
            link_protocols,
            ip_protocols,
            next_ip_id: 0,
        };

        log::debug!("iface: up as {} / {}", iface.config.ip, iface.config.mac);
        let own_ip = iface.config.ip;
        iface.arp_request(own_ip)?;
        Ok(iface)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Identifier the next outgoing datagram will carry.
    pub fn next_datagram_id(&self) -> u16 {
        self.next_ip_id
    }

    pub(super) fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Try once to receive a frame and process it.
    ///
    /// Returns whether a frame was read. Never waits; call it in a loop.
    pub fn poll(&mut self) -> Result<bool> {
        let mut buf = std::mem::take(&mut self.rx_buf);
        buf.reset(self.config.mtu + ETHERNET_HEADER_LEN);

        let result = match self.device.recv(buf.data_mut()) {
            Ok(Some(len)) => {
                buf.truncate(len);
                self.ethernet_in(&mut buf).map(|()| true)
            }
            Ok(None) => Ok(false),
            Err(e) => Err(e.into()),
        };

        self.rx_buf = buf;
        result
    }
}
