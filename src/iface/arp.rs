//! Address resolution
//!
//! Per destination address: unresolved, then pending with exactly one
//! buffered packet after a request went out, then resolved once any request
//! or reply from that address is seen. A pending entry that outlives
//! `arp_min_interval` is dropped together with its packet, and the next send
//! starts over with a fresh request.

use super::interface::Interface;
use crate::buf::Buf;
use crate::device::Device;
use crate::error::Result;
use crate::link::arp::opcode;
use crate::link::{ethertype, ArpPacket, MacAddr};
use log::{debug, trace};
use std::net::Ipv4Addr;
use std::time::Instant;

impl<D: Device> Interface<D> {
    /// Broadcast a request for `target_ip`.
    pub fn arp_request(&mut self, target_ip: Ipv4Addr) -> Result<()> {
        let packet = ArpPacket::new(
            opcode::REQUEST,
            self.config.mac,
            self.config.ip,
            MacAddr::UNSPECIFIED,
            target_ip,
        );
        trace!("arp: who-has {} tell {}", target_ip, self.config.ip);
        let mut buf = Buf::from_slice(&packet.to_bytes());
        self.ethernet_out(&mut buf, MacAddr::BROADCAST, ethertype::ARP)
    }

    /// Tell `target_ip` at `target_mac` our address.
    pub fn arp_reply(&mut self, target_ip: Ipv4Addr, target_mac: MacAddr) -> Result<()> {
        let packet = ArpPacket::new(
            opcode::REPLY,
            self.config.mac,
            self.config.ip,
            target_mac,
            target_ip,
        );
        trace!("arp: {} is-at {} (to {})", self.config.ip, self.config.mac, target_ip);
        let mut buf = Buf::from_slice(&packet.to_bytes());
        self.ethernet_out(&mut buf, target_mac, ethertype::ARP)
    }

    pub fn arp_in(&mut self, buf: &mut Buf, src_mac: MacAddr) -> Result<()> {
        let packet = match ArpPacket::from_bytes(buf.data()) {
            Some(packet) if packet.is_supported() => packet,
            Some(_) => {
                trace!("arp: dropping unsupported packet from {}", src_mac);
                return Ok(());
            }
            None => {
                trace!("arp: dropping truncated packet from {}", src_mac);
                return Ok(());
            }
        };

        let now = self.now();
        if let Err(e) = self.arp_table.set(packet.sender_ip, packet.sender_mac, now) {
            debug!("arp: not caching {}: {}", packet.sender_ip, e);
        }

        if let Some(mut pending) = self.arp_pending.remove(&packet.sender_ip, now) {
            debug!(
                "arp: {} resolved to {}, sending queued packet",
                packet.sender_ip, packet.sender_mac
            );
            return self.ethernet_out(&mut pending, packet.sender_mac, ethertype::IPV4);
        }

        if packet.opcode == opcode::REQUEST && packet.target_ip == self.config.ip {
            self.arp_reply(packet.sender_ip, packet.sender_mac)?;
        }
        Ok(())
    }

    /// Send an IP packet to `dst_ip`, resolving its link address first.
    ///
    /// With no cached address the packet is copied into the pending table and
    /// a request is broadcast. While a request is outstanding, further packets
    /// for the same address are dropped.
    pub fn arp_out(&mut self, buf: &mut Buf, dst_ip: Ipv4Addr) -> Result<()> {
        let now = self.now();
        if let Some(&mac) = self.arp_table.get(&dst_ip, now) {
            return self.ethernet_out(buf, mac, ethertype::IPV4);
        }

        if self.arp_pending.contains(&dst_ip, now) {
            debug!("arp: resolution of {} in progress, dropping packet", dst_ip);
            return Ok(());
        }

        self.arp_pending.set(dst_ip, buf.clone(), now)?;
        self.arp_request(dst_ip)
    }

    /// Cached link address of `ip`, if resolved and not expired.
    pub fn arp_lookup(&mut self, ip: Ipv4Addr) -> Option<MacAddr> {
        let now = self.now();
        self.arp_table.get(&ip, now).copied()
    }

    /// Whether a packet for `ip` is waiting on a reply.
    pub fn arp_is_pending(&mut self, ip: Ipv4Addr) -> bool {
        let now = self.now();
        self.arp_pending.contains(&ip, now)
    }

    /// Live cache entries with the time each was last refreshed.
    pub fn arp_entries(&self) -> Vec<(Ipv4Addr, MacAddr, Instant)> {
        let mut entries: Vec<_> = self
            .arp_table
            .iter(self.now())
            .map(|(ip, mac, refreshed)| (*ip, *mac, refreshed))
            .collect();
        entries.sort_by_key(|(ip, _, _)| *ip);
        entries
    }

    /// Dump the address cache at debug level.
    pub fn log_arp_table(&self) {
        let now = self.now();
        debug!("===ARP TABLE BEGIN===");
        for (ip, mac, refreshed) in self.arp_entries() {
            debug!("{} | {} | {:?} ago", ip, mac, now.saturating_duration_since(refreshed));
        }
        debug!("===ARP TABLE  END ===");
    }
}
