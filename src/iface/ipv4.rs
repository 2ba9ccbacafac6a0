use super::interface::{Dispatch, Interface, IpHandler};
use crate::buf::Buf;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::link::MacAddr;
use crate::network::icmp::unreachable;
use crate::network::ipv4::IPV4_HEADER_LEN;
use crate::network::Ipv4Header;
use log::{debug, trace};
use std::net::Ipv4Addr;

/// Largest payload one IPv4 datagram can carry.
const IP_MAX_PAYLOAD: usize = u16::MAX as usize - IPV4_HEADER_LEN;

impl<D: Device> Interface<D> {
    /// Process a received IPv4 datagram.
    ///
    /// Only complete, unfragmented-looking datagrams addressed to us are
    /// delivered; there is no reassembly. A protocol nobody registered for is
    /// answered with ICMP protocol unreachable.
    pub fn ip_in(&mut self, buf: &mut Buf, src_mac: MacAddr) -> Result<()> {
        let header = match Ipv4Header::from_bytes(buf.data()) {
            Some(header) => header,
            None => {
                trace!("ip: dropping short datagram from {}", src_mac);
                return Ok(());
            }
        };

        if !header.is_valid() {
            trace!(
                "ip: dropping datagram with version {} ihl {}",
                header.version, header.ihl
            );
            return Ok(());
        }

        let total_len = header.total_len as usize;
        if total_len > buf.len() || total_len < IPV4_HEADER_LEN {
            trace!(
                "ip: dropping datagram declaring {} bytes, received {}",
                total_len,
                buf.len()
            );
            return Ok(());
        }

        if !header.verify_checksum() {
            debug!(
                "ip: checksum mismatch from {}: expected {:#06x}, got {:#06x}",
                header.src_addr,
                header.calculate_checksum(),
                header.checksum
            );
            return Ok(());
        }

        if header.dst_addr != self.config.ip {
            trace!("ip: not for us ({})", header.dst_addr);
            return Ok(());
        }

        if buf.len() > total_len {
            buf.remove_padding(buf.len() - total_len)?;
        }
        buf.remove_header(IPV4_HEADER_LEN)?;

        if self.dispatch_ip(header.protocol, buf, header.src_addr)? == Dispatch::NoHandler {
            debug!(
                "ip: protocol {} unreachable, reporting to {}",
                header.protocol, header.src_addr
            );
            buf.add_header(IPV4_HEADER_LEN)?;
            self.icmp_unreachable(buf.data(), header.src_addr, unreachable::PROTOCOL)?;
        }
        Ok(())
    }

    fn dispatch_ip(&mut self, protocol: u8, buf: &mut Buf, src_ip: Ipv4Addr) -> Result<Dispatch> {
        match self.ip_protocols.lookup(&protocol) {
            Some(IpHandler::Icmp) => self.icmp_in(buf, src_ip)?,
            Some(IpHandler::Udp) => self.udp_in(buf, src_ip)?,
            None => return Ok(Dispatch::NoHandler),
        }
        Ok(Dispatch::Delivered)
    }

    /// Prepend an IPv4 header to one fragment and pass it to address
    /// resolution.
    ///
    /// `byte_offset` is the fragment's position in the original payload and
    /// must be a multiple of 8.
    pub fn ip_fragment_out(
        &mut self,
        buf: &mut Buf,
        dst_ip: Ipv4Addr,
        protocol: u8,
        id: u16,
        byte_offset: usize,
        more_fragments: bool,
    ) -> Result<()> {
        let mut header = Ipv4Header::fragment(
            self.config.ip,
            dst_ip,
            protocol,
            self.config.ttl,
            id,
            byte_offset,
            more_fragments,
            buf.len(),
        );
        header.update_checksum();

        buf.add_header(IPV4_HEADER_LEN)?;
        buf.data_mut()[..IPV4_HEADER_LEN].copy_from_slice(&header.to_bytes());
        self.arp_out(buf, dst_ip)
    }

    /// Send `buf` to `dst_ip`, fragmenting when it exceeds the MTU.
    ///
    /// Every fragment of one call carries the same identifier; the
    /// identifier counter advances once per call. Payloads that do not fit
    /// the 16-bit total length are rejected before an identifier is taken.
    pub fn ip_out(&mut self, buf: &mut Buf, dst_ip: Ipv4Addr, protocol: u8) -> Result<()> {
        if buf.len() > IP_MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge {
                len: buf.len(),
                max: IP_MAX_PAYLOAD,
            });
        }

        let max_payload = self.config.max_ip_payload();
        let id = self.next_ip_id;
        self.next_ip_id = self.next_ip_id.wrapping_add(1);

        if buf.len() <= max_payload {
            return self.ip_fragment_out(buf, dst_ip, protocol, id, 0, false);
        }

        debug!(
            "ip: fragmenting {} bytes for {} (id {}, {} per fragment)",
            buf.len(),
            dst_ip,
            id,
            max_payload
        );

        let total = buf.len();
        let mut offset = 0;
        while offset < total {
            let end = (offset + max_payload).min(total);
            let mut fragment = Buf::from_slice(&buf.data()[offset..end]);
            self.ip_fragment_out(&mut fragment, dst_ip, protocol, id, offset, end < total)?;
            offset = end;
        }
        Ok(())
    }
}
