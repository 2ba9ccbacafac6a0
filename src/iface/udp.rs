use super::interface::Interface;
use crate::buf::Buf;
use crate::device::Device;
use crate::error::{Error, Result};
use crate::network::icmp::unreachable;
use crate::network::ipv4::IPV4_HEADER_LEN;
use crate::network::protocol;
use crate::transport::udp::{datagram_checksum, UdpHandler, UdpHeader, UDP_HEADER_LEN};
use log::{debug, trace};
use std::net::Ipv4Addr;

/// Largest payload one UDP datagram can carry.
const UDP_MAX_PAYLOAD: usize = u16::MAX as usize - UDP_HEADER_LEN - IPV4_HEADER_LEN;

/// Checksum as carried in the header. A sum of zero is sent as its
/// complement, 0xffff.
fn wire_checksum(sum: u16) -> u16 {
    match sum {
        0 => 0xffff,
        sum => sum,
    }
}

impl<D: Device> Interface<D> {
    /// Process a received UDP datagram.
    ///
    /// Valid datagrams go to the handler open on the destination port; with
    /// no handler the sender gets ICMP port unreachable.
    pub fn udp_in(&mut self, buf: &mut Buf, src_ip: Ipv4Addr) -> Result<()> {
        let header = match UdpHeader::from_bytes(buf.data()) {
            Some(header) => header,
            None => {
                trace!("udp: dropping short datagram from {}", src_ip);
                return Ok(());
            }
        };

        let length = header.length as usize;
        if length > buf.len() || length < UDP_HEADER_LEN {
            trace!(
                "udp: dropping datagram declaring {} bytes, received {}",
                length,
                buf.len()
            );
            return Ok(());
        }
        buf.truncate(length);

        let expected = wire_checksum(datagram_checksum(src_ip, self.config.ip, buf.data_mut()));
        if expected != header.checksum {
            debug!(
                "udp: checksum mismatch from {}:{}: expected {:#06x}, got {:#06x}",
                src_ip, header.src_port, expected, header.checksum
            );
            return Ok(());
        }

        let now = self.now();
        if !self.udp_ports.contains(&header.dst_port, now) {
            debug!("udp: port {} unreachable, reporting to {}", header.dst_port, src_ip);
            buf.add_header(IPV4_HEADER_LEN)?;
            return self.icmp_unreachable(buf.data(), src_ip, unreachable::PORT);
        }

        buf.remove_header(UDP_HEADER_LEN)?;
        let reply = match self.udp_ports.get_mut(&header.dst_port, now) {
            Some(handler) => handler.on_datagram(buf.data(), src_ip, header.src_port),
            None => None,
        };

        if let Some(reply) = reply {
            self.udp_send(&reply, header.dst_port, src_ip, header.src_port)?;
        }
        Ok(())
    }

    /// Prepend a UDP header to `buf` and send it to `dst_ip:dst_port`.
    pub fn udp_out(
        &mut self,
        buf: &mut Buf,
        src_port: u16,
        dst_ip: Ipv4Addr,
        dst_port: u16,
    ) -> Result<()> {
        if buf.len() > UDP_MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge {
                len: buf.len(),
                max: UDP_MAX_PAYLOAD,
            });
        }

        buf.add_header(UDP_HEADER_LEN)?;
        let header = UdpHeader {
            src_port,
            dst_port,
            length: buf.len() as u16,
            checksum: 0,
        };
        buf.data_mut()[..UDP_HEADER_LEN].copy_from_slice(&header.to_bytes());

        let sum = wire_checksum(datagram_checksum(self.config.ip, dst_ip, buf.data_mut()));
        buf.data_mut()[6..8].copy_from_slice(&sum.to_be_bytes());

        self.ip_out(buf, dst_ip, protocol::UDP)
    }

    /// Send `data` from `src_port` to `dst_ip:dst_port`.
    pub fn udp_send(
        &mut self,
        data: &[u8],
        src_port: u16,
        dst_ip: Ipv4Addr,
        dst_port: u16,
    ) -> Result<()> {
        let mut buf = Buf::from_slice(data);
        self.udp_out(&mut buf, src_port, dst_ip, dst_port)
    }

    /// Deliver datagrams for `port` to `handler`.
    pub fn udp_open(&mut self, port: u16, handler: impl UdpHandler + 'static) -> Result<()> {
        let now = self.now();
        if self.udp_ports.contains(&port, now) {
            return Err(Error::PortInUse(port));
        }
        self.udp_ports.set(port, Box::new(handler), now)?;
        debug!("udp: opened port {}", port);
        Ok(())
    }

    /// Stop delivering datagrams for `port`. Returns whether it was open.
    pub fn udp_close(&mut self, port: u16) -> bool {
        let now = self.now();
        let was_open = self.udp_ports.remove(&port, now).is_some();
        if was_open {
            debug!("udp: closed port {}", port);
        }
        was_open
    }

    pub fn udp_is_open(&mut self, port: u16) -> bool {
        let now = self.now();
        self.udp_ports.contains(&port, now)
    }
}
