use super::interface::Interface;
use crate::buf::Buf;
use crate::device::Device;
use crate::error::Result;
use crate::network::icmp::{
    fill_checksum, IcmpHeader, ERROR_QUOTE_LEN, ICMP_HEADER_LEN, ICMP_TYPE_DEST_UNREACHABLE,
    ICMP_TYPE_ECHO_REPLY,
};
use crate::network::ipv4::IPV4_HEADER_LEN;
use crate::network::protocol;
use log::{debug, trace};
use std::net::Ipv4Addr;

impl<D: Device> Interface<D> {
    /// Process an ICMP message. Echo requests are answered; everything
    /// else is ignored.
    pub fn icmp_in(&mut self, buf: &mut Buf, src_ip: Ipv4Addr) -> Result<()> {
        let header = match IcmpHeader::from_bytes(buf.data()) {
            Some(header) => header,
            None => {
                trace!("icmp: dropping short message from {}", src_ip);
                return Ok(());
            }
        };

        if !header.is_echo_request() {
            trace!("icmp: ignoring type {} from {}", header.msg_type, src_ip);
            return Ok(());
        }

        trace!(
            "icmp: echo request from {} id {} seq {}",
            src_ip,
            header.identifier(),
            header.sequence()
        );
        self.icmp_echo_reply(buf.data(), src_ip)
    }

    /// Echo `request` back verbatim apart from type and checksum.
    fn icmp_echo_reply(&mut self, request: &[u8], dst_ip: Ipv4Addr) -> Result<()> {
        let mut reply = Buf::from_slice(request);
        reply.data_mut()[0] = ICMP_TYPE_ECHO_REPLY;
        fill_checksum(reply.data_mut());
        self.ip_out(&mut reply, dst_ip, protocol::ICMP)
    }

    /// Report `datagram` (starting at its IP header) as undeliverable to
    /// `dst_ip`, quoting its header and up to 8 bytes of its payload.
    pub fn icmp_unreachable(&mut self, datagram: &[u8], dst_ip: Ipv4Addr, code: u8) -> Result<()> {
        let quote_len = datagram.len().min(IPV4_HEADER_LEN + ERROR_QUOTE_LEN);

        let mut msg = Buf::new(ICMP_HEADER_LEN + quote_len);
        let data = msg.data_mut();
        data[..ICMP_HEADER_LEN]
            .copy_from_slice(&IcmpHeader::new(ICMP_TYPE_DEST_UNREACHABLE, code).to_bytes());
        data[ICMP_HEADER_LEN..].copy_from_slice(&datagram[..quote_len]);
        fill_checksum(data);

        debug!("icmp: destination unreachable (code {}) to {}", code, dst_ip);
        self.ip_out(&mut msg, dst_ip, protocol::ICMP)
    }
}
