use super::interface::{Dispatch, Interface, LinkHandler};
use crate::buf::Buf;
use crate::device::Device;
use crate::error::Result;
use crate::link::ethernet::ETHERNET_MIN_PAYLOAD;
use crate::link::{EthernetHeader, MacAddr, ETHERNET_HEADER_LEN};
use log::trace;

impl<D: Device> Interface<D> {
    /// Process one received frame.
    ///
    /// Strips the Ethernet header and hands the payload to the handler
    /// registered for its ethertype. Runt frames are dropped.
    pub fn ethernet_in(&mut self, buf: &mut Buf) -> Result<()> {
        let header = match EthernetHeader::from_bytes(buf.data()) {
            Some(header) => header,
            None => {
                trace!("eth: dropping runt frame of {} bytes", buf.len());
                return Ok(());
            }
        };

        buf.remove_header(ETHERNET_HEADER_LEN)?;

        if self.dispatch_link(header.ethertype, buf, header.src)? == Dispatch::NoHandler {
            trace!("eth: no handler for ethertype {:#06x}", header.ethertype);
        }
        Ok(())
    }

    fn dispatch_link(
        &mut self,
        ethertype: u16,
        buf: &mut Buf,
        src_mac: MacAddr,
    ) -> Result<Dispatch> {
        match self.link_protocols.lookup(&ethertype) {
            Some(LinkHandler::Arp) => self.arp_in(buf, src_mac)?,
            Some(LinkHandler::Ipv4) => self.ip_in(buf, src_mac)?,
            None => return Ok(Dispatch::NoHandler),
        }
        Ok(Dispatch::Delivered)
    }

    /// Frame `buf` for `dst` and hand it to the device.
    ///
    /// Payloads shorter than the Ethernet minimum are zero-padded first.
    pub fn ethernet_out(&mut self, buf: &mut Buf, dst: MacAddr, ethertype: u16) -> Result<()> {
        if buf.len() < ETHERNET_MIN_PAYLOAD {
            buf.add_padding(ETHERNET_MIN_PAYLOAD - buf.len())?;
        }

        buf.add_header(ETHERNET_HEADER_LEN)?;
        let header = EthernetHeader {
            dst,
            src: self.config.mac,
            ethertype,
        };
        buf.data_mut()[..ETHERNET_HEADER_LEN].copy_from_slice(&header.to_bytes());

        self.device.send(buf.data())?;
        Ok(())
    }
}
