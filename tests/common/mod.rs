#![allow(dead_code)]

use std::net::Ipv4Addr;
use tiny_netstack::link::arp::opcode;
use tiny_netstack::link::{ethertype, ArpPacket, EthernetHeader, ETHERNET_HEADER_LEN};
use tiny_netstack::network::ipv4::{DEFAULT_TTL, IPV4_HEADER_LEN};
use tiny_netstack::network::{protocol, transport_checksum};
use tiny_netstack::{Config, Interface, Ipv4Header, MacAddr, ManualClock, MemoryDevice, UdpHeader};

pub const HOST_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
pub const HOST_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 1);
pub const PEER_MAC: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x02]);
pub const PEER_IP: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 2);

pub fn host_config() -> Config {
    Config::new(HOST_MAC, HOST_IP)
}

/// Interface on a memory device with the start-up ARP request already taken.
pub fn setup_with(config: Config) -> (Interface<MemoryDevice>, ManualClock) {
    let clock = ManualClock::new();
    let mut iface = Interface::with_clock(config, MemoryDevice::new(), clock.clone()).unwrap();
    iface.device_mut().take_sent();
    (iface, clock)
}

pub fn setup() -> (Interface<MemoryDevice>, ManualClock) {
    setup_with(host_config())
}

/// Setup with `PEER_IP` already resolved.
pub fn setup_resolved() -> (Interface<MemoryDevice>, ManualClock) {
    let (mut iface, clock) = setup();
    deliver(&mut iface, arp_frame(opcode::REPLY, PEER_MAC, PEER_IP, HOST_MAC, HOST_IP));
    assert!(iface.device().sent().is_empty());
    (iface, clock)
}

pub fn deliver(iface: &mut Interface<MemoryDevice>, frame: Vec<u8>) {
    iface.device_mut().inject(frame);
    assert!(iface.poll().unwrap());
}

pub fn eth_frame(dst: MacAddr, src: MacAddr, ethertype: u16, payload: &[u8]) -> Vec<u8> {
    let mut frame = EthernetHeader { dst, src, ethertype }.to_bytes().to_vec();
    frame.extend_from_slice(payload);
    frame
}

pub fn arp_frame(
    op: u16,
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
) -> Vec<u8> {
    let packet = ArpPacket::new(op, sender_mac, sender_ip, target_mac, target_ip);
    let dst = if op == opcode::REQUEST { MacAddr::BROADCAST } else { target_mac };
    eth_frame(dst, sender_mac, ethertype::ARP, &packet.to_bytes())
}

pub fn ipv4_datagram(src: Ipv4Addr, dst: Ipv4Addr, proto: u8, payload: &[u8]) -> Vec<u8> {
    let mut header =
        Ipv4Header::fragment(src, dst, proto, DEFAULT_TTL, 0x4242, 0, false, payload.len());
    header.update_checksum();
    let mut datagram = header.to_bytes().to_vec();
    datagram.extend_from_slice(payload);
    datagram
}

pub fn udp_datagram(
    src: Ipv4Addr,
    dst: Ipv4Addr,
    src_port: u16,
    dst_port: u16,
    payload: &[u8],
) -> Vec<u8> {
    let header = UdpHeader {
        src_port,
        dst_port,
        length: (8 + payload.len()) as u16,
        checksum: 0,
    };
    let mut datagram = header.to_bytes().to_vec();
    datagram.extend_from_slice(payload);
    let sum = match transport_checksum(protocol::UDP, src, dst, &datagram) {
        0 => 0xffff,
        sum => sum,
    };
    datagram[6..8].copy_from_slice(&sum.to_be_bytes());
    datagram
}

/// Ethernet frame carrying an IPv4 datagram from the peer to the host.
pub fn peer_ip_frame(proto: u8, payload: &[u8]) -> Vec<u8> {
    eth_frame(
        HOST_MAC,
        PEER_MAC,
        ethertype::IPV4,
        &ipv4_datagram(PEER_IP, HOST_IP, proto, payload),
    )
}

pub fn peer_udp_frame(src_port: u16, dst_port: u16, payload: &[u8]) -> Vec<u8> {
    peer_ip_frame(
        protocol::UDP,
        &udp_datagram(PEER_IP, HOST_IP, src_port, dst_port, payload),
    )
}

/// Split a sent IPv4 frame into its Ethernet header, IP header and IP
/// payload (padding removed).
pub fn split_ip_frame(frame: &[u8]) -> (EthernetHeader, Ipv4Header, Vec<u8>) {
    let eth = EthernetHeader::from_bytes(frame).unwrap();
    assert_eq!(eth.ethertype, ethertype::IPV4);
    let ip_bytes = &frame[ETHERNET_HEADER_LEN..];
    let ip = Ipv4Header::from_bytes(ip_bytes).unwrap();
    let payload = ip_bytes[IPV4_HEADER_LEN..ip.total_len as usize].to_vec();
    (eth, ip, payload)
}

pub fn split_arp_frame(frame: &[u8]) -> (EthernetHeader, ArpPacket) {
    let eth = EthernetHeader::from_bytes(frame).unwrap();
    assert_eq!(eth.ethertype, ethertype::ARP);
    (eth, ArpPacket::from_bytes(&frame[ETHERNET_HEADER_LEN..]).unwrap())
}
