mod common;

use common::*;
use std::net::Ipv4Addr;
use tiny_netstack::link::{ethertype, ETHERNET_HEADER_LEN};
use tiny_netstack::network::icmp::{unreachable, ICMP_TYPE_DEST_UNREACHABLE};
use tiny_netstack::network::ipv4::IPV4_HEADER_LEN;
use tiny_netstack::network::{checksum, protocol};
use tiny_netstack::{Buf, Error, IcmpHeader, ICMP_TYPE_ECHO_REQUEST};

fn echo_request(payload: &[u8]) -> Vec<u8> {
    let mut header = IcmpHeader::new(ICMP_TYPE_ECHO_REQUEST, 0);
    header.set_identifier(1);
    header.set_sequence(1);
    let mut message = header.to_bytes().to_vec();
    message.extend_from_slice(payload);
    tiny_netstack::network::icmp::fill_checksum(&mut message);
    message
}

#[test]
fn test_outgoing_header_fields() {
    let (mut iface, _clock) = setup_resolved();
    let mut buf = Buf::from_slice(b"hello");
    iface.ip_out(&mut buf, PEER_IP, 253).unwrap();

    let frames = iface.device_mut().take_sent();
    assert_eq!(frames.len(), 1);
    let ip_bytes = &frames[0][ETHERNET_HEADER_LEN..ETHERNET_HEADER_LEN + IPV4_HEADER_LEN];
    assert_eq!(checksum(ip_bytes), 0);

    let (_, ip, payload) = split_ip_frame(&frames[0]);
    assert_eq!(ip.version, 4);
    assert_eq!(ip.ihl, 5);
    assert_eq!(ip.tos, 0);
    assert_eq!(ip.total_len, 25);
    assert_eq!(ip.flags_frag_offset, 0);
    assert_eq!(ip.ttl, 64);
    assert_eq!(ip.protocol, 253);
    assert_eq!(ip.src_addr, HOST_IP);
    assert_eq!(ip.dst_addr, PEER_IP);
    assert_eq!(payload, b"hello");
}

#[test]
fn test_identifier_advances_once_per_datagram() {
    let (mut iface, _clock) = setup_resolved();
    let first = iface.next_datagram_id();

    iface.ip_out(&mut Buf::from_slice(b"a"), PEER_IP, 253).unwrap();
    iface.ip_out(&mut Buf::from_slice(&vec![0u8; 4000]), PEER_IP, 253).unwrap();
    iface.ip_out(&mut Buf::from_slice(b"b"), PEER_IP, 253).unwrap();

    let ids: Vec<u16> = iface
        .device_mut()
        .take_sent()
        .iter()
        .map(|frame| split_ip_frame(frame).1.id)
        .collect();
    assert_eq!(ids, vec![first, first + 1, first + 1, first + 1, first + 2]);
    assert_eq!(iface.next_datagram_id(), first + 3);
}

#[test]
fn test_fragmentation() {
    let (mut iface, _clock) = setup_resolved();
    let max_payload = iface.config().max_ip_payload();
    assert_eq!(max_payload, 1480);

    let data: Vec<u8> = (0..max_payload * 5 / 2).map(|i| i as u8).collect();
    iface.ip_out(&mut Buf::from_slice(&data), PEER_IP, 253).unwrap();

    let frames = iface.device_mut().take_sent();
    assert_eq!(frames.len(), 3);

    let mut reassembled = Vec::new();
    let mut ids = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        let (_, ip, payload) = split_ip_frame(frame);
        assert_eq!(ip.fragment_offset(), i * max_payload);
        assert_eq!(ip.more_fragments(), i < 2);
        assert!(ip.verify_checksum());
        ids.push(ip.id);
        reassembled.extend_from_slice(&payload);
    }
    assert!(ids.iter().all(|&id| id == ids[0]));
    assert_eq!(split_ip_frame(&frames[2]).2.len(), max_payload / 2);
    assert_eq!(reassembled, data);
}

#[test]
fn test_fragmentation_with_small_mtu_keeps_offsets_aligned() {
    let mut config = host_config();
    config.mtu = 1006;
    let (mut iface, _clock) = setup_with(config);
    deliver(
        &mut iface,
        arp_frame(
            tiny_netstack::link::arp::opcode::REPLY,
            PEER_MAC,
            PEER_IP,
            HOST_MAC,
            HOST_IP,
        ),
    );

    iface.ip_out(&mut Buf::from_slice(&[7u8; 2000]), PEER_IP, 253).unwrap();
    let offsets: Vec<usize> = iface
        .device_mut()
        .take_sent()
        .iter()
        .map(|frame| split_ip_frame(frame).1.fragment_offset())
        .collect();
    assert_eq!(offsets, vec![0, 984, 1968]);
}

#[test]
fn test_corrupted_header_is_dropped() {
    let (mut iface, _clock) = setup_resolved();
    let frame = peer_ip_frame(protocol::ICMP, &echo_request(b"abc"));

    // Untouched, the echo request is answered.
    deliver(&mut iface, frame.clone());
    assert_eq!(iface.device_mut().take_sent().len(), 1);

    for i in ETHERNET_HEADER_LEN..ETHERNET_HEADER_LEN + IPV4_HEADER_LEN {
        let mut corrupt = frame.clone();
        corrupt[i] ^= 0x01;
        deliver(&mut iface, corrupt);
        assert!(
            iface.device().sent().is_empty(),
            "corrupting header byte {} still produced output",
            i - ETHERNET_HEADER_LEN
        );
    }
}

#[test]
fn test_wrong_version_dropped() {
    let (mut iface, _clock) = setup_resolved();
    let mut datagram = ipv4_datagram(PEER_IP, HOST_IP, protocol::ICMP, &echo_request(b"v"));
    datagram[0] = 0x65;
    datagram[10..12].copy_from_slice(&[0, 0]);
    let sum = checksum(&datagram[..IPV4_HEADER_LEN]);
    datagram[10..12].copy_from_slice(&sum.to_be_bytes());

    deliver(&mut iface, eth_frame(HOST_MAC, PEER_MAC, ethertype::IPV4, &datagram));
    assert!(iface.device().sent().is_empty());
}

#[test]
fn test_incomplete_datagram_dropped() {
    let (mut iface, _clock) = setup_resolved();
    let datagram = ipv4_datagram(PEER_IP, HOST_IP, protocol::ICMP, &echo_request(&[0x55; 80]));
    let truncated = &datagram[..datagram.len() - 10];
    deliver(&mut iface, eth_frame(HOST_MAC, PEER_MAC, ethertype::IPV4, truncated));
    assert!(iface.device().sent().is_empty());
}

#[test]
fn test_datagram_for_other_host_dropped() {
    let (mut iface, _clock) = setup_resolved();
    let other = Ipv4Addr::new(10, 0, 0, 99);
    let datagram = ipv4_datagram(PEER_IP, other, protocol::ICMP, &echo_request(b"abc"));
    deliver(&mut iface, eth_frame(HOST_MAC, PEER_MAC, ethertype::IPV4, &datagram));
    assert!(iface.device().sent().is_empty());
}

#[test]
fn test_link_padding_is_trimmed() {
    let (mut iface, _clock) = setup_resolved();
    let request = echo_request(b"abc");
    let mut frame = peer_ip_frame(protocol::ICMP, &request);
    frame.resize(ETHERNET_HEADER_LEN + 46, 0);

    deliver(&mut iface, frame);
    let frames = iface.device_mut().take_sent();
    let (_, ip, payload) = split_ip_frame(&frames[0]);
    assert_eq!(ip.total_len as usize, IPV4_HEADER_LEN + request.len());
    assert_eq!(payload.len(), request.len());
    assert_eq!(&payload[8..], b"abc");
}

#[test]
fn test_unknown_protocol_reports_unreachable() {
    let (mut iface, _clock) = setup_resolved();
    let segment: Vec<u8> = (1..=20).collect();
    let datagram = ipv4_datagram(PEER_IP, HOST_IP, protocol::TCP, &segment);
    deliver(&mut iface, eth_frame(HOST_MAC, PEER_MAC, ethertype::IPV4, &datagram));

    let frames = iface.device_mut().take_sent();
    assert_eq!(frames.len(), 1);
    let (eth, ip, message) = split_ip_frame(&frames[0]);
    assert_eq!(eth.dst, PEER_MAC);
    assert_eq!(ip.dst_addr, PEER_IP);
    assert_eq!(ip.protocol, protocol::ICMP);

    let icmp = IcmpHeader::from_bytes(&message).unwrap();
    assert_eq!(icmp.msg_type, ICMP_TYPE_DEST_UNREACHABLE);
    assert_eq!(icmp.msg_code, unreachable::PROTOCOL);
    assert_eq!(icmp.rest, [0; 4]);
    assert_eq!(checksum(&message), 0);
    assert_eq!(&message[8..], &datagram[..IPV4_HEADER_LEN + 8]);
}

#[test]
fn test_unreachable_quotes_short_payload_whole() {
    let (mut iface, _clock) = setup_resolved();
    let datagram = ipv4_datagram(PEER_IP, HOST_IP, 253, &[1, 2, 3]);
    deliver(&mut iface, eth_frame(HOST_MAC, PEER_MAC, ethertype::IPV4, &datagram));

    let frames = iface.device_mut().take_sent();
    assert_eq!(frames.len(), 1);
    let (_, _, message) = split_ip_frame(&frames[0]);
    let icmp = IcmpHeader::from_bytes(&message).unwrap();
    assert_eq!(icmp.msg_type, ICMP_TYPE_DEST_UNREACHABLE);
    assert_eq!(icmp.msg_code, unreachable::PROTOCOL);
    assert_eq!(checksum(&message), 0);
    assert_eq!(&message[8..], &datagram[..IPV4_HEADER_LEN + 3]);
}

#[test]
fn test_oversized_payload_rejected() {
    let (mut iface, _clock) = setup_resolved();
    let first = iface.next_datagram_id();

    let result = iface.ip_out(&mut Buf::from_slice(&vec![0u8; 70_000]), PEER_IP, 253);
    assert!(matches!(
        result,
        Err(Error::PayloadTooLarge { len: 70_000, max: 65_515 })
    ));
    assert!(iface.device().sent().is_empty());
    assert_eq!(iface.next_datagram_id(), first);

    // The largest payload that fits still goes out, with offsets in range.
    iface.ip_out(&mut Buf::from_slice(&vec![0u8; 65_515]), PEER_IP, 253).unwrap();
    let frames = iface.device_mut().take_sent();
    let last = split_ip_frame(frames.last().unwrap());
    assert!(!last.1.more_fragments());
    assert_eq!(last.1.fragment_offset() + last.2.len(), 65_515);
}
