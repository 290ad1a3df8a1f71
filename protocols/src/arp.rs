use std::net::Ipv4Addr;

use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::EtherTypes;
use pnet::util::MacAddr;

use crate::{ARP_LEN, ETH_HDR_LEN, MIN_ETH_FRAME_NO_FCS, PacketError, ethernet};

/// The part of an ARP reply a sweep cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArpReply {
    pub sender_ip: Ipv4Addr,
    pub sender_mac: MacAddr,
}

/// Builds a broadcast "who-has `target_addr`" frame, padded to the Ethernet minimum.
pub fn create_request(
    src_mac: MacAddr,
    src_addr: Ipv4Addr,
    target_addr: Ipv4Addr,
) -> Result<Vec<u8>, PacketError> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    ethernet::make_header(&mut buffer, src_mac, MacAddr::broadcast(), EtherTypes::Arp)?;
    let mut arp_packet = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or(PacketError::ArpBuffer)?;
    arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp_packet.set_protocol_type(EtherTypes::Ipv4);
    arp_packet.set_hw_addr_len(6);
    arp_packet.set_proto_addr_len(4);
    arp_packet.set_operation(ArpOperations::Request);
    arp_packet.set_sender_hw_addr(src_mac);
    arp_packet.set_target_hw_addr(MacAddr::zero());
    arp_packet.set_sender_proto_addr(src_addr);
    arp_packet.set_target_proto_addr(target_addr);
    Ok(Vec::from(buffer))
}

/// Extracts a reply addressed to `requester` from a raw frame.
///
/// Frames that are not ARP, ARP frames that are not replies, and replies
/// answering someone else's request yield `Ok(None)`.
pub fn parse_reply(frame: &[u8], requester: Ipv4Addr) -> Result<Option<ArpReply>, PacketError> {
    let eth = ethernet::get_packet_from_u8(frame)?;
    if eth.get_ethertype() != EtherTypes::Arp {
        return Ok(None);
    }

    let payload = eth.payload();
    let arp = ArpPacket::new(payload).ok_or(PacketError::TruncatedArp { len: payload.len() })?;
    if arp.get_operation() != ArpOperations::Reply
        || arp.get_target_proto_addr() != requester
    {
        return Ok(None);
    }

    Ok(Some(ArpReply {
        sender_ip: arp.get_sender_proto_addr(),
        sender_mac: arp.get_sender_hw_addr(),
    }))
}

/// Builds a reply frame as a neighbour would send it. Handy for simulated links.
pub fn create_reply(
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
) -> Result<Vec<u8>, PacketError> {
    let mut buffer = [0u8; MIN_ETH_FRAME_NO_FCS];
    ethernet::make_header(&mut buffer, sender_mac, target_mac, EtherTypes::Arp)?;
    let mut arp_packet = MutableArpPacket::new(&mut buffer[ETH_HDR_LEN..ETH_HDR_LEN + ARP_LEN])
        .ok_or(PacketError::ArpBuffer)?;
    arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
    arp_packet.set_protocol_type(EtherTypes::Ipv4);
    arp_packet.set_hw_addr_len(6);
    arp_packet.set_proto_addr_len(4);
    arp_packet.set_operation(ArpOperations::Reply);
    arp_packet.set_sender_hw_addr(sender_mac);
    arp_packet.set_sender_proto_addr(sender_ip);
    arp_packet.set_target_hw_addr(target_mac);
    arp_packet.set_target_proto_addr(target_ip);
    Ok(Vec::from(buffer))
}
