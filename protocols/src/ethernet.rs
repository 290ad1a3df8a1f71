use pnet::packet::ethernet::{EtherType, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;

use crate::PacketError;

pub fn make_header(
    buffer: &mut [u8],
    src_mac: MacAddr,
    dst_mac: MacAddr,
    et: EtherType,
) -> Result<(), PacketError> {
    let len = buffer.len();
    let mut eth =
        MutableEthernetPacket::new(buffer).ok_or(PacketError::EthernetBuffer { len })?;

    eth.set_source(src_mac);
    eth.set_destination(dst_mac);
    eth.set_ethertype(et);

    Ok(())
}

pub fn get_packet_from_u8(bytes: &[u8]) -> Result<EthernetPacket<'_>, PacketError> {
    EthernetPacket::new(bytes).ok_or(PacketError::EthernetBuffer { len: bytes.len() })
}
