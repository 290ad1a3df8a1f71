//! Link-layer framing for ARP sweeps.
//!
//! Only the two frames a sweep needs are covered: the broadcast ARP request
//! that goes out, and the ARP reply that comes back.

pub mod arp;
pub mod ethernet;

use thiserror::Error;

pub const MIN_ETH_FRAME_NO_FCS: usize = 60;
pub const ETH_HDR_LEN: usize = 14;
pub const ARP_LEN: usize = 28;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PacketError {
    #[error("buffer of {len} bytes is too small for an Ethernet header")]
    EthernetBuffer { len: usize },

    #[error("buffer too small for an ARP payload")]
    ArpBuffer,

    #[error("truncated or invalid ARP packet (payload len {len})")]
    TruncatedArp { len: usize },
}
