//! Error types for the discovery engine.
//!
//! None of these escape a running scheduler: transport and gateway failures are
//! absorbed into an empty sweep or the fallback range. Only [`StartupError`]
//! reaches the caller.

use std::io;
use std::net::Ipv4Addr;

use netradar_common::network::range::TargetRange;
use netradar_protocols::PacketError;
use thiserror::Error;

use crate::scheduler::SchedulerState;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("no usable interface to reach {range}")]
    NoInterface { range: TargetRange },

    #[error("interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("interface '{interface}' has no MAC address")]
    NoMacAddress { interface: String },

    #[error("interface '{interface}' has no IPv4 address to send from")]
    NoSourceAddress { interface: String },

    #[error("opening on {interface}: {source}")]
    ChannelOpen {
        interface: String,
        #[source]
        source: io::Error,
    },

    #[error("non-ethernet channel for {interface}")]
    NotEthernet { interface: String },

    #[error("sending ARP request for {target} failed: {source}")]
    Send {
        target: Ipv4Addr,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Packet(#[from] PacketError),
}

impl TransportError {
    /// True when the OS refused raw socket access.
    pub fn is_permission_denied(&self) -> bool {
        match self {
            TransportError::ChannelOpen { source, .. } | TransportError::Send { source, .. } => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("no IPv4 default route")]
    NoDefaultRoute,

    #[error("malformed route entry: {0}")]
    Malformed(String),

    #[error("route command '{command}' failed: {reason}")]
    Command { command: String, reason: String },

    #[error("reading routing table: {0}")]
    Io(#[from] io::Error),

    #[error("gateway detection is not supported on this platform")]
    Unsupported,
}

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("scheduler cannot start from state {0}")]
    InvalidState(SchedulerState),

    #[error("failed to spawn scan worker: {0}")]
    Spawn(#[source] io::Error),
}
