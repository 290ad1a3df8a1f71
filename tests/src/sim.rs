//! A scriptable LAN for driving the engine without raw sockets.

use std::io;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use netradar_common::network::range::TargetRange;
use netradar_core::{ArpTransport, GatewayError, RouteSource, TransportError};
use netradar_protocols::arp::ArpReply;
use pnet::util::MacAddr;

#[derive(Debug, Default)]
struct LanState {
    devices: Vec<ArpReply>,
    failing: bool,
    sweeps: usize,
}

/// Devices that answer ARP, shared between a test and its transports.
#[derive(Debug, Clone, Default)]
pub struct SimulatedLan {
    state: Arc<Mutex<LanState>>,
}

impl SimulatedLan {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, LanState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a device whose MAC ends in the address's last octet.
    pub fn add_device(&self, ip: Ipv4Addr) -> &Self {
        let last = ip.octets()[3];
        self.lock().devices.push(ArpReply {
            sender_ip: ip,
            sender_mac: MacAddr(0x02, 0, 0, 0, 0, last),
        });
        self
    }

    pub fn remove_device(&self, ip: Ipv4Addr) {
        self.lock().devices.retain(|d| d.sender_ip != ip);
    }

    /// While failing, every sweep errors as if raw sockets were refused.
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    pub fn sweeps(&self) -> usize {
        self.lock().sweeps
    }

    pub fn transport(&self) -> SimulatedTransport {
        SimulatedTransport { lan: self.clone() }
    }
}

pub struct SimulatedTransport {
    lan: SimulatedLan,
}

impl ArpTransport for SimulatedTransport {
    fn sweep(
        &mut self,
        _range: &TargetRange,
        _window: Duration,
    ) -> Result<Vec<ArpReply>, TransportError> {
        let mut state = self.lan.lock();
        state.sweeps += 1;
        if state.failing {
            return Err(TransportError::ChannelOpen {
                interface: "sim0".into(),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "Operation not permitted"),
            });
        }
        Ok(state.devices.clone())
    }
}

/// Routing table with a fixed answer; `None` means no default route.
#[derive(Debug, Clone, Copy)]
pub struct StaticRoutes(pub Option<Ipv4Addr>);

impl RouteSource for StaticRoutes {
    fn default_gateway(&self) -> Result<Ipv4Addr, GatewayError> {
        self.0.ok_or(GatewayError::NoDefaultRoute)
    }
}
