use std::net::Ipv4Addr;

use pnet::datalink::NetworkInterface;
use pnet::ipnetwork::{IpNetwork, Ipv4Network};

use crate::network::range::TargetRange;

pub trait NetworkInterfaceExtension {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network>;
    /// The interface's own address inside `range`, if it has one.
    fn get_ipv4_in(&self, range: &TargetRange) -> Option<Ipv4Addr>;
    /// Address to source ARP requests from: one inside `range` when possible,
    /// otherwise the first non-loopback IPv4 address.
    fn get_source_ipv4(&self, range: &TargetRange) -> Option<Ipv4Addr>;
}

impl NetworkInterfaceExtension for NetworkInterface {
    fn get_ipv4_nets(&self) -> Vec<Ipv4Network> {
        self.ips
            .iter()
            .filter_map(|ip| match ip {
                IpNetwork::V4(ipv4) => Some(*ipv4),
                IpNetwork::V6(_) => None,
            })
            .collect()
    }

    fn get_ipv4_in(&self, range: &TargetRange) -> Option<Ipv4Addr> {
        self.get_ipv4_nets()
            .into_iter()
            .map(|net| net.ip())
            .find(|ip| range.contains(*ip))
    }

    fn get_source_ipv4(&self, range: &TargetRange) -> Option<Ipv4Addr> {
        self.get_ipv4_in(range).or_else(|| {
            self.get_ipv4_nets()
                .into_iter()
                .map(|net| net.ip())
                .find(|ip| !ip.is_loopback())
        })
    }
}
