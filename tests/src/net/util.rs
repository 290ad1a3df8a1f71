use pnet::datalink::{MacAddr, NetworkInterface};
use pnet::ipnetwork::IpNetwork;

/// Builds an interface the way `pnet::datalink::interfaces()` would report it.
pub fn mock(
    name: &str,
    index: u32,
    mac: Option<MacAddr>,
    nets: &[&str],
    flags: u32,
) -> NetworkInterface {
    NetworkInterface {
        name: name.into(),
        description: String::new(),
        index,
        mac,
        ips: nets.iter().map(|cidr| net(cidr)).collect(),
        flags,
    }
}

pub fn net(cidr: &str) -> IpNetwork {
    cidr.parse()
        .unwrap_or_else(|e| panic!("bad test network {cidr}: {e}"))
}
