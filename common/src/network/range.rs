//! # Target Range Model
//!
//! The subnet a scheduler sweeps for its whole lifetime.
//!
//! A target is either given explicitly as CIDR (`192.168.1.0/24`) or left on
//! [`TargetSpec::Auto`], in which case the gateway resolver derives it once at
//! startup.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use pnet::ipnetwork::Ipv4Network;

use crate::error::TargetParseError;

/// An IPv4 network with its host bits cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetRange {
    network: Ipv4Addr,
    prefix: u8,
}

impl TargetRange {
    /// Range used whenever the default gateway cannot be determined.
    pub const FALLBACK: TargetRange = TargetRange {
        network: Ipv4Addr::new(192, 168, 1, 0),
        prefix: 24,
    };

    /// Builds a range from any address inside it; host bits are zeroed.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> Result<Self, TargetParseError> {
        if prefix > 32 {
            return Err(TargetParseError::Prefix(prefix));
        }
        let network = Ipv4Addr::from(u32::from(addr) & mask(prefix));
        Ok(Self { network, prefix })
    }

    /// The `/24` that contains `gateway` (`10.0.5.1` -> `10.0.5.0/24`).
    pub fn from_gateway(gateway: Ipv4Addr) -> Self {
        let [a, b, c, _] = gateway.octets();
        Self {
            network: Ipv4Addr::new(a, b, c, 0),
            prefix: 24,
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn broadcast(&self) -> Ipv4Addr {
        Ipv4Addr::from(u32::from(self.network) | !mask(self.prefix))
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & mask(self.prefix) == u32::from(self.network)
    }

    /// Addresses worth probing. Network and broadcast addresses are skipped
    /// unless the prefix is /31 or /32, where every address is a host.
    pub fn hosts(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let mut start = u32::from(self.network);
        let mut end = u32::from(self.broadcast());
        if self.prefix < 31 {
            start = start.saturating_add(1);
            end = end.saturating_sub(1);
        }
        (start..=end).map(Ipv4Addr::from)
    }
}

fn mask(prefix: u8) -> u32 {
    match prefix {
        0 => 0,
        p => u32::MAX << (32 - u32::from(p)),
    }
}

impl fmt::Display for TargetRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for TargetRange {
    type Err = TargetParseError;

    /// Accepts CIDR (`192.168.1.0/24`, `192.168.1.7/24`) or a bare IPv4
    /// address, which is treated as `/32`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = |reason: String| TargetParseError::Invalid {
            input: s.to_string(),
            reason,
        };

        if let Ok(addr) = s.parse::<IpAddr>() {
            return match addr {
                IpAddr::V4(v4) => Self::new(v4, 32),
                IpAddr::V6(_) => Err(TargetParseError::Ipv6(s.to_string())),
            };
        }

        let (addr_str, _) = s
            .split_once('/')
            .ok_or_else(|| invalid("expected CIDR notation such as 192.168.1.0/24".into()))?;
        if addr_str.contains(':') {
            return Err(TargetParseError::Ipv6(s.to_string()));
        }

        let net = s
            .parse::<Ipv4Network>()
            .map_err(|e| invalid(e.to_string()))?;
        Self::new(net.ip(), net.prefix())
    }
}

/// What the caller asked to scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetSpec {
    /// Derive the range from the default gateway.
    #[default]
    Auto,
    Range(TargetRange),
}

impl FromStr for TargetSpec {
    type Err = TargetParseError;

    /// `auto` (any case) or anything [`TargetRange`] accepts.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(TargetSpec::Auto);
        }
        s.parse().map(TargetSpec::Range)
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetSpec::Auto => f.write_str("auto"),
            TargetSpec::Range(range) => fmt::Display::fmt(range, f),
        }
    }
}
