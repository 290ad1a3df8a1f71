//! # Host Model
//!
//! A host is one ARP reply observed during a single sweep, tagged with its
//! whitelist verdict. Hosts are rebuilt on every sweep and never updated in place.

use std::fmt;
use std::net::Ipv4Addr;

use pnet::util::MacAddr;

use crate::network::whitelist::Whitelist;

/// Ordered hosts of one sweep, in reply-arrival order.
pub type ScanResult = Vec<Host>;

/// Whitelist verdict for a discovered address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Classification {
    /// The address is on the whitelist.
    Accepted,
    /// The address is unknown.
    Alert,
}

impl Classification {
    pub fn of(ip: Ipv4Addr, whitelist: &Whitelist) -> Self {
        if whitelist.contains_addr(ip) {
            Classification::Accepted
        } else {
            Classification::Alert
        }
    }

    pub fn display_color(&self) -> &'static str {
        match self {
            Classification::Accepted => "green",
            Classification::Alert => "red",
        }
    }

    pub fn display_label(&self) -> &'static str {
        match self {
            Classification::Accepted => "Accepted",
            Classification::Alert => "ALERT - New/Unknown",
        }
    }

    pub fn is_alert(&self) -> bool {
        matches!(self, Classification::Alert)
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    pub ip: Ipv4Addr,
    pub mac: MacAddr,
    pub classification: Classification,
}

impl Host {
    /// Creates a host and classifies it against `whitelist`.
    pub fn classify(ip: Ipv4Addr, mac: MacAddr, whitelist: &Whitelist) -> Self {
        Self {
            ip,
            mac,
            classification: Classification::of(ip, whitelist),
        }
    }

    pub fn display_color(&self) -> &'static str {
        self.classification.display_color()
    }

    pub fn display_label(&self) -> &'static str {
        self.classification.display_label()
    }
}
