use std::collections::HashSet;
use std::net::Ipv4Addr;

/// The set of addresses considered expected on the network.
///
/// Membership is an exact match on the textual form of the address, so
/// `"192.168.1.010"` in the source never matches `192.168.1.10`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Whitelist {
    entries: HashSet<String>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// One entry per line; surrounding whitespace is trimmed and blank lines skipped.
    pub fn parse(text: &str) -> Self {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.entries.contains(ip)
    }

    pub fn contains_addr(&self, ip: Ipv4Addr) -> bool {
        self.contains(&ip.to_string())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<String> for Whitelist {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
