use thiserror::Error;

/// Raised when a user-supplied scan target cannot be turned into a [`TargetRange`].
///
/// [`TargetRange`]: crate::network::range::TargetRange
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TargetParseError {
    #[error("invalid target '{input}': {reason}")]
    Invalid { input: String, reason: String },

    #[error("IPv6 targets are not supported: {0}")]
    Ipv6(String),

    #[error("prefix /{0} is out of range for IPv4")]
    Prefix(u8),
}
