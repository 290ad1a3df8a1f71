//! Shared building blocks for the netradar workspace.
//!
//! Holds the domain model handed from the discovery engine to its consumers
//! ([`network::host::Host`], [`network::whitelist::Whitelist`],
//! [`network::range::TargetRange`]), the runtime [`config::RadarConfig`] and the
//! interface selection helpers used by the link-layer transport.

pub mod config;
pub mod error;
pub mod network;
pub mod utils;
