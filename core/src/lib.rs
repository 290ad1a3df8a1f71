//! # netradar core
//!
//! The continuous discovery engine.
//!
//! * [`whitelist`] reads the accepted-address list, once per cycle.
//! * [`gateway`] derives the subnet to sweep from the default route.
//! * [`discovery`] runs one ARP sweep and classifies the replies.
//! * [`scheduler`] owns the background worker that repeats the sweep and
//!   hands every result to a consumer.
//!
//! Link-layer I/O lives in [`network`], behind the
//! [`ArpTransport`](discovery::ArpTransport) seam so sweeps can be simulated.

pub mod discovery;
pub mod error;
pub mod gateway;
pub mod network;
pub mod scheduler;
pub mod whitelist;

pub use discovery::{ArpTransport, DiscoveryEngine};
pub use error::{GatewayError, StartupError, TransportError};
pub use gateway::{GatewayResolver, RouteSource, SystemRoutes};
pub use network::channel::DatalinkTransport;
pub use scheduler::{ChannelSink, ScanReport, ScanScheduler, ScanSink, SchedulerState};
pub use whitelist::WhitelistStore;
