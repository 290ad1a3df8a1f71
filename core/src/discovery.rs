//! # Discovery Engine
//!
//! One ARP sweep over a [`TargetRange`], classified against a [`Whitelist`].
//!
//! The engine never fails: a broken transport is logged and reported as an
//! empty sweep, so a scheduler keeps its cadence through transient outages.

use std::collections::HashSet;
use std::time::Duration;

use netradar_common::config::{DEFAULT_REPLY_TIMEOUT, RadarConfig};
use netradar_common::network::host::{Host, ScanResult};
use netradar_common::network::range::TargetRange;
use netradar_common::network::whitelist::Whitelist;
use netradar_protocols::arp::ArpReply;
use tracing::{debug, error, warn};

use crate::error::TransportError;
use crate::network::channel::DatalinkTransport;

/// Link-layer seam: broadcast a request to every host in `range` and return
/// the replies heard within `window`, in arrival order.
pub trait ArpTransport: Send {
    fn sweep(&mut self, range: &TargetRange, window: Duration)
    -> Result<Vec<ArpReply>, TransportError>;
}

impl<T: ArpTransport + ?Sized> ArpTransport for Box<T> {
    fn sweep(
        &mut self,
        range: &TargetRange,
        window: Duration,
    ) -> Result<Vec<ArpReply>, TransportError> {
        (**self).sweep(range, window)
    }
}

pub struct DiscoveryEngine<T = DatalinkTransport> {
    transport: T,
    reply_timeout: Duration,
}

impl DiscoveryEngine<DatalinkTransport> {
    /// Engine on the real datalink, honouring the configured interface and reply timeout.
    pub fn system(config: &RadarConfig) -> Self {
        let transport = match &config.interface {
            Some(name) => DatalinkTransport::on_interface(name.clone()),
            None => DatalinkTransport::new(),
        };
        DiscoveryEngine::new(transport).with_reply_timeout(config.reply_timeout)
    }
}

impl<T: ArpTransport> DiscoveryEngine<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
        }
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    pub fn reply_timeout(&self) -> Duration {
        self.reply_timeout
    }

    /// Sweeps `range` once. Failures yield an empty result.
    pub fn scan(&mut self, range: &TargetRange, whitelist: &Whitelist) -> ScanResult {
        match self.transport.sweep(range, self.reply_timeout) {
            Ok(replies) => {
                let heard = replies.len();
                let hosts = classify(replies, range, whitelist);
                debug!(
                    range = %range,
                    replies = heard,
                    hosts = hosts.len(),
                    alerts = hosts.iter().filter(|h| h.classification.is_alert()).count(),
                    "Sweep finished"
                );
                hosts
            }
            Err(e) => {
                report_failure(range, &e);
                Vec::new()
            }
        }
    }
}

fn report_failure(range: &TargetRange, e: &TransportError) {
    error!(range = %range, error = %e, "ARP sweep failed, reporting no hosts this cycle");
    if e.is_permission_denied() || !is_root::is_root() {
        warn!("Raw link-layer access usually needs root or administrator privileges");
    }
}

/// Turns raw replies into hosts: out-of-range senders are dropped, and an
/// address answering more than once keeps its first reply.
pub fn classify(replies: Vec<ArpReply>, range: &TargetRange, whitelist: &Whitelist) -> ScanResult {
    let mut seen = HashSet::new();
    replies
        .into_iter()
        .filter(|reply| range.contains(reply.sender_ip))
        .filter(|reply| seen.insert(reply.sender_ip))
        .map(|reply| Host::classify(reply.sender_ip, reply.sender_mac, whitelist))
        .collect()
}
