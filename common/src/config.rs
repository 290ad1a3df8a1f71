use std::path::PathBuf;
use std::time::Duration;

use crate::network::range::TargetSpec;

pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(1);
pub const DEFAULT_WHITELIST_PATH: &str = "accepted_ips.txt";

/// Slack added on top of one full cycle when waiting for the worker to exit.
const JOIN_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct RadarConfig {
    /// Subnet to sweep. [`TargetSpec::Auto`] derives it from the default gateway.
    pub target: TargetSpec,

    /// Pause between the end of one sweep and the start of the next.
    pub scan_interval: Duration,

    /// Newline-delimited list of accepted addresses, re-read every cycle.
    pub whitelist_path: PathBuf,

    /// How long to collect ARP replies after the requests went out.
    pub reply_timeout: Duration,

    /// Forces the sweep onto a named interface instead of picking one.
    pub interface: Option<String>,

    /// Bound on how long `stop()` waits for the worker. Defaults to one full cycle plus slack.
    pub join_timeout: Option<Duration>,
}

impl RadarConfig {
    pub fn join_timeout(&self) -> Duration {
        self.join_timeout
            .unwrap_or(self.reply_timeout + self.scan_interval + JOIN_GRACE)
    }
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            target: TargetSpec::Auto,
            scan_interval: DEFAULT_SCAN_INTERVAL,
            whitelist_path: PathBuf::from(DEFAULT_WHITELIST_PATH),
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            interface: None,
            join_timeout: None,
        }
    }
}
