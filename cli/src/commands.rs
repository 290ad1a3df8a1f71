pub mod discover;
pub mod watch;

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Parser};
use netradar_common::config::{DEFAULT_WHITELIST_PATH, RadarConfig};
use netradar_common::network::range::TargetSpec;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "netradar", version)]
#[command(about = "Watches a LAN for devices that are not on the whitelist.")]
pub struct CommandLine {
    /// Subnet to sweep in CIDR notation, or "auto" to derive it from the default gateway
    #[arg(short, long, default_value = "auto")]
    pub target: TargetSpec,

    /// Seconds to wait between sweeps
    #[arg(short = 'n', long, default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// File with one accepted IPv4 address per line
    #[arg(short, long, default_value = DEFAULT_WHITELIST_PATH)]
    pub whitelist: PathBuf,

    /// How long to collect ARP replies after each broadcast, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub timeout_ms: u64,

    /// Sweep from this interface instead of picking one
    #[arg(short, long)]
    pub interface: Option<String>,

    /// Run a single sweep and exit
    #[arg(long)]
    pub once: bool,

    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Less output (-q hides per-host detail, -qq only alerts)
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn radar_config(&self) -> RadarConfig {
        RadarConfig {
            target: self.target,
            scan_interval: Duration::from_secs(self.interval),
            whitelist_path: self.whitelist.clone(),
            reply_timeout: Duration::from_millis(self.timeout_ms),
            interface: self.interface.clone(),
            join_timeout: None,
        }
    }

    /// Default directive for the log filter when `RUST_LOG` is unset.
    pub fn log_level(&self) -> &'static str {
        match (self.quiet, self.verbose) {
            (q, _) if q > 0 => "warn",
            (_, 0) => "info",
            (_, 1) => "debug",
            _ => "trace",
        }
    }
}

pub fn privilege_notice() {
    if is_root::is_root() {
        info!("Running with raw socket privileges");
    } else {
        warn!("Not running as root: ARP sweeps will most likely fail, re-run with sudo");
    }
}
