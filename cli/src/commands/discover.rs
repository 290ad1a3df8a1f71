use std::time::Instant;

use netradar_common::config::RadarConfig;
use netradar_core::{DiscoveryEngine, GatewayResolver, ScanReport, WhitelistStore};
use tracing::info_span;

use crate::monitor::{self, KnownSet};
use crate::terminal::{print, spinner};

/// One sweep through the same engine the scheduler uses, then exit.
pub async fn discover(cfg: RadarConfig, q_level: u8) -> anyhow::Result<()> {
    let span = info_span!("discovery", indicatif.pb_show = true);

    let report = tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let range = GatewayResolver::new().resolve(cfg.target);
        spinner::set_message(&format!("Sweeping {range}..."));

        let started = Instant::now();
        let whitelist = WhitelistStore::new(cfg.whitelist_path.clone()).load();
        let hosts = DiscoveryEngine::system(&cfg).scan(&range, &whitelist);
        ScanReport {
            cycle: 1,
            range,
            hosts,
            elapsed: started.elapsed(),
        }
    })
    .await?;

    monitor::render(&report, &mut KnownSet::new(), q_level);
    print::end_of_program();
    Ok(())
}
