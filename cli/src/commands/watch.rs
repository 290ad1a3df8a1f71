use netradar_common::config::RadarConfig;
use netradar_core::{ChannelSink, ScanScheduler};
use tokio::signal;
use tracing::{Instrument, error, info, info_span, warn};

use crate::monitor::{self, KnownSet};
use crate::terminal::{print, spinner};

/// Reports buffered between the worker and the terminal before the worker blocks.
const REPORT_QUEUE: usize = 4;

/// Runs the scheduler until Ctrl-C, rendering every cycle as it arrives.
pub async fn watch(cfg: RadarConfig, q_level: u8) -> anyhow::Result<()> {
    let (sink, mut rx) = ChannelSink::new(REPORT_QUEUE);
    let settings = cfg.clone();
    let mut scheduler =
        tokio::task::spawn_blocking(move || ScanScheduler::system(&settings, sink)).await?;
    let range = scheduler.range();

    if q_level == 0 {
        print::aligned_line("Range", range);
        print::aligned_line("Interval", format!("{}s", cfg.scan_interval.as_secs()));
        print::aligned_line("Whitelist", cfg.whitelist_path.display());
        print::aligned_line("Interface", cfg.interface.as_deref().unwrap_or("auto"));
    }

    scheduler.start()?;

    let span = info_span!("watch", indicatif.pb_show = true);
    async {
        let mut known = KnownSet::new();
        let ctrl_c = signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            spinner::set_message(&format!("Sweeping {range}, Ctrl-C to stop"));
            tokio::select! {
                report = rx.recv() => match report {
                    Some(report) => monitor::render(&report, &mut known, q_level),
                    None => {
                        warn!("Scan worker stopped delivering results");
                        break;
                    }
                },
                res = &mut ctrl_c => {
                    if let Err(e) = res {
                        error!(error = %e, "Failed to listen for Ctrl-C");
                    }
                    info!("Interrupted, shutting down");
                    break;
                }
            }
        }
    }
    .instrument(span)
    .await;

    drop(rx);
    let state = tokio::task::spawn_blocking(move || {
        scheduler.stop();
        scheduler.state()
    })
    .await?;
    info!(state = %state, "Scheduler shut down");

    print::end_of_program();
    Ok(())
}
