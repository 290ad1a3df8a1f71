//! Terminal consumer of scan reports.
//!
//! Renders every cycle and raises an alert the first time an unknown device
//! shows up. Novelty is tracked here, across cycles; the engine itself only
//! reports what each sweep saw.

use std::collections::HashSet;
use std::io::Write;
use std::net::Ipv4Addr;

use colored::*;
use netradar_common::network::host::Host;
use netradar_core::ScanReport;
use tracing::{debug, warn};

use crate::terminal::{format, print};

/// Every address observed since startup, accepted or not.
#[derive(Debug, Default)]
pub struct KnownSet {
    seen: HashSet<Ipv4Addr>,
}

impl KnownSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `hosts` and returns the alert hosts that were never seen before.
    pub fn observe<'a>(&mut self, hosts: &'a [Host]) -> Vec<&'a Host> {
        hosts
            .iter()
            .filter(|host| self.seen.insert(host.ip) && host.classification.is_alert())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

pub fn render(report: &ScanReport, known: &mut KnownSet, q_level: u8) {
    print::header(&format!("cycle {} · {}", report.cycle, report.range), q_level);

    if report.hosts.is_empty() {
        if q_level < 2 {
            print::no_data();
        }
    } else if q_level == 0 {
        for (idx, host) in report.hosts.iter().enumerate() {
            print::tree_head(idx, &host.ip.to_string());
            print::as_tree_one_level(format::host_details(host));
        }
    }

    for host in known.observe(&report.hosts) {
        warn!(ip = %host.ip, mac = %host.mac, "New unknown device on the network");
        ring_bell(&mut console::Term::stderr());
    }

    if q_level < 2 {
        print_summary(report);
    }
}

fn ring_bell<W: Write>(out: &mut W) {
    if let Err(e) = out.write_all(b"\x07").and_then(|()| out.flush()) {
        debug!(error = %e, "Could not ring the terminal bell");
    }
}

fn print_summary(report: &ScanReport) {
    let alerts = report.alerts().count();
    let total: ColoredString = format!("{} hosts", report.hosts.len()).bold();
    let accepted: ColoredString = format!("{} accepted", report.accepted_count()).green();
    let alert: ColoredString = match alerts {
        0 => format!("{alerts} alert").normal(),
        _ => format!("{alerts} alert").red().bold(),
    };
    let elapsed: ColoredString = format!("{:.2}s", report.elapsed.as_secs_f64()).yellow();

    print::fat_separator();
    print::centerln(&format!("{total} · {accepted} · {alert} in {elapsed}"));
}
