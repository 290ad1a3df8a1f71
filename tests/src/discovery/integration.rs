use std::fs;
use std::net::Ipv4Addr;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use netradar_common::config::RadarConfig;
use netradar_common::network::host::{Classification, Host};
use netradar_core::{
    ChannelSink, DiscoveryEngine, GatewayResolver, ScanReport, ScanScheduler, SchedulerState,
};
use tokio::sync::mpsc::Receiver;

use crate::sim::{SimulatedLan, SimulatedTransport, StaticRoutes};

const WAIT: Duration = Duration::from_secs(5);

fn config(target: &str, whitelist: &Path) -> RadarConfig {
    RadarConfig {
        target: target.parse().unwrap(),
        scan_interval: Duration::from_millis(20),
        whitelist_path: whitelist.to_path_buf(),
        reply_timeout: Duration::from_millis(10),
        ..RadarConfig::default()
    }
}

fn scheduler(
    cfg: &RadarConfig,
    lan: &SimulatedLan,
    routes: StaticRoutes,
    sink: ChannelSink,
) -> ScanScheduler<SimulatedTransport> {
    ScanScheduler::new(
        cfg,
        DiscoveryEngine::new(lan.transport()).with_reply_timeout(cfg.reply_timeout),
        &GatewayResolver::with_source(routes),
        sink,
    )
}

fn next_report(rx: &mut Receiver<ScanReport>) -> ScanReport {
    let deadline = Instant::now() + WAIT;
    loop {
        match rx.try_recv() {
            Ok(report) => return report,
            Err(_) => {
                assert!(Instant::now() < deadline, "no report within {WAIT:?}");
                thread::sleep(Duration::from_millis(5));
            }
        }
    }
}

fn pairs(hosts: &[Host]) -> Vec<(Ipv4Addr, Classification)> {
    hosts.iter().map(|h| (h.ip, h.classification)).collect()
}

fn ip(last: u8) -> Ipv4Addr {
    Ipv4Addr::new(10, 0, 0, last)
}

#[test]
fn whitelist_edits_apply_from_the_next_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accepted_ips.txt");
    fs::write(&path, "10.0.0.2\n").unwrap();

    let lan = SimulatedLan::new();
    lan.add_device(ip(2)).add_device(ip(3));

    let (sink, mut rx) = ChannelSink::new(8);
    let mut s = scheduler(&config("10.0.0.0/24", &path), &lan, StaticRoutes(None), sink);
    s.start().unwrap();

    let first = next_report(&mut rx);
    assert_eq!(
        pairs(&first.hosts),
        vec![(ip(2), Classification::Accepted), (ip(3), Classification::Alert)]
    );

    fs::write(&path, "10.0.0.2\n10.0.0.3\n").unwrap();
    let mut updated = false;
    for _ in 0..50 {
        let report = next_report(&mut rx);
        if report.alerts().count() == 0 {
            assert_eq!(report.accepted_count(), 2);
            updated = true;
            break;
        }
    }
    assert!(updated, "whitelist edit never took effect");

    drop(rx);
    s.stop();
}

#[test]
fn missing_whitelist_marks_every_host_alert() {
    let dir = tempfile::tempdir().unwrap();
    let lan = SimulatedLan::new();
    lan.add_device(ip(1)).add_device(ip(9));

    let (sink, mut rx) = ChannelSink::new(8);
    let mut s = scheduler(
        &config("10.0.0.0/24", &dir.path().join("absent.txt")),
        &lan,
        StaticRoutes(None),
        sink,
    );
    s.start().unwrap();

    let report = next_report(&mut rx);
    assert_eq!(report.hosts.len(), 2);
    assert!(report.hosts.iter().all(|h| h.classification == Classification::Alert));
    assert!(report.hosts.iter().all(|h| h.display_label() == "ALERT - New/Unknown"));

    drop(rx);
    s.stop();
}

#[test]
fn undetectable_gateway_sweeps_the_fallback_range() {
    let dir = tempfile::tempdir().unwrap();
    let lan = SimulatedLan::new();
    lan.add_device(Ipv4Addr::new(192, 168, 1, 7))
        .add_device(Ipv4Addr::new(172, 16, 0, 4));

    let (sink, mut rx) = ChannelSink::new(8);
    let mut s = scheduler(
        &config("auto", &dir.path().join("absent.txt")),
        &lan,
        StaticRoutes(None),
        sink,
    );
    assert_eq!(s.range().to_string(), "192.168.1.0/24");
    s.start().unwrap();

    let report = next_report(&mut rx);
    assert_eq!(report.range.to_string(), "192.168.1.0/24");
    let ips: Vec<Ipv4Addr> = report.hosts.iter().map(|h| h.ip).collect();
    assert_eq!(ips, vec![Ipv4Addr::new(192, 168, 1, 7)]);

    drop(rx);
    s.stop();
}

#[test]
fn detected_gateway_sets_the_range() {
    let dir = tempfile::tempdir().unwrap();
    let (sink, _rx) = ChannelSink::new(1);
    let s = scheduler(
        &config("auto", &dir.path().join("absent.txt")),
        &SimulatedLan::new(),
        StaticRoutes(Some(Ipv4Addr::new(10, 0, 5, 1))),
        sink,
    );
    assert_eq!(s.range().to_string(), "10.0.5.0/24");
    assert_eq!(s.state(), SchedulerState::Idle);
}

#[test]
fn transport_outage_yields_empty_cycles_then_recovers() {
    let dir = tempfile::tempdir().unwrap();
    let lan = SimulatedLan::new();
    lan.add_device(ip(4));
    lan.set_failing(true);

    let (sink, mut rx) = ChannelSink::new(8);
    let mut s = scheduler(
        &config("10.0.0.0/24", &dir.path().join("absent.txt")),
        &lan,
        StaticRoutes(None),
        sink,
    );
    s.start().unwrap();

    let failed = next_report(&mut rx);
    assert!(failed.hosts.is_empty());
    assert!(s.is_running());

    lan.set_failing(false);
    let mut last_cycle = failed.cycle;
    let recovered = loop {
        let report = next_report(&mut rx);
        assert_eq!(report.cycle, last_cycle + 1);
        last_cycle = report.cycle;
        if !report.hosts.is_empty() {
            break report;
        }
    };
    assert_eq!(pairs(&recovered.hosts), vec![(ip(4), Classification::Alert)]);

    drop(rx);
    s.stop();
}

#[test]
fn steady_network_classifies_identically_each_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("accepted_ips.txt");
    fs::write(&path, "10.0.0.10\n").unwrap();

    let lan = SimulatedLan::new();
    lan.add_device(ip(10)).add_device(ip(11)).add_device(ip(12));

    let (sink, mut rx) = ChannelSink::new(8);
    let mut s = scheduler(&config("10.0.0.0/24", &path), &lan, StaticRoutes(None), sink);
    s.start().unwrap();

    let first = next_report(&mut rx);
    let second = next_report(&mut rx);
    assert_eq!(second.cycle, first.cycle + 1);

    let mut a = pairs(&first.hosts);
    let mut b = pairs(&second.hosts);
    a.sort();
    b.sort();
    assert_eq!(a, b);

    drop(rx);
    s.stop();
}

#[test]
fn nothing_is_delivered_after_stop_returns() {
    let dir = tempfile::tempdir().unwrap();
    let lan = SimulatedLan::new();
    lan.add_device(ip(8));

    let delivered = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&delivered);
    let mut s = ScanScheduler::new(
        &config("10.0.0.0/24", &dir.path().join("absent.txt")),
        DiscoveryEngine::new(lan.transport()),
        &GatewayResolver::with_source(StaticRoutes(None)),
        move |_: &[Host]| *counter.lock().unwrap() += 1,
    );
    s.start().unwrap();

    let deadline = Instant::now() + WAIT;
    while *delivered.lock().unwrap() < 2 {
        assert!(Instant::now() < deadline);
        thread::sleep(Duration::from_millis(5));
    }

    s.stop();
    s.stop();
    assert_eq!(s.state(), SchedulerState::Stopped);

    let at_stop = *delivered.lock().unwrap();
    let sweeps_at_stop = lan.sweeps();
    thread::sleep(Duration::from_millis(100));
    assert_eq!(*delivered.lock().unwrap(), at_stop);
    assert_eq!(lan.sweeps(), sweeps_at_stop);
}

#[tokio::test]
async fn reports_reach_an_async_consumer() {
    let dir = tempfile::tempdir().unwrap();
    let lan = SimulatedLan::new();
    lan.add_device(ip(30));

    let (sink, mut rx) = ChannelSink::new(2);
    let mut s = scheduler(
        &config("10.0.0.0/24", &dir.path().join("absent.txt")),
        &lan,
        StaticRoutes(None),
        sink,
    );
    s.start().unwrap();

    for expected in 1..=3u64 {
        let report = tokio::time::timeout(WAIT, rx.recv())
            .await
            .unwrap()
            .expect("worker alive");
        assert_eq!(report.cycle, expected);
        assert_eq!(report.hosts[0].ip, ip(30));
    }

    drop(rx);
    tokio::task::spawn_blocking(move || s.stop()).await.unwrap();
}

#[test]
fn device_leaving_the_network_disappears_from_results() {
    let dir = tempfile::tempdir().unwrap();
    let lan = SimulatedLan::new();
    lan.add_device(ip(20)).add_device(ip(21));

    let (sink, mut rx) = ChannelSink::new(8);
    let mut s = scheduler(
        &config("10.0.0.0/24", &dir.path().join("absent.txt")),
        &lan,
        StaticRoutes(None),
        sink,
    );
    s.start().unwrap();
    assert_eq!(next_report(&mut rx).hosts.len(), 2);

    lan.remove_device(ip(21));
    let mut gone = false;
    for _ in 0..50 {
        let report = next_report(&mut rx);
        if report.hosts.len() == 1 {
            assert_eq!(report.hosts[0].ip, ip(20));
            gone = true;
            break;
        }
    }
    assert!(gone);

    drop(rx);
    s.stop();
}
