//! # Scan Scheduler
//!
//! Runs the discovery engine on a dedicated OS thread at a fixed cadence.
//!
//! Each cycle reloads the whitelist, sweeps the range, and hands the result to
//! a [`ScanSink`]. Cycles never overlap and are delivered in order.
//!
//! Shutdown is cooperative: [`ScanScheduler::stop`] flags the worker and waits
//! a bounded time for the in-flight cycle (sweep plus sleep) to finish. A worker
//! still busy after that bound is detached and its remaining output discarded.
//! A panicking sink costs that cycle's delivery only; the loop keeps going.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::sync::atomic::{AtomicU8, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use netradar_common::config::RadarConfig;
use netradar_common::network::host::{Host, ScanResult};
use netradar_common::network::range::TargetRange;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::discovery::{ArpTransport, DiscoveryEngine};
use crate::error::StartupError;
use crate::gateway::{GatewayResolver, RouteSource};
use crate::network::channel::DatalinkTransport;
use crate::whitelist::WhitelistStore;

const WORKER_NAME: &str = "netradar-scan";
const JOIN_POLL: Duration = Duration::from_millis(10);

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
    Stopped = 3,
}

impl SchedulerState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SchedulerState::Idle,
            1 => SchedulerState::Running,
            2 => SchedulerState::Stopping,
            _ => SchedulerState::Stopped,
        }
    }
}

impl fmt::Display for SchedulerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SchedulerState::Idle => "idle",
            SchedulerState::Running => "running",
            SchedulerState::Stopping => "stopping",
            SchedulerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// One completed cycle.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// 1-based, increasing by one per cycle.
    pub cycle: u64,
    pub range: TargetRange,
    pub hosts: ScanResult,
    pub elapsed: Duration,
}

impl ScanReport {
    pub fn alerts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.iter().filter(|h| h.classification.is_alert())
    }

    pub fn accepted_count(&self) -> usize {
        self.hosts.len() - self.alerts().count()
    }
}

/// Consumer of cycle results. Invoked on the worker thread, once per cycle.
pub trait ScanSink: Send + 'static {
    fn deliver(&mut self, report: &ScanReport);
}

impl<F> ScanSink for F
where
    F: FnMut(&[Host]) + Send + 'static,
{
    fn deliver(&mut self, report: &ScanReport) {
        self(&report.hosts)
    }
}

/// Forwards every report into a bounded channel owned by the consumer.
///
/// A full channel blocks the worker until the consumer catches up. Once the
/// receiver is dropped, reports are discarded.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::Sender<ScanReport>,
}

impl ChannelSink {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<ScanReport>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

impl ScanSink for ChannelSink {
    fn deliver(&mut self, report: &ScanReport) {
        if self.tx.blocking_send(report.clone()).is_err() {
            debug!(cycle = report.cycle, "Report receiver dropped, discarding result");
        }
    }
}

struct Shared {
    state: AtomicU8,
    /// Held across the "still attached?" check and the delivery that follows it.
    delivery: Mutex<()>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: AtomicU8::new(SchedulerState::Idle as u8),
            delivery: Mutex::new(()),
        }
    }

    fn delivery_lock(&self) -> MutexGuard<'_, ()> {
        self.delivery.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn state(&self) -> SchedulerState {
        SchedulerState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn set(&self, state: SchedulerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: SchedulerState, to: SchedulerState) -> Result<(), SchedulerState> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(SchedulerState::from_u8)
    }
}

struct Worker<T> {
    engine: DiscoveryEngine<T>,
    whitelist: WhitelistStore,
    sink: Box<dyn ScanSink>,
    range: TargetRange,
    interval: Duration,
}

/// Marks the scheduler stopped if the worker thread unwinds.
struct ExitGuard(Arc<Shared>);

impl Drop for ExitGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.set(SchedulerState::Stopped);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

impl<T: ArpTransport> Worker<T> {
    fn run(mut self, shared: Arc<Shared>) {
        let _guard = ExitGuard(Arc::clone(&shared));
        info!(range = %self.range, interval_ms = self.interval.as_millis() as u64, "Scan worker started");
        let mut cycle = 0u64;

        while shared.state() == SchedulerState::Running {
            cycle += 1;
            let started = Instant::now();
            let whitelist = self.whitelist.load();
            let hosts = self.engine.scan(&self.range, &whitelist);
            let report = ScanReport {
                cycle,
                range: self.range,
                hosts,
                elapsed: started.elapsed(),
            };

            {
                let _delivering = shared.delivery_lock();
                if shared.state() == SchedulerState::Stopped {
                    debug!(cycle, "Scheduler detached, discarding result");
                    break;
                }
                let sink = &mut self.sink;
                let delivered = panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(&report)));
                if let Err(payload) = delivered {
                    error!(
                        cycle,
                        panic = panic_message(payload.as_ref()),
                        "Scan sink panicked, result dropped"
                    );
                }
            }

            thread::sleep(self.interval);
        }

        let _ = shared.transition(SchedulerState::Stopping, SchedulerState::Stopped);
        debug!(cycles = cycle, "Scan worker exiting");
    }
}

/// Owns one background scan worker.
pub struct ScanScheduler<T = DatalinkTransport> {
    worker: Option<Worker<T>>,
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
    range: TargetRange,
    join_timeout: Duration,
}

impl ScanScheduler<DatalinkTransport> {
    /// Scheduler on the real datalink and the OS routing table.
    pub fn system(config: &RadarConfig, sink: impl ScanSink) -> Self {
        ScanScheduler::new(
            config,
            DiscoveryEngine::system(config),
            &GatewayResolver::new(),
            sink,
        )
    }
}

impl<T: ArpTransport + 'static> ScanScheduler<T> {
    /// Fixes the target range for the scheduler's lifetime; the resolver is only
    /// consulted when the configured target is `auto`.
    pub fn new<R: RouteSource>(
        config: &RadarConfig,
        engine: DiscoveryEngine<T>,
        resolver: &GatewayResolver<R>,
        sink: impl ScanSink,
    ) -> Self {
        let range = resolver.resolve(config.target);
        let worker = Worker {
            engine,
            whitelist: WhitelistStore::new(config.whitelist_path.clone()),
            sink: Box::new(sink),
            range,
            interval: config.scan_interval,
        };

        Self {
            worker: Some(worker),
            shared: Arc::new(Shared::new()),
            handle: None,
            range,
            join_timeout: config.join_timeout(),
        }
    }

    /// Launches the worker. Only valid once, from `Idle`.
    pub fn start(&mut self) -> Result<(), StartupError> {
        self.shared
            .transition(SchedulerState::Idle, SchedulerState::Running)
            .map_err(StartupError::InvalidState)?;

        let Some(worker) = self.worker.take() else {
            self.shared.set(SchedulerState::Stopped);
            return Err(StartupError::InvalidState(SchedulerState::Stopped));
        };

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(WORKER_NAME.into())
            .spawn(move || worker.run(shared));

        match spawned {
            Ok(handle) => {
                self.handle = Some(handle);
                Ok(())
            }
            Err(e) => {
                self.shared.set(SchedulerState::Stopped);
                Err(StartupError::Spawn(e))
            }
        }
    }
}

impl<T> ScanScheduler<T> {
    /// Requests shutdown and waits up to the join timeout for the worker.
    ///
    /// Safe in any state and idempotent. Once it returns, nothing more is
    /// delivered, even if the worker had to be left behind. A delivery already
    /// in progress at the join deadline is waited for.
    pub fn stop(&mut self) {
        match self.shared.state() {
            SchedulerState::Stopped => return,
            SchedulerState::Idle => {
                self.shared.set(SchedulerState::Stopped);
                self.worker = None;
                return;
            }
            SchedulerState::Running => {
                let _ = self
                    .shared
                    .transition(SchedulerState::Running, SchedulerState::Stopping);
                info!("Stopping scan worker");
            }
            SchedulerState::Stopping => {}
        }

        let Some(handle) = self.handle.take() else {
            self.shared.set(SchedulerState::Stopped);
            return;
        };

        let deadline = Instant::now() + self.join_timeout;
        while !handle.is_finished() && Instant::now() < deadline {
            thread::sleep(JOIN_POLL);
        }

        if handle.is_finished() {
            if handle.join().is_err() {
                error!("Scan worker panicked");
            } else {
                info!("Scan worker stopped");
            }
        } else {
            warn!(
                timeout_ms = self.join_timeout.as_millis() as u64,
                "Scan worker still busy after join timeout, detaching it"
            );
        }
        let _delivering = self.shared.delivery_lock();
        self.shared.set(SchedulerState::Stopped);
    }

    pub fn is_running(&self) -> bool {
        self.shared.state() == SchedulerState::Running
    }

    pub fn state(&self) -> SchedulerState {
        self.shared.state()
    }

    /// The range every cycle sweeps, fixed at construction.
    pub fn range(&self) -> TargetRange {
        self.range
    }
}

impl<T> Drop for ScanScheduler<T> {
    fn drop(&mut self) {
        self.stop();
    }
}
