use std::collections::BTreeMap;
use std::result::Result as StdResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, RecvTimeoutError, Sender};
use tracing::{debug, warn};

use crate::core::types::{BatteryState, DiskUsage, Metric, Pid, ProcessSnapshot, TerminateError};
use crate::core::{Result, SysmonError};
use crate::provider::MetricsProvider;

type Job<P> = Box<dyn FnOnce(&mut P) + Send + 'static>;
type Factory<P> = Arc<dyn Fn() -> P + Send + Sync + 'static>;

/// One sampler thread with its own provider instance.
struct Lane<P> {
    jobs: Sender<Job<P>>,
    busy: Arc<AtomicBool>,
    worker: JoinHandle<()>,
}

/// Bounds every sampling call by `timeout`.
///
/// Each metric category gets its own sampler thread and provider instance,
/// built by `factory` on first use, so a category stuck in the OS (a hung
/// network mount behind the disk sample, say) cannot delay the others.
/// While a lane is still busy with an earlier call, further calls for that
/// category return [`SysmonError::Timeout`] at once instead of queueing.
///
/// Termination requests bypass the lanes and run on the calling thread
/// against a local provider, so a reported kill outcome is always final.
///
/// Dropping this closes every lane; each thread exits once its current call
/// returns. Threads are not joined.
pub struct TimeoutProvider<P> {
    factory: Factory<P>,
    lanes: BTreeMap<Metric, Lane<P>>,
    local: P,
    timeout: Duration,
}

impl<P> TimeoutProvider<P>
where
    P: MetricsProvider + 'static,
{
    pub fn new<F>(factory: F, timeout: Duration) -> Self
    where
        F: Fn() -> P + Send + Sync + 'static,
    {
        let local = factory();
        Self {
            factory: Arc::new(factory),
            lanes: BTreeMap::new(),
            local,
            timeout,
        }
    }

    fn lane(&mut self, metric: Metric) -> Result<&Lane<P>> {
        if !self.lanes.contains_key(&metric) {
            let (tx, rx) = unbounded::<Job<P>>();
            let factory = Arc::clone(&self.factory);
            let worker = thread::Builder::new()
                .name(format!("pitop-{}", metric))
                .spawn(move || {
                    let mut provider = factory();
                    while let Ok(job) = rx.recv() {
                        job(&mut provider);
                    }
                })?;
            debug!(%metric, "sampler lane started");
            let lane = Lane {
                jobs: tx,
                busy: Arc::new(AtomicBool::new(false)),
                worker,
            };
            self.lanes.insert(metric, lane);
        }
        self.lanes.get(&metric).ok_or(SysmonError::SamplerGone)
    }

    fn call<R, F>(&mut self, metric: Metric, f: F) -> Result<R>
    where
        R: Send + 'static,
        F: FnOnce(&mut P) -> R + Send + 'static,
    {
        let timeout = self.timeout;
        let lane = self.lane(metric)?;
        if lane.busy.swap(true, Ordering::AcqRel) {
            if lane.worker.is_finished() {
                // Panicked mid-call; the next call starts a fresh lane.
                self.lanes.remove(&metric);
                return Err(SysmonError::SamplerGone);
            }
            debug!(%metric, "previous call still running");
            return Err(SysmonError::Timeout {
                metric,
                after: timeout,
            });
        }

        let busy = Arc::clone(&lane.busy);
        let (reply_tx, reply_rx) = bounded::<R>(1);
        let sent = lane.jobs.send(Box::new(move |provider: &mut P| {
            let value = f(provider);
            busy.store(false, Ordering::Release);
            let _ = reply_tx.send(value);
        }));
        if sent.is_err() {
            self.lanes.remove(&metric);
            return Err(SysmonError::SamplerGone);
        }

        match reply_rx.recv_timeout(timeout) {
            Ok(value) => Ok(value),
            Err(RecvTimeoutError::Timeout) => {
                warn!(%metric, ?timeout, "provider call timed out");
                Err(SysmonError::Timeout {
                    metric,
                    after: timeout,
                })
            }
            Err(RecvTimeoutError::Disconnected) => {
                self.lanes.remove(&metric);
                Err(SysmonError::SamplerGone)
            }
        }
    }
}

impl<P> MetricsProvider for TimeoutProvider<P>
where
    P: MetricsProvider + 'static,
{
    fn sample_cpu(&mut self) -> Result<f64> {
        self.call(Metric::Cpu, |p| p.sample_cpu())?
    }

    fn sample_memory(&mut self) -> Result<f64> {
        self.call(Metric::Memory, |p| p.sample_memory())?
    }

    fn sample_network_counters(&mut self) -> Result<(u64, u64)> {
        self.call(Metric::Network, |p| p.sample_network_counters())?
    }

    fn sample_battery(&mut self) -> Result<Option<BatteryState>> {
        self.call(Metric::Battery, |p| p.sample_battery())?
    }

    fn sample_disk_usage(&mut self) -> Result<Vec<DiskUsage>> {
        self.call(Metric::Disk, |p| p.sample_disk_usage())?
    }

    fn sample_uptime(&mut self) -> Result<u64> {
        self.call(Metric::Uptime, |p| p.sample_uptime())?
    }

    fn boot_time(&mut self) -> Result<u64> {
        self.call(Metric::Uptime, |p| p.boot_time())?
    }

    fn enumerate_processes(&mut self) -> Result<Vec<ProcessSnapshot>> {
        self.call(Metric::Processes, |p| p.enumerate_processes())?
    }

    fn terminate_process(&mut self, pid: Pid) -> StdResult<(), TerminateError> {
        self.local.terminate_process(pid)
    }
}
