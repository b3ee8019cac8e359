//! The refresh context: provider, trackers, process table and last-known
//! metrics, plus the tick bodies that mutate them.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use chrono::Local;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::types::{BatteryState, DiskUsage, KillResult, Metric, Pid, SortKey};
use crate::core::{Result, SysmonError};
use crate::history::HistoryBuffer;
use crate::process_table::{ProcessTable, RescanOutcome};
use crate::provider::MetricsProvider;
use crate::rate::RateTracker;
use crate::view_model::{
    battery_label, disk_line, format_booted_at, format_uptime, BatteryLevel, ProcessRow,
    ViewModel,
};

/// How long a status line message stays visible.
pub const STATUS_TTL: Duration = Duration::from_secs(5);

/// User-triggered mutations that publish immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Sort(SortKey),
    Filter(String),
    Kill(Pid),
    Rescan,
}

/// Last successfully sampled value of every metric category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LatestMetrics {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub sent_total: u64,
    pub recv_total: u64,
    pub battery: Option<BatteryState>,
    pub disks: Vec<DiskUsage>,
    pub uptime_secs: u64,
    pub boot_time: Option<u64>,
}

/// Per-category count of failed samples, plus the most recent error text.
#[derive(Debug, Default)]
pub struct FailureLog {
    counts: BTreeMap<Metric, u64>,
    last: Option<String>,
}

impl FailureLog {
    pub fn record(&mut self, metric: Metric, err: &SysmonError) {
        warn!(%metric, error = %err, "sampling failed");
        *self.counts.entry(metric).or_default() += 1;
        self.last = Some(err.to_string());
    }

    pub fn count(&self, metric: Metric) -> u64 {
        self.counts.get(&metric).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn last(&self) -> Option<&str> {
        self.last.as_deref()
    }
}

#[derive(Debug)]
struct StatusMessage {
    text: String,
    expires_at: Instant,
}

pub struct Monitor<P> {
    provider: P,
    network: RateTracker,
    cpu_history: HistoryBuffer,
    memory_history: HistoryBuffer,
    table: ProcessTable,
    latest: LatestMetrics,
    failures: FailureLog,
    status: Option<StatusMessage>,
}

impl<P: MetricsProvider> Monitor<P> {
    pub fn new(provider: P, config: &Config) -> Self {
        Self {
            provider,
            network: RateTracker::new(),
            cpu_history: HistoryBuffer::new(config.history_capacity),
            memory_history: HistoryBuffer::new(config.history_capacity),
            table: ProcessTable::new(config.process_limit),
            latest: LatestMetrics::default(),
            failures: FailureLog::default(),
            status: None,
        }
    }

    /// Build the monitor and take the synchronous first sample and scan.
    ///
    /// Fails when not a single metric category could be read.
    pub fn start(provider: P, config: &Config, now: Instant) -> Result<Self> {
        let mut monitor = Self::new(provider, config);
        match monitor.provider.boot_time() {
            Ok(t) => monitor.latest.boot_time = Some(t),
            Err(e) => debug!(error = %e, "boot time unavailable"),
        }
        let sampled = monitor.fast_tick(now);
        let scanned = monitor.slow_tick();
        if sampled == 0 && !scanned {
            let reason = monitor
                .failures
                .last()
                .unwrap_or("every metric source failed")
                .to_string();
            return Err(SysmonError::Startup(reason));
        }
        info!(
            sampled,
            processes = monitor.table.len(),
            "initial sample complete"
        );
        Ok(monitor)
    }

    /// Sample every fast metric category independently.
    ///
    /// A failed category keeps its previous value. Returns how many of CPU,
    /// memory, network, disk and uptime were read successfully.
    pub fn fast_tick(&mut self, now: Instant) -> usize {
        let mut ok = 0;

        match self.provider.sample_cpu() {
            Ok(cpu) => {
                self.latest.cpu_percent = cpu;
                self.cpu_history.append(cpu);
                ok += 1;
            }
            Err(e) => self.failures.record(Metric::Cpu, &e),
        }

        match self.provider.sample_memory() {
            Ok(mem) => {
                self.latest.memory_percent = mem;
                self.memory_history.append(mem);
                ok += 1;
            }
            Err(e) => self.failures.record(Metric::Memory, &e),
        }

        match self.provider.sample_network_counters() {
            Ok((sent, recv)) => {
                self.network.update(sent, recv, now);
                self.latest.sent_total = sent;
                self.latest.recv_total = recv;
                ok += 1;
            }
            Err(e) => self.failures.record(Metric::Network, &e),
        }

        match self.provider.sample_battery() {
            Ok(battery) => self.latest.battery = battery,
            Err(e) => self.failures.record(Metric::Battery, &e),
        }

        match self.provider.sample_disk_usage() {
            Ok(disks) => {
                self.latest.disks = disks;
                ok += 1;
            }
            Err(e) => self.failures.record(Metric::Disk, &e),
        }

        match self.provider.sample_uptime() {
            Ok(secs) => {
                self.latest.uptime_secs = secs;
                ok += 1;
            }
            Err(e) => self.failures.record(Metric::Uptime, &e),
        }

        ok
    }

    /// Replace the process list with a fresh enumeration.
    ///
    /// Returns `true` when the table now holds a new, non-empty scan.
    pub fn slow_tick(&mut self) -> bool {
        match self.provider.enumerate_processes() {
            Ok(list) => {
                let fresh = !list.is_empty();
                match self.table.rescan(list) {
                    RescanOutcome::Replaced => fresh,
                    RescanOutcome::IgnoredEmpty => {
                        self.failures.record(
                            Metric::Processes,
                            &SysmonError::Scan("enumeration returned no processes".into()),
                        );
                        false
                    }
                }
            }
            Err(e) => {
                self.failures.record(Metric::Processes, &e);
                false
            }
        }
    }

    pub fn apply(&mut self, action: Action, now: Instant) {
        match action {
            Action::Sort(key) => {
                self.table.set_sort(key);
                debug!(sort = %self.table.sort(), "sort changed");
            }
            Action::Filter(text) => {
                self.table.set_filter(&text);
                debug!(filter = %text, "filter changed");
            }
            Action::Kill(pid) => {
                let result = self.table.kill(pid, &mut self.provider);
                match &result {
                    KillResult::Terminated => info!(pid, "sent SIGTERM"),
                    other => warn!(pid, result = ?other, "kill failed"),
                }
                self.set_status(result.describe(pid), now);
            }
            Action::Rescan => {
                self.slow_tick();
            }
        }
    }

    pub fn set_status(&mut self, text: impl Into<String>, now: Instant) {
        self.status = Some(StatusMessage {
            text: text.into(),
            expires_at: now + STATUS_TTL,
        });
    }

    /// Compose a frame from the current state. Nothing here is cached.
    pub fn view_model(&self, now: Instant, filter_editing: bool) -> ViewModel {
        let (sent_rate, recv_rate) = self.network.last_rates();
        let view = self.table.view();
        let battery = self.latest.battery;
        ViewModel {
            cpu_percent: self.latest.cpu_percent,
            cpu_history: self.cpu_history.snapshot(),
            memory_percent: self.latest.memory_percent,
            memory_history: self.memory_history.snapshot(),
            network_sent_rate: sent_rate,
            network_recv_rate: recv_rate,
            network_sent_total: self.latest.sent_total,
            network_recv_total: self.latest.recv_total,
            battery,
            battery_label: battery_label(battery.as_ref()),
            battery_level: BatteryLevel::of(battery.as_ref()),
            disk_usage_lines: self.latest.disks.iter().map(disk_line).collect(),
            uptime_string: format_uptime(self.latest.uptime_secs),
            booted_at: self.latest.boot_time.and_then(format_booted_at),
            process_rows: view.rows.iter().map(ProcessRow::from).collect(),
            process_matched: view.matched,
            process_total: self.table.len(),
            active_filter_text: self.table.filter().to_string(),
            filter_editing,
            active_sort: self.table.sort(),
            status_message: self
                .status
                .as_ref()
                .filter(|s| s.expires_at > now)
                .map(|s| s.text.clone()),
            sampled_at: Local::now(),
        }
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn latest(&self) -> &LatestMetrics {
        &self.latest
    }

    pub fn failures(&self) -> &FailureLog {
        &self.failures
    }

    pub fn cpu_history(&self) -> &HistoryBuffer {
        &self.cpu_history
    }

    pub fn memory_history(&self) -> &HistoryBuffer {
        &self.memory_history
    }
}
