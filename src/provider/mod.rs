//! Host metric acquisition.
//!
//! [`MetricsProvider`] is the boundary between the refresh core and the OS.
//! [`SysinfoProvider`] is the real implementation; [`TimeoutProvider`] wraps
//! any provider so a hung call cannot stall the event loop.

mod battery;
mod sysinfo_provider;
mod timeout;

pub use battery::read_battery;
pub use sysinfo_provider::SysinfoProvider;
pub use timeout::TimeoutProvider;

use std::result::Result as StdResult;

use crate::core::types::{BatteryState, DiskUsage, Pid, ProcessSnapshot, TerminateError};
use crate::core::Result;

/// Raw samples consumed by the monitor.
pub trait MetricsProvider {
    /// Global CPU usage in percent.
    fn sample_cpu(&mut self) -> Result<f64>;

    /// Used memory in percent of total.
    fn sample_memory(&mut self) -> Result<f64>;

    /// Cumulative `(sent, received)` bytes over all interfaces.
    fn sample_network_counters(&mut self) -> Result<(u64, u64)>;

    /// `Ok(None)` means the host has no battery.
    fn sample_battery(&mut self) -> Result<Option<BatteryState>>;

    fn sample_disk_usage(&mut self) -> Result<Vec<DiskUsage>>;

    /// Seconds since boot.
    fn sample_uptime(&mut self) -> Result<u64>;

    /// Boot time as unix seconds.
    fn boot_time(&mut self) -> Result<u64>;

    fn enumerate_processes(&mut self) -> Result<Vec<ProcessSnapshot>>;

    /// Ask the process to terminate (SIGTERM on unix).
    fn terminate_process(&mut self, pid: Pid) -> StdResult<(), TerminateError>;
}

impl<P: MetricsProvider + ?Sized> MetricsProvider for Box<P> {
    fn sample_cpu(&mut self) -> Result<f64> {
        (**self).sample_cpu()
    }

    fn sample_memory(&mut self) -> Result<f64> {
        (**self).sample_memory()
    }

    fn sample_network_counters(&mut self) -> Result<(u64, u64)> {
        (**self).sample_network_counters()
    }

    fn sample_battery(&mut self) -> Result<Option<BatteryState>> {
        (**self).sample_battery()
    }

    fn sample_disk_usage(&mut self) -> Result<Vec<DiskUsage>> {
        (**self).sample_disk_usage()
    }

    fn sample_uptime(&mut self) -> Result<u64> {
        (**self).sample_uptime()
    }

    fn boot_time(&mut self) -> Result<u64> {
        (**self).boot_time()
    }

    fn enumerate_processes(&mut self) -> Result<Vec<ProcessSnapshot>> {
        (**self).enumerate_processes()
    }

    fn terminate_process(&mut self, pid: Pid) -> StdResult<(), TerminateError> {
        (**self).terminate_process(pid)
    }
}
