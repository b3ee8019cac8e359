use std::path::PathBuf;
use std::result::Result as StdResult;

use sysinfo::{Disks, Networks, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};
use tracing::debug;

use crate::core::types::{BatteryState, DiskUsage, Metric, Pid, ProcessSnapshot, TerminateError};
use crate::core::{Result, SysmonError};
use crate::provider::{read_battery, MetricsProvider};

const POWER_SUPPLY_ROOT: &str = "/sys/class/power_supply";

/// Collects metrics from the underlying OS through `sysinfo`.
///
/// Construction touches nothing but the CPU counters; every other source is
/// read on first use, so instances are cheap to create per sampler lane.
pub struct SysinfoProvider {
    sys: System,
    networks: Networks,
    disks: Disks,
    power_supply: PathBuf,
}

impl SysinfoProvider {
    /// Creates a new provider instance.
    pub fn new() -> Self {
        let mut sys = System::new();
        // Prime the CPU counters so the first real sample has a delta to work with.
        sys.refresh_cpu_usage();
        Self {
            sys,
            networks: Networks::new(),
            disks: Disks::new(),
            power_supply: PathBuf::from(POWER_SUPPLY_ROOT),
        }
    }

    fn memory_totals(&mut self) -> Result<(u64, u64)> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(SysmonError::sampling(Metric::Memory, "total memory reported as 0"));
        }
        Ok((self.sys.used_memory(), total))
    }
}

impl Default for SysinfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsProvider for SysinfoProvider {
    fn sample_cpu(&mut self) -> Result<f64> {
        self.sys.refresh_cpu_usage();
        if self.sys.cpus().is_empty() {
            return Err(SysmonError::sampling(Metric::Cpu, "no CPUs reported"));
        }
        Ok(self.sys.global_cpu_usage() as f64)
    }

    fn sample_memory(&mut self) -> Result<f64> {
        let (used, total) = self.memory_totals()?;
        Ok(used as f64 / total as f64 * 100.0)
    }

    fn sample_network_counters(&mut self) -> Result<(u64, u64)> {
        self.networks.refresh(true);
        let mut sent = 0u64;
        let mut recv = 0u64;
        for data in self.networks.list().values() {
            sent = sent.saturating_add(data.total_transmitted());
            recv = recv.saturating_add(data.total_received());
        }
        Ok((sent, recv))
    }

    fn sample_battery(&mut self) -> Result<Option<BatteryState>> {
        Ok(read_battery(&self.power_supply))
    }

    fn sample_disk_usage(&mut self) -> Result<Vec<DiskUsage>> {
        self.disks.refresh(true);
        let usage = self
            .disks
            .list()
            .iter()
            .filter(|disk| disk.total_space() > 0)
            .map(|disk| DiskUsage {
                mount_path: disk.mount_point().display().to_string(),
                used_bytes: disk.total_space().saturating_sub(disk.available_space()),
                total_bytes: disk.total_space(),
            })
            .collect();
        Ok(usage)
    }

    fn sample_uptime(&mut self) -> Result<u64> {
        Ok(System::uptime())
    }

    fn boot_time(&mut self) -> Result<u64> {
        match System::boot_time() {
            0 => Err(SysmonError::sampling(Metric::Uptime, "boot time unavailable")),
            t => Ok(t),
        }
    }

    fn enumerate_processes(&mut self) -> Result<Vec<ProcessSnapshot>> {
        let (_, total_memory) = self
            .memory_totals()
            .map_err(|e| SysmonError::Scan(e.to_string()))?;
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing()
                .with_cpu()
                .with_memory()
                .with_user(UpdateKind::OnlyIfNotSet),
        );
        let users = Users::new_with_refreshed_list();

        let processes: Vec<ProcessSnapshot> = self
            .sys
            .processes()
            .iter()
            .map(|(pid, process)| {
                let owner = process
                    .user_id()
                    .and_then(|uid| users.get_user_by_id(uid))
                    .map(|user| user.name().to_string())
                    .unwrap_or_default();
                ProcessSnapshot::new(
                    pid.as_u32(),
                    process.name().to_string_lossy().into_owned(),
                    owner,
                    process.cpu_usage() as f64,
                    process.memory() as f64 / total_memory as f64 * 100.0,
                )
            })
            .collect();
        debug!(count = processes.len(), "enumerated processes");
        Ok(processes)
    }

    #[cfg(unix)]
    fn terminate_process(&mut self, pid: Pid) -> StdResult<(), TerminateError> {
        use nix::errno::Errno;
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid as NixPid;

        // pid 0 would signal our own process group.
        let raw = match i32::try_from(pid) {
            Ok(raw) if raw > 0 => raw,
            _ => return Err(TerminateError::NotFound),
        };
        match kill(NixPid::from_raw(raw), Signal::SIGTERM) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => Err(TerminateError::NotFound),
            Err(Errno::EPERM) => Err(TerminateError::PermissionDenied),
            Err(e) => Err(TerminateError::Other(e.to_string())),
        }
    }

    #[cfg(not(unix))]
    fn terminate_process(&mut self, pid: Pid) -> StdResult<(), TerminateError> {
        let target = sysinfo::Pid::from_u32(pid);
        self.sys.refresh_processes(ProcessesToUpdate::Some(&[target]), true);
        let Some(process) = self.sys.process(target) else {
            return Err(TerminateError::NotFound);
        };
        match process.kill_with(sysinfo::Signal::Term) {
            Some(true) => Ok(()),
            Some(false) => Err(TerminateError::PermissionDenied),
            None if process.kill() => Ok(()),
            None => Err(TerminateError::Other("termination refused".to_string())),
        }
    }
}
