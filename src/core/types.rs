use std::fmt;

/// Longest process name kept in a snapshot.
pub const MAX_NAME_LEN: usize = 255;

pub type Pid = u32;

/// Metric categories, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Metric {
    Cpu,
    Memory,
    Network,
    Battery,
    Disk,
    Uptime,
    Processes,
    Terminate,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Metric::Cpu => "cpu",
            Metric::Memory => "memory",
            Metric::Network => "network",
            Metric::Battery => "battery",
            Metric::Disk => "disk",
            Metric::Uptime => "uptime",
            Metric::Processes => "processes",
            Metric::Terminate => "terminate",
        };
        f.write_str(name)
    }
}

/// Snapshot of a single process, taken during a scan.
///
/// Values coming from the provider are sanitized on construction so the rest
/// of the crate never sees NaN, negative or unbounded percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessSnapshot {
    pid: Pid,
    name: String,
    owner: String,
    cpu_percent: f64,
    memory_percent: f64,
}

impl ProcessSnapshot {
    pub fn new(
        pid: Pid,
        name: impl Into<String>,
        owner: impl Into<String>,
        cpu_percent: f64,
        memory_percent: f64,
    ) -> Self {
        let mut name: String = name.into();
        if name.is_empty() {
            name = "<unknown>".to_string();
        } else if name.chars().count() > MAX_NAME_LEN {
            name = name.chars().take(MAX_NAME_LEN).collect();
        }
        let mut owner: String = owner.into();
        if owner.is_empty() {
            owner = "?".to_string();
        }
        Self {
            pid,
            name,
            owner,
            cpu_percent: non_negative(cpu_percent),
            memory_percent: non_negative(memory_percent).min(100.0),
        }
    }

    pub fn pid(&self) -> Pid {
        self.pid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn cpu_percent(&self) -> f64 {
        self.cpu_percent
    }

    pub fn memory_percent(&self) -> f64 {
        self.memory_percent
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Column the process list is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Cpu,
    Memory,
    Pid,
}

impl SortKey {
    pub fn label(self) -> &'static str {
        match self {
            SortKey::Cpu => "CPU%",
            SortKey::Memory => "Mem%",
            SortKey::Pid => "PID",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Active sort column and direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    /// Same key flips the direction, a different key starts descending.
    pub fn apply(self, key: SortKey) -> Self {
        if key == self.key {
            SortState {
                key,
                direction: self.direction.flipped(),
            }
        } else {
            SortState {
                key,
                direction: SortDirection::Descending,
            }
        }
    }
}

impl Default for SortState {
    fn default() -> Self {
        SortState {
            key: SortKey::Cpu,
            direction: SortDirection::Descending,
        }
    }
}

impl fmt::Display for SortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.direction {
            SortDirection::Ascending => '▲',
            SortDirection::Descending => '▼',
        };
        write!(f, "{} {}", self.key.label(), arrow)
    }
}

/// Battery charge and power source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatteryState {
    pub percent: f64,
    /// External power is connected.
    pub charging: bool,
    pub seconds_remaining: Option<u64>,
}

/// Usage of one mounted partition, in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiskUsage {
    pub mount_path: String,
    pub used_bytes: u64,
    pub total_bytes: u64,
}

impl DiskUsage {
    pub fn used_percent(&self) -> f64 {
        if self.total_bytes == 0 {
            return 0.0;
        }
        self.used_bytes as f64 / self.total_bytes as f64 * 100.0
    }
}

/// Why a termination request was refused by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateError {
    NotFound,
    PermissionDenied,
    Other(String),
}

impl fmt::Display for TerminateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TerminateError::NotFound => f.write_str("no such process"),
            TerminateError::PermissionDenied => f.write_str("permission denied"),
            TerminateError::Other(reason) => f.write_str(reason),
        }
    }
}

/// Outcome of a kill request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillResult {
    Terminated,
    NotFound,
    PermissionDenied,
    Failed(String),
}

impl KillResult {
    /// Short user-facing description for the status line.
    pub fn describe(&self, pid: Pid) -> String {
        match self {
            KillResult::Terminated => format!("Sent SIGTERM to PID {}", pid),
            KillResult::NotFound => format!("PID {} no longer exists", pid),
            KillResult::PermissionDenied => format!("Permission denied killing PID {}", pid),
            KillResult::Failed(reason) => format!("Could not kill PID {}: {}", pid, reason),
        }
    }
}
