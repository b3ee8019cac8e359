//! Everything a display needs to draw one frame, already formatted.

use chrono::{DateTime, Local};

use crate::core::types::{BatteryState, DiskUsage, Pid, ProcessSnapshot, SortState};

const NAME_WIDTH: usize = 23;
const USER_WIDTH: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRow {
    pub pid: Pid,
    pub name: String,
    pub user: String,
    pub cpu: String,
    pub mem: String,
}

impl From<&ProcessSnapshot> for ProcessRow {
    fn from(p: &ProcessSnapshot) -> Self {
        Self {
            pid: p.pid(),
            name: truncate(p.name(), NAME_WIDTH),
            user: truncate(p.owner(), USER_WIDTH),
            cpu: format!("{:.1}", p.cpu_percent()),
            mem: format!("{:.2}", p.memory_percent()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryLevel {
    High,
    Medium,
    Low,
    Unknown,
}

impl BatteryLevel {
    pub fn of(battery: Option<&BatteryState>) -> Self {
        match battery {
            None => BatteryLevel::Unknown,
            Some(b) if b.percent > 65.0 => BatteryLevel::High,
            Some(b) if b.percent > 20.0 => BatteryLevel::Medium,
            Some(_) => BatteryLevel::Low,
        }
    }
}

/// A complete, self-consistent dashboard frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewModel {
    pub cpu_percent: f64,
    pub cpu_history: Vec<f64>,
    pub memory_percent: f64,
    pub memory_history: Vec<f64>,
    pub network_sent_rate: f64,
    pub network_recv_rate: f64,
    pub network_sent_total: u64,
    pub network_recv_total: u64,
    pub battery: Option<BatteryState>,
    pub battery_label: String,
    pub battery_level: BatteryLevel,
    pub disk_usage_lines: Vec<String>,
    pub uptime_string: String,
    pub booted_at: Option<String>,
    pub process_rows: Vec<ProcessRow>,
    /// Processes matching the filter, before the row limit.
    pub process_matched: usize,
    /// Processes in the last scan.
    pub process_total: usize,
    pub active_filter_text: String,
    pub filter_editing: bool,
    pub active_sort: SortState,
    pub status_message: Option<String>,
    pub sampled_at: DateTime<Local>,
}

impl ViewModel {
    pub fn network_line(&self) -> String {
        format!(
            "↑ {} ({})  ↓ {} ({})",
            format_rate(self.network_sent_rate),
            format_bytes(self.network_sent_total),
            format_rate(self.network_recv_rate),
            format_bytes(self.network_recv_total),
        )
    }
}

pub fn battery_label(battery: Option<&BatteryState>) -> String {
    match battery {
        None => "⚡ No Battery Info".to_string(),
        Some(b) if b.charging => "🔌 Plugged In".to_string(),
        Some(b) => match b.seconds_remaining {
            Some(secs) => format!(
                "🔋 {:.0}% ({}:{:02} left)",
                b.percent,
                secs / 3600,
                secs % 3600 / 60
            ),
            None => format!("🔋 {:.0}%", b.percent),
        },
    }
}

pub fn disk_line(disk: &DiskUsage) -> String {
    format!(
        "{}: {:.1}% used ({} / {})",
        disk.mount_path,
        disk.used_percent(),
        format_bytes(disk.used_bytes),
        format_bytes(disk.total_bytes)
    )
}

/// `H:MM:SS`, prefixed with `N day(s), ` once past a day.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let h = seconds % 86_400 / 3_600;
    let m = seconds % 3_600 / 60;
    let s = seconds % 60;
    match days {
        0 => format!("{}:{:02}:{:02}", h, m, s),
        1 => format!("1 day, {}:{:02}:{:02}", h, m, s),
        d => format!("{} days, {}:{:02}:{:02}", d, h, m, s),
    }
}

pub fn format_booted_at(unix_secs: u64) -> Option<String> {
    let secs = i64::try_from(unix_secs).ok()?;
    let at = DateTime::from_timestamp(secs, 0)?;
    Some(at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
}

pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}

pub fn format_rate(bytes_per_sec: f64) -> String {
    format!("{}/s", format_bytes(bytes_per_sec.max(0.0).round() as u64))
}

/// `[||||      ]` style bar, `len` cells wide.
pub fn progress_bar(percent: f64, len: usize) -> String {
    let filled = ((len as f64 * percent.clamp(0.0, 100.0) / 100.0).round() as usize).min(len);
    format!("[{}{}]", "|".repeat(filled), " ".repeat(len - filled))
}

pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
