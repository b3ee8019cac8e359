use std::fs;
use std::path::Path;

use crate::core::types::BatteryState;

/// Read the first battery under `root` (normally `/sys/class/power_supply`).
///
/// Returns `None` when no `BAT*` entry with a readable capacity exists.
pub fn read_battery(root: &Path) -> Option<BatteryState> {
    for i in 0..4 {
        let bat = root.join(format!("BAT{i}"));
        if !bat.exists() {
            continue;
        }

        let Some(capacity) = read_u64(&bat.join("capacity")) else {
            continue;
        };

        let status = fs::read_to_string(bat.join("status"))
            .map(|s| s.trim().to_string())
            .unwrap_or_else(|_| "Unknown".to_string());
        let charging = matches!(status.as_str(), "Charging" | "Full" | "Not charging");

        // energy_* (µWh / µW) or charge_* (µAh / µA), whichever the driver exposes.
        let now = read_u64(&bat.join("energy_now")).or_else(|| read_u64(&bat.join("charge_now")));
        let rate = read_u64(&bat.join("power_now")).or_else(|| read_u64(&bat.join("current_now")));
        let seconds_remaining = match (now, rate, status.as_str()) {
            (Some(now), Some(rate), "Discharging") if rate > 0 => Some(now * 3600 / rate),
            _ => None,
        };

        return Some(BatteryState {
            percent: capacity.min(100) as f64,
            charging,
            seconds_remaining,
        });
    }
    None
}

fn read_u64(path: &Path) -> Option<u64> {
    fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().parse::<u64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, value: &str) {
        fs::write(dir.join(name), value).unwrap();
    }

    #[test]
    fn no_battery_directory() {
        let root = tempfile::tempdir().unwrap();
        assert_eq!(read_battery(root.path()), None);
    }

    #[test]
    fn discharging_battery_reports_time_left() {
        let root = tempfile::tempdir().unwrap();
        let bat = root.path().join("BAT0");
        fs::create_dir(&bat).unwrap();
        write(&bat, "capacity", "42\n");
        write(&bat, "status", "Discharging\n");
        write(&bat, "energy_now", "20000000\n");
        write(&bat, "power_now", "10000000\n");

        let state = read_battery(root.path()).unwrap();
        assert_eq!(state.percent, 42.0);
        assert!(!state.charging);
        assert_eq!(state.seconds_remaining, Some(7200));
    }

    #[test]
    fn charging_battery_on_second_slot() {
        let root = tempfile::tempdir().unwrap();
        let bat = root.path().join("BAT1");
        fs::create_dir(&bat).unwrap();
        write(&bat, "capacity", "97");
        write(&bat, "status", "Charging");

        let state = read_battery(root.path()).unwrap();
        assert!(state.charging);
        assert_eq!(state.seconds_remaining, None);
    }
}
