//! Settings file (TOML). Every key is optional.
//!
//! ```toml
//! fast_interval_ms = 1000
//! slow_interval_secs = 30
//! process_limit = 10
//!
//! [palette.header]
//! fg = "white"
//! bg = "blue"
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use ratatui::style::{Color, Style};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{Result, SysmonError};
use crate::history;
use crate::process_table;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Metric refresh cadence.
    pub fast_interval_ms: u64,
    /// Process re-scan cadence.
    pub slow_interval_secs: u64,
    /// Rows shown in the process table.
    pub process_limit: usize,
    /// Samples kept for the CPU and memory graphs.
    pub history_capacity: usize,
    /// Upper bound for a single provider call.
    pub sample_timeout_ms: u64,
    pub palette: Palette,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fast_interval_ms: 1_000,
            slow_interval_secs: 30,
            process_limit: process_table::DEFAULT_LIMIT,
            history_capacity: history::DEFAULT_CAPACITY,
            sample_timeout_ms: 750,
            palette: Palette::default(),
        }
    }
}

impl Config {
    /// Defaults when `path` is `None`, otherwise the parsed and validated file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)?;
        let config = Self::parse(&text)?;
        info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fast_interval_ms == 0 {
            return Err(SysmonError::Config("fast_interval_ms must be > 0".into()));
        }
        if self.slow_interval_secs == 0 {
            return Err(SysmonError::Config("slow_interval_secs must be > 0".into()));
        }
        if self.sample_timeout_ms == 0 {
            return Err(SysmonError::Config("sample_timeout_ms must be > 0".into()));
        }
        self.palette.resolve()?;
        Ok(())
    }

    pub fn fast_interval(&self) -> Duration {
        Duration::from_millis(self.fast_interval_ms)
    }

    pub fn slow_interval(&self) -> Duration {
        Duration::from_secs(self.slow_interval_secs)
    }

    pub fn sample_timeout(&self) -> Duration {
        Duration::from_millis(self.sample_timeout_ms)
    }
}

/// Foreground/background color names, as accepted by ratatui (`"white"`,
/// `"lightblue"`, `"#rrggbb"`, an ANSI index).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ColorPair {
    pub fg: String,
    #[serde(default)]
    pub bg: Option<String>,
}

impl ColorPair {
    fn new(fg: &str, bg: Option<&str>) -> Self {
        Self {
            fg: fg.to_string(),
            bg: bg.map(str::to_string),
        }
    }

    pub fn style(&self) -> Result<Style> {
        let mut style = Style::default().fg(parse_color(&self.fg)?);
        if let Some(bg) = &self.bg {
            style = style.bg(parse_color(bg)?);
        }
        Ok(style)
    }
}

fn parse_color(name: &str) -> Result<Color> {
    Color::from_str(name).map_err(|_| SysmonError::Config(format!("unknown color '{}'", name)))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub normal: ColorPair,
    pub header: ColorPair,
    pub highlighted: ColorPair,
    pub battery_high: ColorPair,
    pub battery_medium: ColorPair,
    pub battery_low: ColorPair,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            normal: ColorPair::new("white", None),
            header: ColorPair::new("white", Some("lightblue")),
            highlighted: ColorPair::new("black", Some("lightmagenta")),
            battery_high: ColorPair::new("green", None),
            battery_medium: ColorPair::new("yellow", None),
            battery_low: ColorPair::new("red", None),
        }
    }
}

impl Palette {
    pub fn resolve(&self) -> Result<Theme> {
        Ok(Theme {
            normal: self.normal.style()?,
            header: self.header.style()?,
            highlighted: self.highlighted.style()?,
            battery_high: self.battery_high.style()?,
            battery_medium: self.battery_medium.style()?,
            battery_low: self.battery_low.style()?,
        })
    }
}

/// Resolved palette, ready for rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub normal: Style,
    pub header: Style,
    pub highlighted: Style,
    pub battery_high: Style,
    pub battery_medium: Style,
    pub battery_low: Style,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn default_palette_resolves() {
        let theme = Palette::default().resolve().unwrap();
        assert_eq!(theme.header, Style::default().fg(Color::White).bg(Color::LightBlue));
        assert_eq!(theme.battery_low, Style::default().fg(Color::Red));
    }

    #[test]
    fn partial_file_overrides_some_keys() {
        let config = Config::parse(
            r##"
            slow_interval_secs = 10
            process_limit = 25

            [palette.header]
            fg = "black"
            bg = "#336699"
            "##,
        )
        .unwrap();
        assert_eq!(config.slow_interval(), Duration::from_secs(10));
        assert_eq!(config.process_limit, 25);
        assert_eq!(config.fast_interval_ms, 1_000);
        assert_eq!(
            config.palette.resolve().unwrap().header,
            Style::default().fg(Color::Black).bg(Color::Rgb(0x33, 0x66, 0x99))
        );
    }

    #[test]
    fn rejects_zero_interval_and_unknown_keys() {
        assert!(matches!(
            Config::parse("fast_interval_ms = 0"),
            Err(SysmonError::Config(_))
        ));
        assert!(matches!(
            Config::parse("refresh = 3"),
            Err(SysmonError::Config(_))
        ));
    }

    #[test]
    fn rejects_bad_color() {
        let err = Config::parse("[palette.normal]\nfg = \"not-a-colour\"").unwrap_err();
        assert!(err.to_string().contains("not-a-colour"));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pitop.toml");
        fs::write(&path, "history_capacity = 120\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.history_capacity, 120);
        assert!(Config::load(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(Config::load(None).unwrap(), Config::default());
    }
}
