//! Read-only snapshot page: a plain-text summary redrawn on every publish.

use std::fmt::Write as _;
use std::io::Write;

use crossterm::{
    cursor::MoveTo,
    queue,
    terminal::{Clear, ClearType},
};

use crate::core::Result;
use crate::display::Display;
use crate::view_model::{progress_bar, ViewModel};

const BAR_LEN: usize = 20;

pub struct SnapshotDisplay<W: Write> {
    out: W,
}

impl<W: Write> SnapshotDisplay<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Display for SnapshotDisplay<W> {
    fn publish(&mut self, view: &ViewModel) -> Result<()> {
        queue!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        // Raw mode is on, so every line needs an explicit carriage return.
        for line in render_snapshot(view).lines() {
            write!(self.out, "{}\r\n", line)?;
        }
        self.out.flush()?;
        Ok(())
    }
}

pub fn render_snapshot(view: &ViewModel) -> String {
    let mut page = String::new();
    let _ = writeln!(
        page,
        "pitop system information ({})",
        view.sampled_at.format("%Y-%m-%d %H:%M:%S")
    );
    page.push('\n');
    let _ = writeln!(
        page,
        "CPU Usage: {:.1}%  {}",
        view.cpu_percent,
        progress_bar(view.cpu_percent, BAR_LEN)
    );
    let _ = writeln!(
        page,
        "RAM Usage: {:.1}%  {}",
        view.memory_percent,
        progress_bar(view.memory_percent, BAR_LEN)
    );

    page.push_str("\nDisk Usage:\n");
    if view.disk_usage_lines.is_empty() {
        page.push_str("  (unavailable)\n");
    }
    for line in &view.disk_usage_lines {
        let _ = writeln!(page, "  {}", line);
    }

    let _ = writeln!(page, "\nNetwork: {}", view.network_line());
    let _ = writeln!(page, "Battery: {}", view.battery_label);
    let _ = write!(page, "Uptime: {}", view.uptime_string);
    if let Some(booted) = &view.booted_at {
        let _ = write!(page, " (booted {})", booted);
    }
    page.push('\n');

    let _ = writeln!(page, "\nTop Processes ({}):", view.active_sort);
    let _ = writeln!(page, "  {:>8}  {:<23}  {:>6}  {:>7}", "PID", "Name", "CPU%", "Memory%");
    for row in &view.process_rows {
        let _ = writeln!(
            page,
            "  {:>8}  {:<23}  {:>6}  {:>7}",
            row.pid, row.name, row.cpu, row.mem
        );
    }
    page.push_str("\nPress q to quit.\n");
    page
}
