//! Rendering side of the loop.
//!
//! A [`Display`] receives fully composed [`ViewModel`]s and never reaches back
//! into monitor state. Row focus is local to the display.

mod snapshot;
mod tui;

pub use snapshot::{render_snapshot, SnapshotDisplay};
pub use tui::{draw_dashboard, TerminalGuard, TuiDisplay};

use crate::core::types::Pid;
use crate::core::Result;
use crate::view_model::{ProcessRow, ViewModel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

pub trait Display {
    fn publish(&mut self, view: &ViewModel) -> Result<()>;

    fn navigate(&mut self, _nav: Navigation) -> Result<()> {
        Ok(())
    }

    fn focused_pid(&self) -> Option<Pid> {
        None
    }
}

/// Selected row index within the published process rows.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Focus {
    selected: usize,
}

impl Focus {
    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn navigate(&mut self, nav: Navigation, len: usize, page: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = len - 1;
        let page = page.max(1);
        self.selected = match nav {
            Navigation::Up => self.selected.saturating_sub(1),
            Navigation::Down => (self.selected + 1).min(last),
            Navigation::PageUp => self.selected.saturating_sub(page),
            Navigation::PageDown => (self.selected + page).min(last),
            Navigation::Home => 0,
            Navigation::End => last,
        };
    }

    /// Keep focus on `pid` if it is still listed, otherwise clamp in range.
    pub fn follow(&mut self, pid: Option<Pid>, rows: &[ProcessRow]) {
        if let Some(idx) = pid.and_then(|pid| rows.iter().position(|r| r.pid == pid)) {
            self.selected = idx;
        } else if rows.is_empty() {
            self.selected = 0;
        } else {
            self.selected = self.selected.min(rows.len() - 1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pid: Pid) -> ProcessRow {
        ProcessRow {
            pid,
            name: format!("p{}", pid),
            user: "root".into(),
            cpu: "0.0".into(),
            mem: "0.00".into(),
        }
    }

    #[test]
    fn navigation_stays_in_bounds() {
        let mut f = Focus::default();
        f.navigate(Navigation::Up, 5, 2);
        assert_eq!(f.selected(), 0);
        f.navigate(Navigation::PageDown, 5, 3);
        assert_eq!(f.selected(), 3);
        f.navigate(Navigation::PageDown, 5, 3);
        assert_eq!(f.selected(), 4);
        f.navigate(Navigation::Home, 5, 3);
        assert_eq!(f.selected(), 0);
        f.navigate(Navigation::End, 0, 3);
        assert_eq!(f.selected(), 0);
    }

    #[test]
    fn focus_follows_pid_across_reorder() {
        let mut f = Focus::default();
        f.navigate(Navigation::Down, 3, 1);
        let before = [row(1), row(2), row(3)];
        let pid = Some(before[f.selected()].pid);
        f.follow(pid, &[row(3), row(1), row(2)]);
        assert_eq!(f.selected(), 2);
    }

    #[test]
    fn focus_clamps_when_pid_gone() {
        let mut f = Focus::default();
        f.navigate(Navigation::End, 10, 1);
        f.follow(Some(99), &[row(1), row(2)]);
        assert_eq!(f.selected(), 1);
        f.follow(None, &[]);
        assert_eq!(f.selected(), 0);
    }
}
