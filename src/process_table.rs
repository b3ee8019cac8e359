//! The process list state machine: authoritative scan, filter, sort, top-K.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::core::types::{
    KillResult, Pid, ProcessSnapshot, SortDirection, SortKey, SortState, TerminateError,
};
use crate::provider::MetricsProvider;

pub const DEFAULT_LIMIT: usize = 10;

/// Rows currently shown, in display order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessView {
    pub rows: Vec<ProcessSnapshot>,
    /// Rows that passed the filter before truncation to the limit.
    pub matched: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RescanOutcome {
    Replaced,
    /// Empty scan over a non-empty table; the previous list was kept.
    IgnoredEmpty,
}

/// Owns the last full process scan and derives the visible view from it.
///
/// The view is recomputed eagerly on every mutation so [`ProcessTable::view`]
/// is a plain read.
#[derive(Debug)]
pub struct ProcessTable {
    processes: Vec<ProcessSnapshot>,
    filter: String,
    needle: String,
    sort: SortState,
    limit: usize,
    view: ProcessView,
}

impl ProcessTable {
    pub fn new(limit: usize) -> Self {
        Self {
            processes: Vec::new(),
            filter: String::new(),
            needle: String::new(),
            sort: SortState::default(),
            limit,
            view: ProcessView::default(),
        }
    }

    pub fn rescan(&mut self, snapshots: Vec<ProcessSnapshot>) -> RescanOutcome {
        if snapshots.is_empty() && !self.processes.is_empty() {
            info!(
                kept = self.processes.len(),
                "process scan returned nothing; keeping previous list"
            );
            return RescanOutcome::IgnoredEmpty;
        }
        debug!(count = snapshots.len(), "process list replaced");
        self.processes = snapshots;
        self.recompute();
        RescanOutcome::Replaced
    }

    pub fn set_filter(&mut self, text: &str) {
        if text == self.filter {
            return;
        }
        self.filter = text.to_string();
        self.needle = text.to_lowercase();
        self.recompute();
    }

    pub fn set_sort(&mut self, key: SortKey) {
        self.sort = self.sort.apply(key);
        self.recompute();
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.recompute();
    }

    pub fn view(&self) -> &ProcessView {
        &self.view
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Size of the authoritative list.
    pub fn len(&self) -> usize {
        self.processes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processes.is_empty()
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.processes.iter().any(|p| p.pid() == pid)
    }

    /// Request termination of `pid`.
    ///
    /// The row stays in the table until the next rescan drops it.
    pub fn kill<P>(&self, pid: Pid, provider: &mut P) -> KillResult
    where
        P: MetricsProvider + ?Sized,
    {
        if !self.contains(pid) {
            return KillResult::NotFound;
        }
        match provider.terminate_process(pid) {
            Ok(()) => KillResult::Terminated,
            Err(TerminateError::NotFound) => KillResult::NotFound,
            Err(TerminateError::PermissionDenied) => KillResult::PermissionDenied,
            Err(TerminateError::Other(reason)) => KillResult::Failed(reason),
        }
    }

    fn recompute(&mut self) {
        let needle = self.needle.as_str();
        let mut rows: Vec<ProcessSnapshot> = self
            .processes
            .iter()
            .filter(|p| needle.is_empty() || p.name().to_lowercase().contains(needle))
            .cloned()
            .collect();
        let matched = rows.len();

        let sort = self.sort;
        let cmp = |a: &ProcessSnapshot, b: &ProcessSnapshot| compare(sort, a, b);
        if self.limit == 0 {
            rows.clear();
        } else if rows.len() > self.limit {
            rows.select_nth_unstable_by(self.limit - 1, cmp);
            rows.truncate(self.limit);
        }
        rows.sort_by(cmp);

        self.view = ProcessView { rows, matched };
    }
}

impl Default for ProcessTable {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT)
    }
}

/// Active key in the active direction, then pid ascending.
fn compare(sort: SortState, a: &ProcessSnapshot, b: &ProcessSnapshot) -> Ordering {
    let primary = match sort.key {
        SortKey::Cpu => a.cpu_percent().total_cmp(&b.cpu_percent()),
        SortKey::Memory => a.memory_percent().total_cmp(&b.memory_percent()),
        SortKey::Pid => a.pid().cmp(&b.pid()),
    };
    let primary = match sort.direction {
        SortDirection::Ascending => primary,
        SortDirection::Descending => primary.reverse(),
    };
    primary.then_with(|| a.pid().cmp(&b.pid()))
}
