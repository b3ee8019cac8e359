//! Periodic task bookkeeping for the refresh loop.
//!
//! The scheduler never sleeps or spawns anything itself. The app loop asks it
//! how long to wait ([`RefreshScheduler::time_until_next`]), waits for input
//! up to that long, then collects whatever became due
//! ([`RefreshScheduler::take_due`]). Time comes from a [`Clock`], so tests can
//! drive it with a [`ManualClock`].

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

pub trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Virtual clock that only moves when told to. Clones share the same time.
#[derive(Debug, Clone)]
pub struct ManualClock {
    origin: Instant,
    offset: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Rc::new(Cell::new(Duration::ZERO)),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.offset.set(self.offset.get() + by);
    }

    /// Time elapsed since the clock was created.
    pub fn elapsed(&self) -> Duration {
        self.offset.get()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + self.offset.get()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// CPU, memory, network, battery, disk, uptime.
    Fast,
    /// Full process re-scan.
    Slow,
}

#[derive(Debug, Clone)]
struct PeriodicTask {
    kind: TaskKind,
    interval: Duration,
    next_due: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Running,
    Stopped,
}

#[derive(Debug)]
pub struct RefreshScheduler {
    intervals: Vec<(TaskKind, Duration)>,
    tasks: Vec<PeriodicTask>,
    state: State,
}

impl RefreshScheduler {
    pub fn new(fast: Duration, slow: Duration) -> Self {
        Self {
            intervals: vec![(TaskKind::Fast, fast), (TaskKind::Slow, slow)],
            tasks: Vec::new(),
            state: State::Idle,
        }
    }

    /// Arm every task one interval after `now`.
    ///
    /// The caller is expected to have done the initial sample itself.
    pub fn start(&mut self, now: Instant) {
        if self.state != State::Idle {
            return;
        }
        self.tasks = self
            .intervals
            .iter()
            .map(|&(kind, interval)| PeriodicTask {
                kind,
                interval,
                next_due: now + interval,
            })
            .collect();
        self.state = State::Running;
    }

    pub fn is_running(&self) -> bool {
        self.state == State::Running
    }

    /// Tasks due at `now`, fast before slow, each re-armed for its next run.
    ///
    /// A task that fell more than one interval behind is re-armed relative to
    /// `now`; missed runs are dropped rather than replayed.
    pub fn take_due(&mut self, now: Instant) -> Vec<TaskKind> {
        let mut due = Vec::new();
        for task in &mut self.tasks {
            if task.next_due > now {
                continue;
            }
            due.push(task.kind);
            task.next_due += task.interval;
            if task.next_due <= now {
                debug!(kind = ?task.kind, "scheduler fell behind; skipping missed ticks");
                task.next_due = now + task.interval;
            }
        }
        due
    }

    /// How long the loop may block before the next task is due.
    ///
    /// `None` once stopped (or before start): there is nothing to wait for.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.tasks
            .iter()
            .map(|t| t.next_due.saturating_duration_since(now))
            .min()
    }

    /// Cancel every task. No further work will ever be reported as due.
    pub fn shutdown(&mut self) {
        self.tasks.clear();
        self.state = State::Stopped;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn nothing_due_before_first_interval() {
        let clock = ManualClock::new();
        let mut s = RefreshScheduler::new(secs(1), secs(30));
        s.start(clock.now());
        assert!(s.take_due(clock.now()).is_empty());
        assert_eq!(s.time_until_next(clock.now()), Some(secs(1)));
    }

    #[test]
    fn fast_and_slow_cadences() {
        let clock = ManualClock::new();
        let mut s = RefreshScheduler::new(secs(1), secs(30));
        s.start(clock.now());

        let mut fast = 0;
        let mut slow = 0;
        for _ in 0..60 {
            clock.advance(secs(1));
            for kind in s.take_due(clock.now()) {
                match kind {
                    TaskKind::Fast => fast += 1,
                    TaskKind::Slow => slow += 1,
                }
            }
        }
        assert_eq!(fast, 60);
        assert_eq!(slow, 2);
    }

    #[test]
    fn both_due_reports_fast_first() {
        let clock = ManualClock::new();
        let mut s = RefreshScheduler::new(secs(2), secs(2));
        s.start(clock.now());
        clock.advance(secs(2));
        assert_eq!(s.take_due(clock.now()), vec![TaskKind::Fast, TaskKind::Slow]);
    }

    #[test]
    fn falling_behind_skips_missed_ticks() {
        let clock = ManualClock::new();
        let mut s = RefreshScheduler::new(secs(1), secs(30));
        s.start(clock.now());
        clock.advance(Duration::from_millis(5_500));
        assert_eq!(s.take_due(clock.now()), vec![TaskKind::Fast]);
        assert!(s.take_due(clock.now()).is_empty());
        assert_eq!(s.time_until_next(clock.now()), Some(secs(1)));
    }

    #[test]
    fn small_delay_keeps_original_phase() {
        let clock = ManualClock::new();
        let mut s = RefreshScheduler::new(secs(1), secs(30));
        s.start(clock.now());
        clock.advance(Duration::from_millis(1_200));
        assert_eq!(s.take_due(clock.now()), vec![TaskKind::Fast]);
        assert_eq!(
            s.time_until_next(clock.now()),
            Some(Duration::from_millis(800))
        );
    }

    #[test]
    fn shutdown_cancels_everything() {
        let clock = ManualClock::new();
        let mut s = RefreshScheduler::new(secs(1), secs(30));
        s.start(clock.now());
        assert!(s.is_running());
        s.shutdown();
        assert!(!s.is_running());
        clock.advance(secs(120));
        assert!(s.take_due(clock.now()).is_empty());
        assert_eq!(s.time_until_next(clock.now()), None);

        // A stopped scheduler cannot be restarted.
        s.start(clock.now());
        assert!(!s.is_running());
    }
}
