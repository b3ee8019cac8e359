#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use pitop::core::types::{BatteryState, DiskUsage, Metric, Pid, ProcessSnapshot, TerminateError};
use pitop::display::{Display, Navigation};
use pitop::event::{AppEvent, EventSource};
use pitop::provider::MetricsProvider;
use pitop::scheduler::ManualClock;
use pitop::view_model::ViewModel;
use pitop::{Result, SysmonError};

/// Mutable state behind [`FakeProvider`], shared with the test.
#[derive(Debug, Default)]
pub struct FakeState {
    pub cpu: f64,
    pub memory: f64,
    pub network: (u64, u64),
    pub battery: Option<BatteryState>,
    pub disks: Vec<DiskUsage>,
    pub uptime: u64,
    pub processes: Vec<ProcessSnapshot>,
    pub failing: HashSet<Metric>,
    pub protected: HashSet<Pid>,
    pub terminated: Vec<Pid>,
    pub cpu_calls: usize,
    pub scans: usize,
}

#[derive(Clone, Default)]
pub struct FakeProvider {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeProvider {
    pub fn with_processes(processes: Vec<ProcessSnapshot>) -> Self {
        let provider = FakeProvider::default();
        {
            let mut s = provider.state.borrow_mut();
            s.cpu = 12.0;
            s.memory = 48.0;
            s.uptime = 3_600;
            s.disks = vec![DiskUsage {
                mount_path: "/".into(),
                used_bytes: 40,
                total_bytes: 100,
            }];
            s.processes = processes;
        }
        provider
    }

    fn check(&self, metric: Metric) -> Result<()> {
        if self.state.borrow().failing.contains(&metric) {
            return Err(SysmonError::sampling(metric, "injected failure"));
        }
        Ok(())
    }
}

impl MetricsProvider for FakeProvider {
    fn sample_cpu(&mut self) -> Result<f64> {
        self.state.borrow_mut().cpu_calls += 1;
        self.check(Metric::Cpu)?;
        Ok(self.state.borrow().cpu)
    }

    fn sample_memory(&mut self) -> Result<f64> {
        self.check(Metric::Memory)?;
        Ok(self.state.borrow().memory)
    }

    fn sample_network_counters(&mut self) -> Result<(u64, u64)> {
        self.check(Metric::Network)?;
        Ok(self.state.borrow().network)
    }

    fn sample_battery(&mut self) -> Result<Option<BatteryState>> {
        self.check(Metric::Battery)?;
        Ok(self.state.borrow().battery)
    }

    fn sample_disk_usage(&mut self) -> Result<Vec<DiskUsage>> {
        self.check(Metric::Disk)?;
        Ok(self.state.borrow().disks.clone())
    }

    fn sample_uptime(&mut self) -> Result<u64> {
        self.check(Metric::Uptime)?;
        Ok(self.state.borrow().uptime)
    }

    fn boot_time(&mut self) -> Result<u64> {
        self.check(Metric::Uptime)?;
        Ok(1_700_000_000)
    }

    fn enumerate_processes(&mut self) -> Result<Vec<ProcessSnapshot>> {
        self.state.borrow_mut().scans += 1;
        if self.state.borrow().failing.contains(&Metric::Processes) {
            return Err(SysmonError::Scan("injected failure".into()));
        }
        Ok(self.state.borrow().processes.clone())
    }

    fn terminate_process(&mut self, pid: Pid) -> std::result::Result<(), TerminateError> {
        let mut s = self.state.borrow_mut();
        if s.protected.contains(&pid) {
            return Err(TerminateError::PermissionDenied);
        }
        if !s.processes.iter().any(|p| p.pid() == pid) {
            return Err(TerminateError::NotFound);
        }
        s.terminated.push(pid);
        Ok(())
    }
}

pub fn sample_processes() -> Vec<ProcessSnapshot> {
    vec![
        ProcessSnapshot::new(1, "sshd", "root", 2.0, 1.0),
        ProcessSnapshot::new(2, "chrome", "alice", 40.0, 20.0),
        ProcessSnapshot::new(3, "chromehelper", "alice", 10.0, 5.0),
    ]
}

/// Replays key presses at fixed virtual times, moving the clock as it waits.
///
/// Once the script runs dry it answers with `q`, so a run always ends.
pub struct ScriptedEvents {
    clock: ManualClock,
    script: VecDeque<(Duration, AppEvent)>,
}

impl ScriptedEvents {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            script: VecDeque::new(),
        }
    }

    pub fn key_at(mut self, at: Duration, code: KeyCode) -> Self {
        self.script.push_back((
            at,
            AppEvent::Input(KeyEvent::new(code, KeyModifiers::NONE)),
        ));
        self
    }

    pub fn text_at(mut self, at: Duration, text: &str) -> Self {
        for c in text.chars() {
            self = self.key_at(at, KeyCode::Char(c));
        }
        self
    }
}

impl EventSource for ScriptedEvents {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<AppEvent>> {
        let now = self.clock.elapsed();
        let Some((at, _)) = self.script.front() else {
            return Ok(Some(AppEvent::Input(KeyEvent::new(
                KeyCode::Char('q'),
                KeyModifiers::NONE,
            ))));
        };
        if *at <= now + timeout {
            if *at > now {
                self.clock.advance(*at - now);
            }
            return Ok(self.script.pop_front().map(|(_, event)| event));
        }
        self.clock.advance(timeout);
        Ok(None)
    }
}

/// Keeps every published frame. Focus is a row index into the latest frame.
#[derive(Clone, Default)]
pub struct RecordingDisplay {
    pub frames: Rc<RefCell<Vec<ViewModel>>>,
    focus: usize,
}

impl RecordingDisplay {
    pub fn last(&self) -> ViewModel {
        self.frames.borrow().last().cloned().expect("nothing published")
    }

    pub fn count(&self) -> usize {
        self.frames.borrow().len()
    }
}

impl Display for RecordingDisplay {
    fn publish(&mut self, view: &ViewModel) -> Result<()> {
        self.frames.borrow_mut().push(view.clone());
        Ok(())
    }

    fn navigate(&mut self, nav: Navigation) -> Result<()> {
        match nav {
            Navigation::Down => self.focus += 1,
            Navigation::Up => self.focus = self.focus.saturating_sub(1),
            _ => {}
        }
        Ok(())
    }

    fn focused_pid(&self) -> Option<Pid> {
        self.frames
            .borrow()
            .last()
            .and_then(|v| v.process_rows.get(self.focus))
            .map(|r| r.pid)
    }
}

pub fn pids(view: &ViewModel) -> Vec<Pid> {
    view.process_rows.iter().map(|r| r.pid).collect()
}

pub fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}
