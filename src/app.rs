//! The single cooperative event loop.

use tracing::{debug, info};

use crate::core::Result;
use crate::display::Display;
use crate::event::{AppEvent, EventSource};
use crate::input::{Command, InputDispatcher};
use crate::monitor::{Action, Monitor};
use crate::provider::MetricsProvider;
use crate::scheduler::{Clock, RefreshScheduler, TaskKind};

/// Drives ticks, input and publishing from one thread.
///
/// Every mutation of monitor state and every publish happens inside
/// [`App::run`], one after another, so a display never sees a frame built
/// from a half-applied tick.
pub struct App<P, C, E, D> {
    monitor: Monitor<P>,
    scheduler: RefreshScheduler,
    clock: C,
    events: E,
    display: D,
    input: InputDispatcher,
    publishes: u64,
}

impl<P, C, E, D> App<P, C, E, D>
where
    P: MetricsProvider,
    C: Clock,
    E: EventSource,
    D: Display,
{
    pub fn new(
        monitor: Monitor<P>,
        scheduler: RefreshScheduler,
        clock: C,
        events: E,
        display: D,
    ) -> Self {
        Self {
            monitor,
            scheduler,
            clock,
            events,
            display,
            input: InputDispatcher::new(),
            publishes: 0,
        }
    }

    /// Publish the initial frame, arm the timers and loop until quit.
    pub fn run(&mut self) -> Result<()> {
        self.publish()?;
        self.scheduler.start(self.clock.now());
        info!("refresh loop started");

        while self.scheduler.is_running() {
            let now = self.clock.now();
            for task in self.scheduler.take_due(now) {
                match task {
                    TaskKind::Fast => {
                        self.monitor.fast_tick(now);
                    }
                    TaskKind::Slow => {
                        self.monitor.slow_tick();
                    }
                }
                self.publish()?;
            }

            let Some(wait) = self.scheduler.time_until_next(self.clock.now()) else {
                break;
            };
            match self.events.next_event(wait)? {
                Some(AppEvent::Input(key)) => {
                    let command = self.input.dispatch(key);
                    self.handle(command)?;
                }
                Some(AppEvent::Resize) => self.publish()?,
                None => {}
            }
        }

        info!(publishes = self.publishes, "refresh loop stopped");
        Ok(())
    }

    fn handle(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Quit => {
                debug!("quit requested");
                self.scheduler.shutdown();
            }
            Command::KillFocused => {
                let now = self.clock.now();
                match self.display.focused_pid() {
                    Some(pid) => self.monitor.apply(Action::Kill(pid), now),
                    None => self.monitor.set_status("No process selected", now),
                }
                self.publish()?;
            }
            Command::Apply(action) => {
                self.monitor.apply(action, self.clock.now());
                self.publish()?;
            }
            Command::Navigate(nav) => self.display.navigate(nav)?,
            Command::Redraw => self.publish()?,
            Command::Ignore => {}
        }
        Ok(())
    }

    fn publish(&mut self) -> Result<()> {
        let view = self
            .monitor
            .view_model(self.clock.now(), self.input.is_editing());
        self.display.publish(&view)?;
        self.publishes += 1;
        Ok(())
    }

    /// Frames handed to the display so far.
    pub fn publishes(&self) -> u64 {
        self.publishes
    }

    pub fn monitor(&self) -> &Monitor<P> {
        &self.monitor
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn scheduler(&self) -> &RefreshScheduler {
        &self.scheduler
    }
}
