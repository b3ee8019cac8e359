use std::time::Duration;

use crossterm::event::{self, Event as CEvent, KeyEvent};

use crate::core::Result;

/// Events that the application can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// A key press event from the user.
    Input(KeyEvent),
    /// The terminal was resized.
    Resize,
}

/// Source of user input for the app loop.
pub trait EventSource {
    /// Block for at most `timeout` waiting for the next event.
    ///
    /// `Ok(None)` means the timeout elapsed with nothing to report.
    fn next_event(&mut self, timeout: Duration) -> Result<Option<AppEvent>>;
}

/// Polls the terminal for key and resize events.
///
/// The wait is bounded by the caller, which passes the time remaining until
/// the next scheduled refresh; this is the only place the loop blocks.
#[derive(Debug, Default)]
pub struct EventHandler;

impl EventHandler {
    pub fn new() -> Self {
        EventHandler
    }
}

impl EventSource for EventHandler {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<AppEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            CEvent::Key(key) => Ok(Some(AppEvent::Input(key))),
            CEvent::Resize(_, _) => Ok(Some(AppEvent::Resize)),
            // Ignore other event types.
            _ => Ok(None),
        }
    }
}
