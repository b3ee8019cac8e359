//! Key bindings.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::core::types::SortKey;
use crate::display::Navigation;
use crate::monitor::Action;

/// What a key press asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    /// Kill whatever row the display has focused.
    KillFocused,
    Apply(Action),
    Navigate(Navigation),
    /// Only the input mode changed; redraw.
    Redraw,
    Ignore,
}

/// Maps raw key events to commands and owns the filter line editor.
#[derive(Debug, Default)]
pub struct InputDispatcher {
    editing: bool,
    buffer: String,
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while the user is typing a filter.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn dispatch(&mut self, key: KeyEvent) -> Command {
        if key.kind != KeyEventKind::Press {
            return Command::Ignore;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Command::Quit;
        }
        if self.editing {
            self.edit_filter(key)
        } else {
            self.browse(key)
        }
    }

    fn browse(&mut self, key: KeyEvent) -> Command {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => Command::Quit,
            KeyCode::Char('k') | KeyCode::Char('K') => Command::KillFocused,
            KeyCode::Char('c') => Command::Apply(Action::Sort(SortKey::Cpu)),
            KeyCode::Char('m') => Command::Apply(Action::Sort(SortKey::Memory)),
            KeyCode::Char('p') => Command::Apply(Action::Sort(SortKey::Pid)),
            KeyCode::Char('r') | KeyCode::F(5) => Command::Apply(Action::Rescan),
            KeyCode::Char('/') => {
                self.editing = true;
                Command::Redraw
            }
            KeyCode::Up => Command::Navigate(Navigation::Up),
            KeyCode::Down => Command::Navigate(Navigation::Down),
            KeyCode::PageUp => Command::Navigate(Navigation::PageUp),
            KeyCode::PageDown => Command::Navigate(Navigation::PageDown),
            KeyCode::Home => Command::Navigate(Navigation::Home),
            KeyCode::End => Command::Navigate(Navigation::End),
            _ => Command::Ignore,
        }
    }

    fn edit_filter(&mut self, key: KeyEvent) -> Command {
        match key.code {
            KeyCode::Char(c) => {
                self.buffer.push(c);
                Command::Apply(Action::Filter(self.buffer.clone()))
            }
            KeyCode::Backspace => {
                if self.buffer.pop().is_none() {
                    return Command::Ignore;
                }
                Command::Apply(Action::Filter(self.buffer.clone()))
            }
            KeyCode::Enter => {
                self.editing = false;
                Command::Redraw
            }
            KeyCode::Esc => {
                self.editing = false;
                self.buffer.clear();
                Command::Apply(Action::Filter(String::new()))
            }
            KeyCode::Up => Command::Navigate(Navigation::Up),
            KeyCode::Down => Command::Navigate(Navigation::Down),
            _ => Command::Ignore,
        }
    }
}
