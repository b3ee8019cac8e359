//! Interactive ratatui dashboard.

use std::io::{self, Stdout};

use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Gauge, Paragraph, Row, Sparkline, Table, TableState},
    Frame, Terminal,
};

use crate::config::Theme;
use crate::core::types::{Pid, SortKey};
use crate::core::Result;
use crate::display::{Display, Focus, Navigation};
use crate::view_model::{BatteryLevel, ViewModel};

const HOTKEYS: &str = "q:Quit  k:Kill  c/m/p:Sort  /:Filter  r:Rescan";

/// Puts the terminal in raw mode (and optionally the alternate screen) and
/// restores it on drop, including on early returns and panics that unwind.
pub struct TerminalGuard {
    alternate: bool,
}

impl TerminalGuard {
    pub fn enter(alternate: bool) -> Result<Self> {
        enable_raw_mode()?;
        if alternate {
            execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        }
        Ok(Self { alternate })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        if self.alternate {
            let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        }
    }
}

pub struct TuiDisplay<B: Backend> {
    terminal: Terminal<B>,
    theme: Theme,
    focus: Focus,
    page: usize,
    last: Option<ViewModel>,
}

impl TuiDisplay<CrosstermBackend<Stdout>> {
    pub fn stdout(theme: Theme) -> Result<Self> {
        Self::new(CrosstermBackend::new(io::stdout()), theme)
    }
}

impl<B: Backend> TuiDisplay<B> {
    pub fn new(backend: B, theme: Theme) -> Result<Self> {
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;
        Ok(Self {
            terminal,
            theme,
            focus: Focus::default(),
            page: 1,
            last: None,
        })
    }

    pub fn backend(&self) -> &B {
        self.terminal.backend()
    }

    fn redraw(&mut self) -> Result<()> {
        let Some(view) = &self.last else {
            return Ok(());
        };
        let theme = self.theme;
        let selected = (!view.process_rows.is_empty()).then_some(self.focus.selected());
        let mut page = self.page;
        self.terminal.draw(|frame| {
            page = draw_dashboard(frame, view, &theme, selected);
        })?;
        self.page = page;
        Ok(())
    }
}

impl<B: Backend> Display for TuiDisplay<B> {
    fn publish(&mut self, view: &ViewModel) -> Result<()> {
        let focused = self.focused_pid();
        self.focus.follow(focused, &view.process_rows);
        self.last = Some(view.clone());
        self.redraw()
    }

    fn navigate(&mut self, nav: Navigation) -> Result<()> {
        let len = self.last.as_ref().map_or(0, |v| v.process_rows.len());
        self.focus.navigate(nav, len, self.page);
        self.redraw()
    }

    fn focused_pid(&self) -> Option<Pid> {
        self.last
            .as_ref()
            .and_then(|v| v.process_rows.get(self.focus.selected()))
            .map(|r| r.pid)
    }
}

/// Lay out and draw one frame. Returns how many table rows fit on screen.
pub fn draw_dashboard(
    frame: &mut Frame,
    view: &ViewModel,
    theme: &Theme,
    selected: Option<usize>,
) -> usize {
    let info_height = (view.disk_usage_lines.len() as u16 + 3).min(8);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(6),
            Constraint::Length(info_height),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_title(frame, chunks[0], view, theme);
    draw_gauges(frame, chunks[1], view, theme);
    draw_history(frame, chunks[2], view, theme);
    draw_info(frame, chunks[3], view, theme);
    let page = draw_processes(frame, chunks[4], view, theme, selected);
    draw_footer(frame, chunks[5], view, theme);
    page
}

fn draw_title(frame: &mut Frame, area: Rect, view: &ViewModel, theme: &Theme) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(area);
    let title = format!(" pitop v{}", env!("CARGO_PKG_VERSION"));
    frame.render_widget(Paragraph::new(title).style(theme.header), halves[0]);
    frame.render_widget(
        Paragraph::new(format!("{} ", view.network_line()))
            .style(theme.header)
            .alignment(Alignment::Right),
        halves[1],
    );
}

fn draw_gauges(frame: &mut Frame, area: Rect, view: &ViewModel, theme: &Theme) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    let gauge = |title: &'static str, percent: f64| {
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .gauge_style(theme.highlighted)
            .ratio((percent / 100.0).clamp(0.0, 1.0))
            .label(format!("{:.1}%", percent))
    };
    frame.render_widget(gauge("CPU", view.cpu_percent), halves[0]);
    frame.render_widget(gauge("RAM", view.memory_percent), halves[1]);
}

fn draw_history(frame: &mut Frame, area: Rect, view: &ViewModel, theme: &Theme) {
    let halves = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(area);
    for (rect, title, history) in [
        (halves[0], "CPU history", &view.cpu_history),
        (halves[1], "RAM history", &view.memory_history),
    ] {
        let data: Vec<u64> = history
            .iter()
            .map(|v| v.clamp(0.0, 100.0).round() as u64)
            .collect();
        // Newest samples on the right; drop what does not fit.
        let width = rect.width.saturating_sub(2) as usize;
        let start = data.len().saturating_sub(width);
        let sparkline = Sparkline::default()
            .block(Block::default().borders(Borders::ALL).title(title))
            .data(&data[start..])
            .max(100)
            .style(theme.normal);
        frame.render_widget(sparkline, rect);
    }
}

fn draw_info(frame: &mut Frame, area: Rect, view: &ViewModel, theme: &Theme) {
    let mut lines = Vec::with_capacity(view.disk_usage_lines.len() + 1);
    let mut uptime = format!("Uptime: {}", view.uptime_string);
    if let Some(booted) = &view.booted_at {
        uptime.push_str(&format!("   Booted: {}", booted));
    }
    lines.push(Line::from(uptime));
    lines.extend(view.disk_usage_lines.iter().map(|l| Line::from(l.as_str())));
    frame.render_widget(
        Paragraph::new(lines)
            .style(theme.normal)
            .block(Block::default().borders(Borders::ALL).title("System")),
        area,
    );
}

fn draw_processes(
    frame: &mut Frame,
    area: Rect,
    view: &ViewModel,
    theme: &Theme,
    selected: Option<usize>,
) -> usize {
    let sort = view.active_sort;
    let column = |label: &'static str, key: Option<SortKey>| -> Cell<'static> {
        if key == Some(sort.key) {
            Cell::from(sort.to_string())
        } else {
            Cell::from(label)
        }
    };
    let header = Row::new(vec![
        column("Name", None),
        column("User", None),
        column("PID", Some(SortKey::Pid)),
        column("CPU%", Some(SortKey::Cpu)),
        column("Mem%", Some(SortKey::Memory)),
    ])
    .style(theme.header.add_modifier(Modifier::BOLD));

    let rows = view.process_rows.iter().map(|r| {
        Row::new(vec![
            Cell::from(r.name.clone()),
            Cell::from(r.user.clone()),
            Cell::from(r.pid.to_string()),
            Cell::from(r.cpu.clone()),
            Cell::from(r.mem.clone()),
        ])
        .style(theme.normal)
    });

    let mut title = format!(
        " Processes {} of {} (scanned {}) ",
        view.process_rows.len(),
        view.process_matched,
        view.process_total
    );
    if !view.active_filter_text.is_empty() {
        title.push_str(&format!("filter '{}' ", view.active_filter_text));
    }

    let widths = [
        Constraint::Length(25),
        Constraint::Length(15),
        Constraint::Length(8),
        Constraint::Length(8),
        Constraint::Length(8),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(theme.highlighted);

    let mut state = TableState::default();
    state.select(selected);
    frame.render_stateful_widget(table, area, &mut state);

    area.height.saturating_sub(3) as usize
}

fn draw_footer(frame: &mut Frame, area: Rect, view: &ViewModel, theme: &Theme) {
    let battery_style = match view.battery_level {
        BatteryLevel::High => theme.battery_high,
        BatteryLevel::Medium => theme.battery_medium,
        BatteryLevel::Low => theme.battery_low,
        BatteryLevel::Unknown => theme.header,
    };
    let mut spans = vec![
        Span::styled(format!(" {}", view.battery_label), battery_style),
        Span::styled(format!("   |   {}", HOTKEYS), theme.header),
    ];
    if view.filter_editing {
        spans.push(Span::styled(
            format!("   Filter: {}_", view.active_filter_text),
            theme.highlighted,
        ));
    }
    if let Some(status) = &view.status_message {
        spans.push(Span::styled(format!("   {}", status), theme.header));
    }
    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(theme.header),
        area,
    );
}
