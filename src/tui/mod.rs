//! Interactive tracker screen: activity selector, notes, start/stop with a
//! once-per-second elapsed refresh, and the two export actions.

use std::{
    io,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Result;
use crossterm::{
    event::{Event, EventStream, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use tracing::error;

use crate::{
    registry::{ActivityRegistry, DuplicatePolicy},
    report::{ExportError, chart::render_chart, document::generate_report},
    session::SessionTimer,
    store::SessionStore,
    utils::time::format_duration,
};

/// Opens the interactive tracker over the given application directory.
pub async fn run(dir: &Path, duplicate_policy: DuplicatePolicy) -> Result<()> {
    let registry = ActivityRegistry::load(dir, duplicate_policy)?;
    let store = SessionStore::load(dir)?;
    let mut app = App::new(dir.to_path_buf(), registry, store);

    let mut terminal = TerminalGuard::new()?;
    event_loop(&mut terminal.terminal, &mut app).await
}

async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_secs(1));

    terminal.draw(|frame| draw(frame, app))?;
    loop {
        tokio::select! {
            maybe_event = events.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key)))
                        if key.kind == crossterm::event::KeyEventKind::Press =>
                    {
                        app.handle_key(key);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e.into()),
                    None => break,
                }
            }
            // Elapsed time re-renders once per second, but only while a
            // session is running; the state is checked at every firing so
            // the refresh stops with the timer.
            _ = tick.tick() => {
                if !app.timer.is_running() {
                    continue;
                }
            }
        }
        if app.should_quit {
            break;
        }
        terminal.draw(|frame| draw(frame, app))?;
    }
    Ok(())
}

/// Raw-mode/alternate-screen guard so the terminal is restored on every exit
/// path, including panics.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[derive(Debug, PartialEq)]
enum InputMode {
    Normal,
    Notes,
    NewActivity,
    ReportStart,
    ReportEnd { start: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum StatusLevel {
    Success,
    Info,
    Error,
}

struct App {
    dir: PathBuf,
    registry: ActivityRegistry,
    store: SessionStore,
    timer: SessionTimer,
    selected: usize,
    notes: String,
    mode: InputMode,
    input: String,
    status: Option<(String, StatusLevel)>,
    should_quit: bool,
}

impl App {
    fn new(dir: PathBuf, registry: ActivityRegistry, store: SessionStore) -> Self {
        Self {
            dir,
            registry,
            store,
            timer: SessionTimer::default(),
            selected: 0,
            notes: String::new(),
            mode: InputMode::Normal,
            input: String::new(),
            status: None,
            should_quit: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        match self.mode {
            InputMode::Normal => self.handle_normal_key(key.code),
            _ => self.handle_prompt_key(key.code),
        }
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.registry.names().len() {
                    self.selected += 1;
                }
            }
            KeyCode::Char('s') | KeyCode::Enter => self.start_selected(),
            KeyCode::Char('x') => self.stop_running(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('n') => {
                self.input = self.notes.clone();
                self.mode = InputMode::Notes;
            }
            KeyCode::Char('a') => {
                self.input.clear();
                self.mode = InputMode::NewActivity;
            }
            KeyCode::Char('r') => {
                self.input.clear();
                self.mode = InputMode::ReportStart;
            }
            KeyCode::Char('g') => self.export_chart(),
            _ => {}
        }
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => {
                self.input.clear();
                self.mode = InputMode::Normal;
            }
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Enter => self.commit_prompt(),
            _ => {}
        }
    }

    fn commit_prompt(&mut self) {
        let input = std::mem::take(&mut self.input);
        match std::mem::replace(&mut self.mode, InputMode::Normal) {
            InputMode::Normal => {}
            InputMode::Notes => {
                self.notes = input;
                self.set_status("Notes updated", StatusLevel::Info);
            }
            InputMode::NewActivity => match self.registry.add(&input) {
                Ok(()) => self.set_status(format!("Added: {}", input.trim()), StatusLevel::Success),
                Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
            },
            InputMode::ReportStart => {
                self.mode = InputMode::ReportEnd { start: input };
            }
            InputMode::ReportEnd { start } => self.export_report(&start, &input),
        }
    }

    fn start_selected(&mut self) {
        let activity = self
            .registry
            .names()
            .get(self.selected)
            .cloned()
            .unwrap_or_default();
        match self.timer.start(&activity, &self.notes) {
            Ok(session) => {
                let message = format!(
                    "Started at {}",
                    session.start_time.format("%H:%M:%S")
                );
                self.set_status(message, StatusLevel::Success);
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    fn stop_running(&mut self) {
        match self.timer.stop() {
            Ok(record) => {
                let elapsed = format_duration(record.elapsed());
                if let Err(e) = self.store.append(record) {
                    error!("Failed to persist session: {e:?}");
                    self.set_status("Failed to save the session", StatusLevel::Error);
                } else {
                    self.set_status(format!("Stopped after {elapsed}"), StatusLevel::Info);
                }
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    fn delete_selected(&mut self) {
        let Some(name) = self.registry.names().get(self.selected).cloned() else {
            self.set_status("Please select an activity to delete", StatusLevel::Error);
            return;
        };
        match self.registry.remove(&name) {
            Ok(()) => {
                if self.selected >= self.registry.names().len() {
                    self.selected = self.registry.names().len().saturating_sub(1);
                }
                self.set_status(format!("Deleted: {name}"), StatusLevel::Info);
            }
            Err(e) => self.set_status(e.to_string(), StatusLevel::Error),
        }
    }

    fn export_chart(&mut self) {
        match render_chart(self.store.all(), &self.dir) {
            Ok(path) => self.set_status(
                format!("Activity analysis saved as {}", path.display()),
                StatusLevel::Success,
            ),
            Err(e) => self.set_export_error(e),
        }
    }

    fn export_report(&mut self, start: &str, end: &str) {
        match generate_report(self.store.all(), start, end, &self.dir) {
            Ok(path) => self.set_status(
                format!("Report saved as {}", path.display()),
                StatusLevel::Success,
            ),
            Err(e) => self.set_export_error(e),
        }
    }

    fn set_export_error(&mut self, error: ExportError) {
        let level = match &error {
            ExportError::NoData | ExportError::EmptyRange { .. } => StatusLevel::Info,
            ExportError::Render { source, .. } => {
                tracing::error!("Export failed: {source:?}");
                StatusLevel::Error
            }
            _ => StatusLevel::Error,
        };
        self.set_status(error.to_string(), level);
    }

    fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status = Some((message.into(), level));
    }

    fn prompt_line(&self) -> Option<String> {
        match &self.mode {
            InputMode::Normal => None,
            InputMode::Notes => Some(format!("Notes: {}", self.input)),
            InputMode::NewActivity => Some(format!("New activity: {}", self.input)),
            InputMode::ReportStart => {
                Some(format!("Report start date (YYYY-MM-DD): {}", self.input))
            }
            InputMode::ReportEnd { .. } => {
                Some(format!("Report end date (YYYY-MM-DD): {}", self.input))
            }
        }
    }
}

fn draw(frame: &mut Frame<'_>, app: &App) {
    let areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(6),
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    let items = app
        .registry
        .names()
        .iter()
        .map(|name| ListItem::new(name.clone()))
        .collect::<Vec<_>>();
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Activities (↑/↓ select · a add · d delete)"),
        )
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    let mut list_state = ListState::default();
    if !app.registry.is_empty() {
        list_state.select(Some(app.selected.min(app.registry.names().len() - 1)));
    }
    frame.render_stateful_widget(list, areas[0], &mut list_state);

    let notes = if app.notes.is_empty() {
        "(none)".to_string()
    } else {
        app.notes.clone()
    };
    frame.render_widget(
        Paragraph::new(notes).block(Block::default().borders(Borders::ALL).title("Notes (n)")),
        areas[1],
    );

    let running = match app.timer.current() {
        Some(session) => Line::styled(
            format!("Running: {}", session.activity),
            Style::default().fg(Color::Green),
        ),
        None => Line::styled("No activity running.", Style::default().fg(Color::Red)),
    };
    frame.render_widget(Paragraph::new(running), areas[2]);

    let elapsed = match app.timer.elapsed() {
        Some(elapsed) => format!("Elapsed time: {}", format_duration(elapsed)),
        None => String::new(),
    };
    frame.render_widget(Paragraph::new(elapsed), areas[3]);

    if let Some((message, level)) = &app.status {
        let color = match level {
            StatusLevel::Success => Color::Green,
            StatusLevel::Info => Color::Blue,
            StatusLevel::Error => Color::Red,
        };
        frame.render_widget(
            Paragraph::new(Line::styled(message.clone(), Style::default().fg(color))),
            areas[4],
        );
    }

    if let Some(prompt) = app.prompt_line() {
        frame.render_widget(
            Paragraph::new(Line::styled(
                format!("{prompt}_"),
                Style::default().fg(Color::Yellow),
            )),
            areas[5],
        );
    }

    frame.render_widget(
        Paragraph::new(Line::styled(
            "s start · x stop · n notes · g chart · r report · q quit",
            Style::default().fg(Color::DarkGray),
        )),
        areas[6],
    );
}
