//! Main application state and TUI event loop for the payments dashboard.
//!
//! [`App`] owns the theme, the [`DashboardState`], the in-flight load and the
//! table/inspector selections. Loads run on tokio tasks; their outcomes are
//! drained from a channel between frames so the loop never blocks.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, TableState},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use dashboard_core::time_utils::TimezoneHandler;
use dashboard_data::loader::LoadOutcome;
use dashboard_runtime::orchestrator::{LoadHandle, LoadOrchestrator};
use dashboard_runtime::state::DashboardState;

use crate::chart_view;
use crate::components::header::Header;
use crate::components::summary_cards;
use crate::detail_view;
use crate::table_view;
use crate::themes::Theme;

/// Message shown when a load task ends without delivering an outcome.
pub const LOAD_LOST: &str = "Load ended without a result";

const KEY_HINTS: &str = "←/→ period  ↑/↓ row  Enter inspect  c chart  r reload  q quit";

// ── Operator ──────────────────────────────────────────────────────────────────

/// Who is signed in, as shown in the header.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub email: String,
    pub role: String,
}

// ── App ───────────────────────────────────────────────────────────────────────

/// Root application state for the dashboard TUI.
pub struct App {
    pub theme: Theme,
    pub state: DashboardState,
    orchestrator: LoadOrchestrator,
    pending: Option<(mpsc::Receiver<LoadOutcome>, LoadHandle)>,
    tz: TimezoneHandler,
    timezone: String,
    operator: Operator,
    table_state: TableState,
    /// `Some(scroll)` while the inspector popup is open.
    inspecting: Option<u16>,
    /// Set to `true` to break out of the event loop on the next iteration.
    pub should_quit: bool,
}

impl App {
    pub fn new(
        theme_name: &str,
        state: DashboardState,
        orchestrator: LoadOrchestrator,
        timezone: String,
        operator: Operator,
    ) -> Self {
        Self {
            theme: Theme::from_name(theme_name),
            state,
            orchestrator,
            pending: None,
            tz: TimezoneHandler::new(&timezone),
            timezone,
            operator,
            table_state: TableState::default(),
            inspecting: None,
            should_quit: false,
        }
    }

    // ── Event loop ────────────────────────────────────────────────────────────

    /// Run the dashboard until `q`, `Q` or `Ctrl+C`.
    ///
    /// Uses `crossterm::event::poll` with a 250 ms timeout so that load
    /// outcomes arriving on the channel are picked up between key presses.
    pub async fn run(mut self) -> io::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let tick_rate = Duration::from_millis(250);
        self.reload();

        let result = loop {
            terminal.draw(|frame| self.render(frame))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            self.poll_load();

            if self.should_quit {
                break Ok(());
            }
        };

        restore_terminal()?;
        terminal.show_cursor()?;

        result
    }

    // ── Loading ───────────────────────────────────────────────────────────────

    /// Start a fresh load. A load already in flight is left to finish but its
    /// outcome is discarded.
    pub fn reload(&mut self) {
        self.state.begin_load();
        if self.pending.replace(self.orchestrator.start()).is_some() {
            debug!("superseding in-flight load");
        }
    }

    pub fn is_load_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Apply the in-flight load's outcome if it has arrived.
    pub fn poll_load(&mut self) {
        let Some((rx, _)) = self.pending.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                self.state.apply_load(outcome);
                self.reset_row();
            }
            Err(mpsc::error::TryRecvError::Empty) => {}
            Err(mpsc::error::TryRecvError::Disconnected) => {
                warn!("load task ended without sending an outcome");
                self.pending = None;
                self.state.fail_load(LOAD_LOST);
            }
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub fn handle_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
                return;
            }
            KeyCode::Char('q') | KeyCode::Char('Q') => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        if let Some(scroll) = self.inspecting.as_mut() {
            match key.code {
                KeyCode::Esc | KeyCode::Enter => self.inspecting = None,
                KeyCode::Down => *scroll = scroll.saturating_add(1),
                KeyCode::Up => *scroll = scroll.saturating_sub(1),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Left => {
                self.state.select_previous();
                self.reset_row();
            }
            KeyCode::Right => {
                self.state.select_next();
                self.reset_row();
            }
            KeyCode::Up => self.move_row(-1),
            KeyCode::Down => self.move_row(1),
            KeyCode::Enter => {
                if self.selected_row().is_some() {
                    self.inspecting = Some(0);
                }
            }
            KeyCode::Char('c') => self.state.toggle_chart_view(),
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
    }

    /// Index of the highlighted transaction, if it exists.
    pub fn selected_row(&mut self) -> Option<usize> {
        let count = self.state.selection().count();
        self.table_state.selected().filter(|&i| i < count)
    }

    pub fn is_inspecting(&self) -> bool {
        self.inspecting.is_some()
    }

    fn reset_row(&mut self) {
        let first = (!self.state.selection().is_empty()).then_some(0);
        self.table_state.select(first);
    }

    fn move_row(&mut self, delta: isize) {
        let count = self.state.selection().count();
        if count == 0 {
            self.table_state.select(None);
            return;
        }
        let current = self.table_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).clamp(0, count as isize - 1);
        self.table_state.select(Some(next as usize));
    }

    // ── Rendering ─────────────────────────────────────────────────────────────

    /// Render the current application state into `frame`.
    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();
        let strategy = self.state.strategy().to_string();
        let header = Header::new(
            &self.operator.email,
            &self.operator.role,
            &strategy,
            &self.timezone,
            &self.theme,
        );

        let view = self.state.view();

        if view.loading {
            let [head, body] =
                Layout::vertical([Constraint::Length(3), Constraint::Min(0)]).areas(area);
            frame.render_widget(Paragraph::new(header.to_lines()), head);
            render_loading(frame, body, &self.theme);
            return;
        }

        let [head, cards, chart, table, footer] = Layout::vertical([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(12),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .areas(area);

        frame.render_widget(Paragraph::new(header.to_lines()), head);
        summary_cards::render_summary_cards(frame, cards, view.summary, view.strategy, &self.theme);
        chart_view::render_period_chart(
            frame,
            chart,
            view.buckets,
            view.chart_view,
            view.selected_period,
            &self.theme,
        );

        if view.selection.is_empty() {
            table_view::render_no_data(frame, table, view.selected_period, &self.theme);
        } else {
            table_view::render_transaction_table(
                frame,
                table,
                view.selection,
                &self.tz,
                &mut self.table_state,
                &self.theme,
            );
        }

        frame.render_widget(
            Paragraph::new(footer_line(view.error, view.used_sample, &self.theme)),
            footer,
        );

        if let Some(scroll) = self.inspecting {
            let row = self.table_state.selected().unwrap_or(0);
            if let Some(tx) = view.selection.transactions().get(row) {
                detail_view::render_detail_popup(frame, area, tx, scroll, &self.theme);
            }
        }
    }
}

/// Leave raw mode and the alternate screen.
///
/// Safe to call when the terminal was never set up.
pub fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, LeaveAlternateScreen)
}

/// Footer: the load error if any, otherwise the key hints.
fn footer_line<'a>(error: Option<&str>, used_sample: bool, theme: &Theme) -> Line<'a> {
    let mut spans = Vec::new();
    if used_sample {
        spans.push(Span::styled("[sample data] ", theme.warning));
    }
    match error {
        Some(message) => spans.push(Span::styled(message.to_string(), theme.error)),
        None => spans.push(Span::styled(KEY_HINTS, theme.dim)),
    }
    Line::from(spans)
}

fn render_loading(frame: &mut Frame, area: Rect, theme: &Theme) {
    let text = vec![
        Line::from(""),
        Line::from(Span::styled("Loading transactions…", theme.info)),
        Line::from(""),
        Line::from(Span::styled("Press 'q' or Ctrl+C to exit", theme.dim)),
    ];
    frame.render_widget(
        Paragraph::new(text).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.card_border)
                .title(" Payments "),
        ),
        area,
    );
}

// ── Tests ──────────────────────────────────────────────────────────────────────
