//! Ratatui-based terminal UI.
//!
//! Shows fitted trials two panels at a time (side by side, like a 1x2
//! figure). The trial data is loaded once; changing eps refits in place.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
};

use crate::app::pipeline::{RunOutput, fit_trial};
use crate::domain::{FitConfig, MAX_EPS, Panel, TrialMatrix};
use crate::error::AppError;
use crate::io::ingest::TrialSource;

mod plotters_chart;

use plotters_chart::TrialChart;

const PANELS_PER_PAGE: usize = 2;
const EPS_STEP: f64 = 0.005;

/// Start the TUI.
pub fn run(sources: Vec<Box<dyn TrialSource>>, config: FitConfig) -> Result<(), AppError> {
    // Load before touching the terminal so errors print normally.
    let mut app = App::new(&sources, config)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct LoadedTrial {
    label: String,
    source: String,
    matrix: TrialMatrix,
}

struct App {
    config: FitConfig,
    trials: Vec<LoadedTrial>,
    panels: Vec<Panel>,
    failures: usize,
    page: usize,
    status: String,
}

impl App {
    fn new(sources: &[Box<dyn TrialSource>], config: FitConfig) -> Result<Self, AppError> {
        let trials = sources
            .iter()
            .map(|s| {
                Ok(LoadedTrial {
                    label: s.label().to_string(),
                    source: s.describe(),
                    matrix: s.load()?,
                })
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        let mut app = Self {
            config,
            trials,
            panels: Vec::new(),
            failures: 0,
            page: 0,
            status: String::new(),
        };
        app.refit()?;
        Ok(app)
    }

    fn refit(&mut self) -> Result<(), AppError> {
        let trials = self
            .trials
            .iter()
            .map(|t| fit_trial(&t.label, &t.source, &t.matrix, &self.config))
            .collect::<Result<Vec<_>, AppError>>()?;
        let run = RunOutput { trials };

        self.failures = run.failures().len();
        self.panels = crate::report::panels_from_run(&run);
        self.page = self.page.min(self.page_count().saturating_sub(1));
        self.status = if self.failures == 0 {
            format!("eps={:.3}: all fits ok", self.config.eps)
        } else {
            format!("eps={:.3}: {} fit(s) failed", self.config.eps, self.failures)
        };
        Ok(())
    }

    fn page_count(&self) -> usize {
        self.panels.len().div_ceil(PANELS_PER_PAGE).max(1)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code)? {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Result<bool, AppError> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(true),
            KeyCode::Left => self.page = self.page.saturating_sub(1),
            KeyCode::Right => {
                if self.page + 1 < self.page_count() {
                    self.page += 1;
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => self.adjust_eps(EPS_STEP)?,
            KeyCode::Char('-') => self.adjust_eps(-EPS_STEP)?,
            _ => {}
        }
        Ok(false)
    }

    fn adjust_eps(&mut self, delta: f64) -> Result<(), AppError> {
        self.config.eps = step_eps(self.config.eps, delta);
        self.refit()
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_panels(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = vec![
            Line::from(vec![
                Span::styled("motorfit", Style::default().fg(Color::Cyan)),
                Span::raw(" - middle-segment line fit"),
            ]),
            Line::from(Span::styled(
                format!(
                    "eps: {:.3} | rate: {:.1} Hz | panels: {} | page {}/{}",
                    self.config.eps,
                    self.config.sample_rate_hz,
                    self.panels.len(),
                    self.page + 1,
                    self.page_count(),
                ),
                Style::default().fg(Color::Gray),
            )),
        ];
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_panels(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);

        let start = self.page * PANELS_PER_PAGE;
        for (slot, rect) in columns.iter().enumerate() {
            let Some(panel) = self.panels.get(start + slot) else {
                continue;
            };
            let title_style = if panel.endpoints.is_some() {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::Red)
            };
            let block = Block::default()
                .title(Span::styled(panel.title.clone(), title_style))
                .borders(Borders::ALL);
            let inner = block.inner(*rect);
            frame.render_widget(block, *rect);
            frame.render_widget(Clear, inner);
            frame.render_widget(TrialChart::from_panel(panel), inner);
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ page  +/- eps  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Move eps by `delta`, staying inside `[0, MAX_EPS]` and on the step grid.
fn step_eps(eps: f64, delta: f64) -> f64 {
    let stepped = ((eps + delta) / EPS_STEP).round() * EPS_STEP;
    stepped.clamp(0.0, MAX_EPS)
}
