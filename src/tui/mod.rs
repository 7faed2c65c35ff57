//! Ratatui-based terminal dashboard.
//!
//! One chart per page, in dashboard order. Bar charts and pie shares use
//! Ratatui widgets, histograms and scatters are drawn with Plotters, and the
//! treemap reuses the character-grid renderer.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Gauge, Paragraph, Wrap},
    Terminal,
};

use crate::app::pipeline::RunOutput;
use crate::domain::{BarItem, Chart, ChartData, ChartKind, DashboardConfig, Orientation, PieSlice};
use crate::error::AppError;
use crate::plot::ascii::render_treemap;
use crate::plot::truncate;

mod plotters_chart;

use plotters_chart::{histogram_bounds, scatter_bounds, DashPlottersChart, PlotSeries};

/// Bar values are integers in Ratatui; keep two decimals.
const BAR_SCALE: f64 = 100.0;

/// Start the TUI.
///
/// The dataset is loaded before the terminal switches modes so that ingest
/// errors print normally.
pub fn run(config: DashboardConfig) -> Result<(), AppError> {
    let run = crate::app::pipeline::run_dashboard(&config)?;
    if run.dashboard.charts.is_empty() {
        return Err(AppError::new(2, "No charts selected."));
    }

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(config, run);
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

struct App {
    config: DashboardConfig,
    run: RunOutput,
    page: usize,
}

impl App {
    fn new(config: DashboardConfig, run: RunOutput) -> Self {
        Self { config, run, page: 0 }
    }

    fn pages(&self) -> usize {
        self.run.dashboard.charts.len()
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
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
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

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        let pages = self.pages();
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Right | KeyCode::Char('n') => self.page = (self.page + 1) % pages,
            KeyCode::Left | KeyCode::Char('p') => self.page = (self.page + pages - 1) % pages,
            KeyCode::Home => self.page = 0,
            KeyCode::End => self.page = pages - 1,
            KeyCode::Char(c) => {
                if let Some(target) = digit_page(c) {
                    if target < pages {
                        self.page = target;
                    }
                }
            }
            _ => {}
        }
        false
    }

    fn chart(&self) -> &Chart {
        &self.run.dashboard.charts[self.page]
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_chart(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chart = self.chart();
        let cov = self.run.derived.coverage();

        let lines = vec![
            Line::from(vec![
                Span::styled("imdb", Style::default().fg(Color::Cyan)),
                Span::raw(format!(
                    " - {} | {} films | csv: {}",
                    self.run.dashboard.title,
                    self.run.dashboard.rows,
                    self.config.csv_path.display()
                )),
            ]),
            Line::from(Span::styled(
                format!(
                    "runtime: {:?} | profit {}/{} | runtime {}/{} | year {}/{} | skipped rows: {}",
                    self.config.runtime_mode,
                    cov.gross_profit,
                    cov.rows,
                    cov.runtime_minutes,
                    cov.rows,
                    cov.release_year,
                    cov.rows,
                    self.run.ingest.row_errors.len(),
                ),
                Style::default().fg(Color::Gray),
            )),
            Line::from(Span::styled(
                chart.caption.clone(),
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )),
        ];

        let p = Paragraph::new(Text::from(lines))
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chart = self.chart();
        let title = format!(" [{}/{}] {} ", self.page + 1, self.pages(), chart.title);
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if chart.is_empty() {
            let msg = Paragraph::new("No rows have the fields this chart needs.")
                .style(Style::default().fg(Color::Yellow))
                .alignment(Alignment::Center);
            frame.render_widget(msg, inner);
            return;
        }

        match &chart.data {
            ChartData::Bar {
                orientation, bars, ..
            } => draw_bars(frame, inner, bars, *orientation),
            ChartData::Pie { slices, .. } => draw_pie(frame, inner, slices),
            ChartData::Treemap { tiles } => {
                let grid_height = inner.height.saturating_sub(tiles.len() as u16) as usize;
                let txt = render_treemap(tiles, inner.width as usize, grid_height);
                frame.render_widget(Paragraph::new(txt), inner);
            }
            ChartData::Histogram { x_label, bins, kde } => {
                let (x_bounds, y_bounds) = histogram_bounds(bins, kde);
                let (fmt_x, fmt_y) = axis_formatters(chart.kind);
                let widget = DashPlottersChart {
                    series: PlotSeries::Histogram { bins, kde },
                    x_bounds,
                    y_bounds,
                    x_label,
                    y_label: "Count",
                    fmt_x,
                    fmt_y,
                };
                frame.render_widget(widget, inner);
            }
            ChartData::Scatter {
                x_label,
                y_label,
                points,
            } => {
                let (x_bounds, y_bounds) = scatter_bounds(points);
                let (fmt_x, fmt_y) = axis_formatters(chart.kind);
                let widget = DashPlottersChart {
                    series: PlotSeries::Scatter { points },
                    x_bounds,
                    y_bounds,
                    x_label,
                    y_label,
                    fmt_x,
                    fmt_y,
                };
                frame.render_widget(widget, inner);
            }
        }
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ or n/p page  1-9/0 jump  q quit";
        let excluded = self.chart().excluded;
        let status = if excluded > 0 {
            format!("{excluded} rows excluded from this chart")
        } else {
            "all rows shown".to_string()
        };
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn draw_bars(frame: &mut ratatui::Frame<'_>, area: Rect, items: &[BarItem], orientation: Orientation) {
    let (direction, bar_width, label_width) = match orientation {
        Orientation::Horizontal => (Direction::Horizontal, 1, usize::MAX),
        Orientation::Vertical => {
            let n = items.len().max(1) as u16;
            let width = (area.width / n).saturating_sub(1).clamp(3, 16);
            (Direction::Vertical, width, width as usize)
        }
    };

    let bars: Vec<Bar> = items
        .iter()
        .map(|b| {
            let color = if b.value < 0.0 { Color::Red } else { Color::Cyan };
            Bar::default()
                .value(bar_value(b.value))
                .text_value(format!("{:.2}", b.value))
                .label(Line::from(truncate(&b.label, label_width)))
                .style(Style::default().fg(color))
        })
        .collect();

    let chart = BarChart::default()
        .direction(direction)
        .bar_width(bar_width)
        .bar_gap(1)
        .data(BarGroup::default().bars(&bars));
    frame.render_widget(chart, area);
}

fn draw_pie(frame: &mut ratatui::Frame<'_>, area: Rect, slices: &[PieSlice]) {
    let rows: Vec<Constraint> = slices
        .iter()
        .map(|_| Constraint::Length(1))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect();
    let cells = Layout::default()
        .direction(Direction::Vertical)
        .constraints(rows)
        .split(area);

    for (i, (slice, cell)) in slices.iter().zip(cells.iter()).enumerate() {
        let gauge = Gauge::default()
            .ratio((slice.percent / 100.0).clamp(0.0, 1.0))
            .label(format!("{} {} ({:.1}%)", slice.label, slice.count, slice.percent))
            .gauge_style(Style::default().fg(slice_color(i)).bg(Color::Black));
        frame.render_widget(gauge, *cell);
    }
}

/// Magnitude in hundredths; the sign is carried by the bar color and text.
fn bar_value(value: f64) -> u64 {
    if value.is_finite() {
        (value.abs() * BAR_SCALE).round() as u64
    } else {
        0
    }
}

/// `1`..`9` select pages 1..9 and `0` selects page 10.
fn digit_page(c: char) -> Option<usize> {
    let d = c.to_digit(10)? as usize;
    Some(if d == 0 { 9 } else { d - 1 })
}

fn slice_color(i: usize) -> Color {
    const PALETTE: [Color; 6] = [
        Color::Cyan,
        Color::Magenta,
        Color::Yellow,
        Color::Green,
        Color::Blue,
        Color::Red,
    ];
    PALETTE[i % PALETTE.len()]
}

fn axis_formatters(kind: ChartKind) -> (fn(f64) -> String, fn(f64) -> String) {
    match kind {
        ChartKind::BudgetGross => (fmt_money, fmt_money),
        ChartKind::YearRating => (fmt_whole, fmt_tenth),
        ChartKind::Rating => (fmt_tenth, fmt_whole),
        _ => (fmt_whole, fmt_whole),
    }
}

fn fmt_whole(v: f64) -> String {
    format!("{v:.0}")
}

fn fmt_tenth(v: f64) -> String {
    format!("{v:.1}")
}

fn fmt_money(v: f64) -> String {
    let a = v.abs();
    if a >= 1e9 {
        format!("{:.1}B", v / 1e9)
    } else if a >= 1e6 {
        format!("{:.0}M", v / 1e6)
    } else if a >= 1e3 {
        format!("{:.0}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
