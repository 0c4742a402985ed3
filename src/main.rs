use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{Bar, BarChart, BarGroup, Block, Borders, Clear, Paragraph, Wrap};

use gps_report::aggregate::Report;
use gps_report::charts::{self, CARDS_PER_ROW};
use gps_report::config::{AppConfig, has_flag, positional_args};
use gps_report::ingest;
use gps_report::logging;
use gps_report::metrics::{DISTANCE_ZONES, MetricKey};
use gps_report::persist;
use gps_report::state::{self, AppState, ExportCommand, ExportKind, View, apply_delta};
use gps_report::worker;

const VALUED_FLAGS: &[&str] = &["--lang", "--delimiter", "--out-dir"];

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ExportCommand>>,
    out_dir: PathBuf,
}

impl App {
    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('m') | KeyCode::Char('M') => self.state.cycle_match(),
            KeyCode::Char('h') | KeyCode::Char('H') => self.state.cycle_half(),
            KeyCode::Char('p') | KeyCode::Char('P') => self.state.cycle_player(),
            KeyCode::Char('l') | KeyCode::Char('L') => self.state.cycle_language(),
            KeyCode::Char('v') | KeyCode::Tab => self.state.cycle_view(),
            KeyCode::Char('g') => self.state.cycle_group(),
            KeyCode::Right | KeyCode::Char('n') => self.state.next_metric(),
            KeyCode::Left | KeyCode::Char('b') => self.state.prev_metric(),
            KeyCode::Char('j') | KeyCode::Down => self.state.scroll_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.scroll_up(),
            KeyCode::Char('e') | KeyCode::Char('E') => self.request_export(ExportKind::Pdf),
            KeyCode::Char('x') | KeyCode::Char('X') => self.request_export(ExportKind::Workbook),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            _ => {}
        }
    }

    fn request_export(&mut self, kind: ExportKind) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log("[INFO] Export unavailable");
            return;
        };
        let Some(job) = self.state.export_job() else {
            self.state.push_log("[INFO] Nothing to export for this selection");
            return;
        };
        let labels = self.state.labels();
        let cmd = match kind {
            ExportKind::Pdf => ExportCommand::Pdf {
                job,
                path: self.out_dir.join(labels.pdf_file),
                include_totals: true,
            },
            ExportKind::Workbook => ExportCommand::Workbook {
                job,
                path: self.out_dir.join(labels.xlsx_file),
            },
        };
        if tx.send(cmd).is_err() {
            self.state.push_log("[WARN] Export request failed");
        } else {
            self.state.push_log("[INFO] Export request sent");
        }
    }
}

fn main() -> Result<()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    if has_flag(&args, "--help") || has_flag(&args, "-h") {
        print_usage();
        return Ok(());
    }

    let mut config = AppConfig::load();
    config.apply_args(&args);

    let log_path = config
        .log_file
        .clone()
        .or_else(|| persist::app_cache_dir().map(|dir| dir.join("viewer.log")));
    if let Some(path) = log_path
        && let Err(err) = logging::init_file(&config.log_filter, &path)
    {
        eprintln!("warning: {err:#}");
    }

    let inputs = ingest::expand_inputs(&positional_args(&args, VALUED_FLAGS))?;
    tracing::info!(files = inputs.len(), "loading sessions");
    let report = ingest::load_sessions(&inputs, &config.ingest_options());
    let mut state = AppState::from_load_report(report, config.language);
    let prefs = if has_flag(&args, "--fresh") {
        None
    } else {
        persist::load()
    };
    if let Some(prefs) = &prefs {
        state.apply_prefs(prefs);
    }
    state.language = config.resolve_language(prefs.map(|p| p.language));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    worker::spawn_export_worker(tx, cmd_rx);

    let mut app = App {
        state,
        should_quit: false,
        cmd_tx: Some(cmd_tx),
        out_dir: config.out_dir.clone(),
    };
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = persist::save(&app.state.prefs()) {
        tracing::warn!("saving prefs failed: {err:#}");
    }
    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn print_usage() {
    println!("gps_report [--lang=en|es] [--delimiter=;] [--out-dir=DIR] [--fresh] <files or folders>...");
    println!();
    println!("Opens a terminal report over one or more GPS session CSV exports.");
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<state::Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }
        app.state.maybe_clear_export(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .style(Style::default().fg(Color::White))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(32), Constraint::Min(20)])
        .split(chunks[1]);

    render_sidebar(frame, body[0], &app.state);
    render_main(frame, body[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> String {
    let labels = state.labels();
    format!(
        "{}\n{}: {} | {}: {} | {}: {} | {}",
        state.title(),
        labels.match_label,
        state.match_label(),
        labels.half,
        state.half_label(),
        labels.player,
        state.player_label(),
        state.view_label()
    )
}

fn footer_text() -> &'static str {
    "m Match | h Half | p Player | l Lang | v View | ←/→ Metric | g Group | j/k Scroll | e PDF | x XLSX | ? Help | q Quit"
}

fn render_sidebar(frame: &mut Frame, area: Rect, state: &AppState) {
    let labels = state.labels();
    let mut lines = vec![
        format!("{}: {}", labels.language, state.language.name()),
        String::new(),
        format!("{}:", labels.match_label),
        format!("  {}", state.match_label()),
        format!("{}:", labels.half),
        format!("  {}", state.half_label()),
        format!("{}:", labels.player),
        format!("  {}", state.player_label()),
        String::new(),
        format!("{}: {}", labels.sessions, state.files_loaded),
        format!("Rows: {}", state.dataset.rows.len()),
    ];
    if !state.load_errors.is_empty() {
        lines.push(format!("Skipped files: {}", state.load_errors.len()));
    }
    if state.export.active {
        lines.push(String::new());
        let kind = match state.export.kind {
            Some(ExportKind::Pdf) => "PDF",
            Some(ExportKind::Workbook) => "XLSX",
            None => "Export",
        };
        lines.push(format!(
            "{kind} {}/{}",
            state.export.current, state.export.total
        ));
        lines.push(state.export.message.clone());
        if let Some(path) = &state.export.path {
            lines.push(path.clone());
        }
    }

    let sidebar = Paragraph::new(lines.join("\n"))
        .wrap(Wrap { trim: false })
        .block(Block::default().title("Filters").borders(Borders::ALL));
    frame.render_widget(sidebar, area);
}

fn render_main(frame: &mut Frame, area: Rect, state: &AppState) {
    let labels = state.labels();
    if state.dataset.is_empty() {
        let empty = Paragraph::new(labels.no_files)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    let report = state.report();
    if report.is_empty() {
        let empty = Paragraph::new(labels.no_rows)
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(empty, area);
        return;
    }

    match state.view {
        View::Cards => render_cards(frame, area, state, &report),
        View::Bars => render_bars(frame, area, state, &report),
        View::Stacked => render_stacked(frame, area, state, &report),
        View::Radar => render_radar(frame, area, state, &report),
    }
}

fn render_cards(frame: &mut Frame, area: Rect, state: &AppState, report: &Report<'_>) {
    const CARD_HEIGHT: u16 = 4;
    let block = Block::default()
        .title(charts::averages_heading(&state.selection, state.language))
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let sections = charts::card_sections(&report.card_groups(), state.language);
    let mut y = inner.y;
    let bottom = inner.y + inner.height;
    for section in sections.iter().skip(state.card_scroll as usize) {
        if y >= bottom {
            break;
        }
        let heading = Paragraph::new(section.heading.as_str())
            .style(Style::default().add_modifier(Modifier::BOLD));
        frame.render_widget(
            heading,
            Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: 1,
            },
        );
        y += 1;

        for row in &section.rows {
            if y + CARD_HEIGHT > bottom {
                return;
            }
            let row_area = Rect {
                x: inner.x,
                y,
                width: inner.width,
                height: CARD_HEIGHT,
            };
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, CARDS_PER_ROW as u32); CARDS_PER_ROW])
                .split(row_area);
            for (idx, card) in row.iter().enumerate() {
                let card_block = Block::default()
                    .title(card.title.as_str())
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red));
                let value = Paragraph::new(card.value.as_str())
                    .alignment(Alignment::Center)
                    .style(
                        Style::default()
                            .fg(Color::White)
                            .add_modifier(Modifier::BOLD),
                    )
                    .block(card_block);
                frame.render_widget(value, cols[idx]);
            }
            y += CARD_HEIGHT;
        }
    }
}

fn render_bars(frame: &mut Frame, area: Rect, state: &AppState, report: &Report<'_>) {
    let Some(metric) = state.current_metric() else {
        frame.render_widget(Paragraph::new("No metric columns in these files"), area);
        return;
    };
    let entries = charts::bar_entries(&report.totals(metric));
    // Highest on top.
    let bars = entries
        .iter()
        .rev()
        .map(|entry| {
            Bar::default()
                .value(entry.scaled)
                .text_value(entry.text.clone())
                .label(Line::from(entry.label.clone()))
                .style(Style::default().fg(Color::LightGreen))
        })
        .collect::<Vec<_>>();

    let chart = BarChart::default()
        .block(
            Block::default()
                .title(format!(
                    "{} {}",
                    state.labels().totals_of,
                    metric.label(state.language)
                ))
                .borders(Borders::ALL),
        )
        .data(BarGroup::default().bars(&bars))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .value_style(Style::default().fg(Color::Black).bg(Color::LightGreen));
    frame.render_widget(chart, area);
}

fn zone_color(metric: MetricKey) -> Color {
    match metric {
        MetricKey::Tempo => Color::Green,
        MetricKey::Hsr => Color::Yellow,
        MetricKey::Sprint => Color::Red,
        _ => Color::Gray,
    }
}

fn render_stacked(frame: &mut Frame, area: Rect, state: &AppState, report: &Report<'_>) {
    let block = Block::default()
        .title(state.labels().group_distances)
        .borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let stacked = report.stacked(&DISTANCE_ZONES);
    if stacked.is_empty() {
        return;
    }

    let name_width = stacked
        .iter()
        .map(|s| s.player.chars().count())
        .max()
        .unwrap_or(0)
        .min(24);
    let bar_width = inner.width.saturating_sub(name_width as u16 + 10);
    let widths = charts::stacked_widths(&stacked, bar_width);

    let mut lines = Vec::with_capacity(stacked.len() + 2);
    let legend = stacked[0]
        .segments
        .iter()
        .flat_map(|(metric, _)| {
            [
                Span::styled("■ ", Style::default().fg(zone_color(*metric))),
                Span::raw(format!("{}  ", metric.label(state.language))),
            ]
        })
        .collect::<Vec<_>>();
    lines.push(Line::from(legend));
    lines.push(Line::default());

    for (row, cells) in stacked.iter().zip(widths.iter()).rev() {
        let name = row.player.chars().take(name_width).collect::<String>();
        let mut spans = vec![Span::raw(format!("{name:<name_width$} "))];
        for (metric, width) in cells {
            spans.push(Span::styled(
                "█".repeat(*width as usize),
                Style::default().fg(zone_color(*metric)),
            ));
        }
        spans.push(Span::raw(format!(" {:.0}", row.total)));
        lines.push(Line::from(spans));
    }

    let offset = state.card_scroll.min(lines.len().saturating_sub(1) as u16);
    frame.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
}

fn render_radar(frame: &mut Frame, area: Rect, state: &AppState, report: &Report<'_>) {
    let group = state.radar_group();
    let Some(player) = state.radar_player(report) else {
        return;
    };
    let axes = report.radar(&player, group.metrics());
    let title = format!("{} | {}", group.label(state.language), player);
    let block = Block::default().title(title).borders(Borders::ALL);

    // A radar needs at least three spokes; fall back to a plain list.
    if axes.len() < 3 {
        let text = axes
            .iter()
            .map(|axis| {
                let value = axis
                    .value
                    .map(|v| format!("{v:.1}"))
                    .unwrap_or_else(|| "-".to_string());
                format!(
                    "{}: {value} ({:.0}%)",
                    axis.metric.label(state.language),
                    axis.normalized * 100.0
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let polygon = charts::radar_polygon(&axes);
    let count = axes.len();
    let language = state.language;
    let canvas = Canvas::default()
        .block(block)
        .marker(symbols::Marker::Braille)
        .x_bounds([-1.6, 1.6])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            for ring in [0.5, 1.0] {
                for idx in 0..count {
                    let (x1, y1) = charts::radar_axis_point(idx, count, ring);
                    let (x2, y2) = charts::radar_axis_point((idx + 1) % count, count, ring);
                    ctx.draw(&CanvasLine {
                        x1,
                        y1,
                        x2,
                        y2,
                        color: Color::DarkGray,
                    });
                }
            }
            for idx in 0..count {
                let (x, y) = charts::radar_axis_point(idx, count, 1.0);
                ctx.draw(&CanvasLine {
                    x1: 0.0,
                    y1: 0.0,
                    x2: x,
                    y2: y,
                    color: Color::DarkGray,
                });
            }
            for pair in polygon.windows(2) {
                ctx.draw(&CanvasLine {
                    x1: pair[0].0,
                    y1: pair[0].1,
                    x2: pair[1].0,
                    y2: pair[1].1,
                    color: Color::Red,
                });
            }
            for (idx, axis) in axes.iter().enumerate() {
                let (x, y) = charts::radar_axis_point(idx, count, 1.12);
                let value = axis
                    .value
                    .map(|v| format!("{v:.1}"))
                    .unwrap_or_else(|| "-".to_string());
                let label = format!("{} {value}", axis.metric.label(language));
                ctx.print(x - 0.2, y, label);
            }
        });
    frame.render_widget(canvas, area);
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No messages yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "GPS Match Report - Help",
        "",
        "Filters:",
        "  m            Cycle match",
        "  h            Cycle half",
        "  p            Cycle player",
        "  l            Toggle language",
        "",
        "Views:",
        "  v / Tab      Cards, bars, stacked, radar",
        "  ←/→          Previous/next metric (bars)",
        "  g            Next metric group (radar)",
        "  j/k or ↑/↓   Scroll",
        "",
        "Export:",
        "  e            PDF report",
        "  x            Excel workbook",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
