use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

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
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use livescore_pulse::feed::{self, CycleTicket, LivescoreSource, ProxySource};
use livescore_pulse::state::{AppState, Delta, LiveRow, apply_delta};

struct App {
    state: AppState,
    should_quit: bool,
    source: Arc<dyn LivescoreSource>,
    source_label: String,
    tx: mpsc::Sender<Delta>,
}

impl App {
    fn new(source: ProxySource, tx: mpsc::Sender<Delta>) -> Self {
        let source_label = source.url().to_string();
        Self {
            state: AppState::new(),
            should_quit: false,
            source: Arc::new(source),
            source_label,
            tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('r') | KeyCode::Char('R') => self.refresh_now(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('?') => self.state.help_overlay = !self.state.help_overlay,
            KeyCode::Esc => self.state.help_overlay = false,
            _ => {}
        }
    }

    fn maybe_start_cycle(&mut self) {
        if let Some(ticket) = self.state.poll.poll_due(Instant::now()) {
            self.start_cycle(ticket);
        }
    }

    fn refresh_now(&mut self) {
        if let Some(ticket) = self.state.poll.begin_cycle() {
            self.state.push_log("[INFO] Manual refresh");
            self.start_cycle(ticket);
        }
    }

    fn start_cycle(&self, ticket: CycleTicket) {
        feed::spawn_cycle(self.source.clone(), ticket, self.tx.clone());
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let source = ProxySource::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let mut app = App::new(source, tx);
    app.state
        .push_log(format!("[INFO] Polling {}", app.source_label));
    let res = run_app(&mut terminal, &mut app, rx);
    app.state.poll.teardown();

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        app.maybe_start_cycle();

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
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(app))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_live_table(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text())
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(app: &App) -> String {
    let updated = app
        .state
        .last_updated
        .as_deref()
        .map(|at| format!("Updated {at}"))
        .unwrap_or_else(|| "Waiting for first update".to_string());
    let line1 = format!(
        "  .-.  LIVE DANGEROUS ATTACKS | {} fixtures | {updated}",
        app.state.rows.len()
    );
    let line2 = format!(
        " /___\\ Refreshes every {} seconds | {}",
        app.state.poll.period().as_secs(),
        app.source_label
    );
    let line3 = "  |_|".to_string();
    format!("{line1}\n{line2}\n{line3}")
}

fn footer_text() -> &'static str {
    "r Refresh | j/k/↑/↓ Move | ? Help | q Quit"
}

fn render_live_table(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut constraints = Vec::new();
    if state.error.is_some() {
        constraints.push(Constraint::Length(1));
    }
    constraints.push(Constraint::Length(1));
    constraints.push(Constraint::Min(1));
    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    if let Some(error) = state.error.as_deref() {
        let banner = Paragraph::new(format!(" {error}"))
            .style(Style::default().fg(Color::White).bg(Color::Red));
        frame.render_widget(banner, sections[0]);
        next = 1;
    }

    let widths = live_columns();
    render_live_header(frame, sections[next], &widths);

    let list_area = sections[next + 1];
    if state.loading {
        let loading = Paragraph::new("Loading…");
        frame.render_widget(loading, list_area);
        return;
    }
    if state.rows.is_empty() {
        let empty =
            Paragraph::new("No live fixtures").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, list_area);
        return;
    }
    if list_area.height == 0 {
        return;
    }

    let visible = list_area.height as usize;
    let (start, end) = visible_range(state.selected, state.rows.len(), visible);

    for (i, idx) in (start..end).enumerate() {
        let row_area = Rect {
            x: list_area.x,
            y: list_area.y + i as u16,
            width: list_area.width,
            height: 1,
        };

        let selected = idx == state.selected;
        let row_style = if selected {
            Style::default().fg(Color::White).bg(Color::DarkGray)
        } else {
            Style::default()
        };
        if selected {
            frame.render_widget(Block::default().style(row_style), row_area);
        }

        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(widths)
            .split(row_area);

        let row = &state.rows[idx];
        for (col, text) in cols.iter().zip(row_cells(row)) {
            render_cell_text(frame, *col, &text, row_style);
        }
    }
}

fn row_cells(row: &LiveRow) -> [String; 6] {
    [
        row.match_label.clone(),
        row.time_label.clone(),
        row.corners.to_string(),
        row.dangerous_attacks_first_half.to_string(),
        row.dangerous_attacks_second_half.to_string(),
        row.delta.to_string(),
    ]
}

fn live_columns() -> [Constraint; 6] {
    [
        Constraint::Min(28),
        Constraint::Length(8),
        Constraint::Length(10),
        Constraint::Length(15),
        Constraint::Length(15),
        Constraint::Length(16),
    ]
}

fn render_live_header(frame: &mut Frame, area: Rect, widths: &[Constraint]) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(widths)
        .split(area);
    let style = Style::default().add_modifier(Modifier::BOLD);

    let titles = [
        "Match",
        "Time",
        "Corners",
        "D. Attack 1HT",
        "D. Attack 2HT",
        "Delta D. Attack",
    ];
    for (col, title) in cols.iter().zip(titles) {
        render_cell_text(frame, *col, title, style);
    }
}

fn render_cell_text(frame: &mut Frame, area: Rect, text: &str, style: Style) {
    let text_area = Rect {
        x: area.x,
        y: area.y + (area.height / 2),
        width: area.width,
        height: 1,
    };
    let paragraph = Paragraph::new(text.to_string()).style(style);
    frame.render_widget(paragraph, text_area);
}

fn visible_range(selected: usize, total: usize, visible: usize) -> (usize, usize) {
    if total == 0 {
        return (0, 0);
    }
    if total <= visible {
        return (0, total);
    }

    let mut start = selected.saturating_sub(visible / 2);
    if start + visible > total {
        start = total - visible;
    }
    (start, start + visible)
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let skip = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(skip)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 50, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Live Dangerous Attacks - Help",
        "",
        "  r            Refresh now",
        "  j/k or ↑/↓   Move selection",
        "  ?            Toggle help",
        "  Esc          Close help",
        "  q            Quit",
        "",
        "Columns:",
        "  Corners          home–away, whole match",
        "  D. Attack 1HT    dangerous attacks, first half",
        "  D. Attack 2HT    dangerous attacks, second half",
        "  Delta D. Attack  2HT minus 1HT per side",
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
