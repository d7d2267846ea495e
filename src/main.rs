use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols;
use ratatui::widgets::canvas::{Canvas, Line as CanvasLine};
use ratatui::widgets::{
    Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Tabs,
};

use fut_forecast::app::Dashboard;
use fut_forecast::config::Config;
use fut_forecast::feed;
use fut_forecast::nationality;
use fut_forecast::projection::{
    self, PLACEHOLDER, RADAR_AXES, SEASON_COUNT, SEASONS, display_ceil,
    display_defensive_contributions, display_market_value, display_rating_change,
    display_rounded, rating_change_arrow,
};
use fut_forecast::state::{
    AppState, Delta, ForecastStatus, ProviderCommand, SearchStatus, SeasonForecast,
};

struct App {
    dashboard: Dashboard,
    flag_cdn_url: String,
    should_quit: bool,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, config: &Config) -> Self {
        Self {
            dashboard: Dashboard::new(cmd_tx),
            flag_cdn_url: config.flag_cdn_url.clone(),
            should_quit: false,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let now = Instant::now();
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let KeyCode::Char('c') | KeyCode::Char('q') = key.code {
                self.should_quit = true;
            }
            return;
        }
        let dash = &mut self.dashboard;
        match key.code {
            KeyCode::F(1) => dash.state.help_overlay = !dash.state.help_overlay,
            KeyCode::Esc if dash.state.help_overlay => dash.state.help_overlay = false,
            KeyCode::Esc => dash.clear_search(now),
            KeyCode::Enter => dash.submit_search(),
            KeyCode::Down if dash.state.dropdown_visible() => dash.state.select_next_suggestion(),
            KeyCode::Up if dash.state.dropdown_visible() => dash.state.select_prev_suggestion(),
            KeyCode::Tab | KeyCode::Right => dash.state.next_season(),
            KeyCode::BackTab | KeyCode::Left => dash.state.prev_season(),
            KeyCode::Backspace => dash.pop_search_char(now),
            KeyCode::Char(ch) => dash.push_search_char(ch, now),
            _ => {}
        }
    }
}

fn main() -> io::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    let config = Config::from_env();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    feed::spawn_provider(tx, cmd_rx, config.clone());

    let mut app = App::new(Some(cmd_tx), &config);
    app.dashboard
        .state
        .push_log(format!("[INFO] Backend: {}", config.backend_url));
    let res = run_app(&mut terminal, &mut app, rx);

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
    let tick_rate = Duration::from_millis(100);

    loop {
        while let Ok(delta) = rx.try_recv() {
            app.dashboard.apply(delta);
        }

        app.dashboard.tick(Instant::now());

        terminal.draw(|f| ui(f, app))?;

        let timeout = app.dashboard.poll_timeout(Instant::now(), tick_rate);
        if event::poll(timeout)?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.on_key(key);
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let state = &app.dashboard.state;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(frame.size());

    render_search(frame, chunks[0], state);

    let body = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(17), Constraint::Min(8)])
        .split(chunks[1]);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(36), Constraint::Min(40)])
        .split(body[0]);

    let card = Paragraph::new(player_card_text(state, &app.flag_cdn_url))
        .block(Block::default().title("Player").borders(Borders::ALL));
    frame.render_widget(card, top[0]);

    render_season_panel(frame, top[1], state);
    render_progression(frame, body[1], state);

    let console = Paragraph::new(console_text(state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[3]);

    if state.dropdown_visible() {
        render_dropdown(frame, chunks[0], state);
    }

    if state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn render_search(frame: &mut Frame, area: Rect, state: &AppState) {
    let status = match state.search_status {
        SearchStatus::Searching => "Searching…",
        SearchStatus::NoResults => "No players found",
        SearchStatus::Ready | SearchStatus::Idle => "",
    };
    let line = Line::from(vec![
        Span::raw(state.search_text.clone()),
        Span::styled("▏", Style::default().fg(Color::Cyan)),
        Span::raw("  "),
        Span::styled(status, Style::default().fg(Color::DarkGray)),
    ]);
    let search = Paragraph::new(line).block(
        Block::default()
            .title("Search player")
            .borders(Borders::ALL),
    );
    frame.render_widget(search, area);
}

fn render_dropdown(frame: &mut Frame, anchor: Rect, state: &AppState) {
    let height = (state.suggestions.len() as u16).saturating_add(2);
    let area = Rect {
        x: anchor.x,
        y: anchor.y.saturating_add(anchor.height),
        width: anchor.width.min(64),
        height,
    }
    .intersection(frame.size());
    if area.height == 0 {
        return;
    }

    let lines: Vec<Line> = state
        .suggestions
        .iter()
        .enumerate()
        .map(|(idx, s)| {
            let style = if idx == state.suggestion_selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let detail = [s.club.as_str(), s.nationality.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" · ");
            Line::from(vec![
                Span::styled(format!("{} ", s.display_name), style.add_modifier(Modifier::BOLD)),
                Span::styled(detail, style.fg(Color::Gray)),
            ])
        })
        .collect();

    frame.render_widget(Clear, area);
    let dropdown = Paragraph::new(lines).block(Block::default().borders(Borders::ALL));
    frame.render_widget(dropdown, area);
}

fn player_card_text(state: &AppState, flag_cdn_url: &str) -> String {
    let identity = &state.identity;
    let or_dash = |v: Option<String>| v.unwrap_or_else(|| PLACEHOLDER.to_string());

    let nationality = state.media.nationality_label.clone();
    let flag = match nationality.as_deref().and_then(nationality::nationality_code) {
        Some(code) => format!(
            "[{}] {}",
            code.to_uppercase(),
            nationality::flag_url(flag_cdn_url, code)
        ),
        None => "[  ] no flag".to_string(),
    };

    let asset = |url: &Option<String>| match url {
        Some(url) => url.clone(),
        None if state.media_loading => "Loading…".to_string(),
        None => "none".to_string(),
    };

    [
        format!("Name: {}", or_dash(state.displayed_name.clone())),
        format!("Overall: {}", or_dash(identity.current_overall.map(|v| v.to_string()))),
        format!("Age: {}", or_dash(identity.age.map(|v| v.to_string()))),
        format!("Position: {}", or_dash(identity.position.clone())),
        format!("Value: {}", display_market_value(identity.current_market_value)),
        format!("Club: {}", or_dash(identity.club.clone())),
        format!("Nationality: {}", or_dash(nationality)),
        format!("Flag: {flag}"),
        String::new(),
        format!("Portrait: {}", asset(&state.media.portrait_url)),
        format!("Badge: {}", asset(&state.media.badge_url)),
    ]
    .join("\n")
}

fn render_season_panel(frame: &mut Frame, area: Rect, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(1),
        ])
        .split(area);

    let tabs = Tabs::new(SEASONS.to_vec())
        .select(state.season_index)
        .block(Block::default().title("Season").borders(Borders::ALL))
        .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(tabs, rows[0]);

    let headline = Paragraph::new(headline_text(state))
        .block(Block::default().title("Prediction").borders(Borders::ALL));
    frame.render_widget(headline, rows[1]);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);

    render_radar(frame, cols[0], state);

    let perf = Paragraph::new(performance_text(state))
        .block(Block::default().title("Season Performance").borders(Borders::ALL));
    frame.render_widget(perf, cols[1]);
}

fn headline_text(state: &AppState) -> String {
    if let Some(msg) = forecast_placeholder(state) {
        return msg.to_string();
    }
    let Some(season) = state.snapshot() else {
        return format!("Rating: {PLACEHOLDER}\nValue: {PLACEHOLDER}");
    };
    let change = season.predict_rating_change;
    let arrow = match rating_change_arrow(change) {
        "" => String::new(),
        arrow => format!("{arrow} "),
    };
    format!(
        "Rating: {}  {arrow}{}\nValue: {}",
        display_rounded(season.predict_overall),
        display_rating_change(change),
        display_market_value(season.predict_value)
    )
}

fn forecast_placeholder(state: &AppState) -> Option<&'static str> {
    match state.forecast_status {
        ForecastStatus::NotRequested => Some("Search for a player to see predictions"),
        ForecastStatus::Loading => Some("Loading…"),
        ForecastStatus::Unavailable => Some("Forecast unavailable"),
        ForecastStatus::Ready => None,
    }
}

fn performance_text(state: &AppState) -> String {
    let Some(season) = state.snapshot() else {
        return forecast_placeholder(state).unwrap_or(PLACEHOLDER).to_string();
    };
    let mut lines = vec![
        format!("Goals: {}", display_ceil(season.predicted_goals)),
        format!("Assists: {}", display_ceil(season.predicted_assists)),
        format!("Def Contrib.: {}", display_defensive_contributions(season)),
        format!("Key Passes: {}", display_ceil(season.predicted_key_passes)),
        String::new(),
    ];
    for metric in RADAR_AXES {
        lines.push(format!("{}: {}", metric.label(), display_ceil(metric.read(season))));
    }
    lines.join("\n")
}

fn render_radar(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Attributes").borders(Borders::ALL);
    let Some(season) = state.snapshot() else {
        frame.render_widget(Paragraph::new(PLACEHOLDER).block(block), area);
        return;
    };
    let points = projection::radar_coordinates_for(season, (0.0, 0.0), 1.0);
    let outline = projection::radar_coordinates_for(
        &full_attributes(),
        (0.0, 0.0),
        1.0,
    );

    // Canvas y grows upward; radar geometry is in screen space.
    let canvas = Canvas::default()
        .block(block)
        .x_bounds([-1.4, 1.4])
        .y_bounds([-1.3, 1.3])
        .paint(move |ctx| {
            for i in 0..outline.len() {
                let a = outline[i];
                let b = outline[(i + 1) % outline.len()];
                ctx.draw(&CanvasLine {
                    x1: a.x,
                    y1: -a.y,
                    x2: b.x,
                    y2: -b.y,
                    color: Color::DarkGray,
                });
            }
            ctx.layer();
            for i in 0..points.len() {
                let a = points[i];
                let b = points[(i + 1) % points.len()];
                ctx.draw(&CanvasLine {
                    x1: a.x,
                    y1: -a.y,
                    x2: b.x,
                    y2: -b.y,
                    color: Color::Cyan,
                });
            }
            for p in outline {
                ctx.print(p.x * 1.2, -p.y * 1.15, p.metric.label());
            }
        });
    frame.render_widget(canvas, area);
}

fn full_attributes() -> SeasonForecast {
    let max = Some(projection::RADAR_STAT_MAX);
    SeasonForecast {
        predict_pace: max,
        predict_shooting: max,
        predict_passing: max,
        predict_dribbling: max,
        predict_defending: max,
        predict_physic: max,
        ..Default::default()
    }
}

fn render_progression(frame: &mut Frame, area: Rect, state: &AppState) {
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(area);

    let forecast = state.forecast.as_deref();
    if forecast.is_none() {
        let titles = ["Market Value", "Rating/Potential", "Goals & Assists"];
        for (col, title) in cols.iter().zip(titles) {
            let msg = forecast_placeholder(state).unwrap_or(PLACEHOLDER);
            let empty = Paragraph::new(msg)
                .style(Style::default().fg(Color::DarkGray))
                .block(Block::default().title(title).borders(Borders::ALL));
            frame.render_widget(empty, *col);
        }
        return;
    }

    let value: Vec<(f64, f64)> = projection::value_series(forecast)
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, projection::market_value_millions(p.value)))
        .collect();
    let ratings = projection::rating_series(forecast);
    let rating: Vec<(f64, f64)> = ratings
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.rating))
        .collect();
    let potential: Vec<(f64, f64)> = ratings
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.potential))
        .collect();
    let ga = projection::goals_assists_series(forecast);
    let goals: Vec<(f64, f64)> = ga
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.goals))
        .collect();
    let assists: Vec<(f64, f64)> = ga
        .iter()
        .enumerate()
        .map(|(i, p)| (i as f64, p.assists))
        .collect();

    let value_chart = line_chart(
        "Market Value ($M)",
        vec![series("value", &value, Color::Cyan)],
        max_y(&[&value]),
    );
    frame.render_widget(value_chart, cols[0]);

    let rating_chart = line_chart(
        "Rating/Potential",
        vec![
            series("rating", &rating, Color::Cyan),
            series("potential", &potential, Color::Yellow),
        ],
        max_y(&[&rating, &potential]),
    );
    frame.render_widget(rating_chart, cols[1]);

    let ga_chart = line_chart(
        "Goals & Assists",
        vec![
            series("goals", &goals, Color::Cyan),
            series("assists", &assists, Color::Yellow),
        ],
        max_y(&[&goals, &assists]),
    );
    frame.render_widget(ga_chart, cols[2]);
}

fn series<'a>(name: &'a str, data: &'a [(f64, f64)], color: Color) -> Dataset<'a> {
    Dataset::default()
        .name(name)
        .marker(symbols::Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(color))
        .data(data)
}

fn line_chart<'a>(title: &'a str, datasets: Vec<Dataset<'a>>, y_max: f64) -> Chart<'a> {
    let x_labels = vec![
        Span::raw(SEASONS[0]),
        Span::raw(SEASONS[SEASON_COUNT / 2]),
        Span::raw(SEASONS[SEASON_COUNT - 1]),
    ];
    let y_labels = vec![
        Span::raw("0"),
        Span::raw(format!("{:.1}", y_max / 2.0)),
        Span::raw(format!("{y_max:.1}")),
    ];
    Chart::new(datasets)
        .block(Block::default().title(title).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .bounds([0.0, (SEASON_COUNT - 1) as f64])
                .labels(x_labels)
                .style(Style::default().fg(Color::DarkGray)),
        )
        .y_axis(
            Axis::default()
                .bounds([0.0, y_max])
                .labels(y_labels)
                .style(Style::default().fg(Color::DarkGray)),
        )
}

fn max_y(sets: &[&[(f64, f64)]]) -> f64 {
    let max = sets
        .iter()
        .flat_map(|set| set.iter().map(|(_, y)| *y))
        .fold(0.0_f64, f64::max);
    if max <= 0.0 { 1.0 } else { max * 1.1 }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    let start = state.logs.len().saturating_sub(3);
    state
        .logs
        .iter()
        .skip(start)
        .cloned()
        .collect::<Vec<_>>()
        .join("\n")
}

fn footer_text(state: &AppState) -> String {
    if state.dropdown_visible() {
        "↑/↓ Choose | Enter Select | Esc Clear | F1 Help | Ctrl-C Quit".to_string()
    } else {
        format!(
            "Type to search | Enter Lookup | Tab/←/→ Season ({}) | Esc Clear | F1 Help | Ctrl-C Quit",
            state.season_label()
        )
    }
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "Player Forecast - Help",
        "",
        "Search:",
        "  type         Search players (2+ characters)",
        "  ↑/↓          Move in suggestions",
        "  Enter        Select suggestion / look up typed name",
        "  Esc          Clear search",
        "",
        "Forecast:",
        "  Tab / →      Next season",
        "  Shift-Tab / ← Previous season",
        "",
        "  F1           Toggle help",
        "  Ctrl-C       Quit",
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
