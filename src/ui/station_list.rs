//! Station list screen rendering
//!
//! Renders the filter bar, the freshness and count line, and the stations
//! grouped by province with the search text highlighted in each name.

use chrono::{Local, Utc};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, InputMode};
use crate::data::WeatherReading;
use crate::view::{highlight, Card, Dashboard, Freshness};

/// Color for temperature (warmer = more red, cooler = more blue)
fn temperature_color(temp: Option<f64>) -> Color {
    match temp {
        None => Color::Gray,
        Some(t) if t >= 30.0 => Color::Red,
        Some(t) if t >= 25.0 => Color::LightRed,
        Some(t) if t >= 20.0 => Color::Yellow,
        Some(t) if t >= 10.0 => Color::Green,
        Some(t) if t >= 0.0 => Color::Cyan,
        Some(_) => Color::Blue,
    }
}

/// Renders the station list view
pub fn render_station_list(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Filter bar
            Constraint::Length(1), // Freshness and counts
            Constraint::Min(0),    // Stations
            Constraint::Length(1), // Key hints
        ])
        .split(frame.area());

    render_filter_bar(frame, app, chunks[0]);

    match (&app.load_error, app.dashboard()) {
        (Some(error), _) => render_message(
            frame,
            chunks[2],
            &format!("Error loading weather data: {}", error),
            Color::Red,
        ),
        (None, Some(dashboard)) => {
            render_meta(frame, app, &dashboard, chunks[1]);
            match &dashboard.message {
                Some(message) => render_message(frame, chunks[2], message, Color::Yellow),
                None => render_groups(frame, app, &dashboard, chunks[2]),
            }
        }
        (None, None) => render_message(frame, chunks[2], "Loading weather data...", Color::Cyan),
    }

    render_footer(frame, app, chunks[3]);
}

fn render_filter_bar(frame: &mut Frame, app: &App, area: Rect) {
    let province = match app.filters.province() {
        "" => "All provinces",
        p => p,
    };

    let search_style = if app.input_mode == InputMode::Search {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let mut search_text = app.search_input.clone();
    if app.input_mode == InputMode::Search {
        search_text.push('_');
    } else if search_text.is_empty() {
        search_text = "Search city...".to_string();
    }

    let clear_label = match app.filters.active_count() {
        0 => " [c] Clear".to_string(),
        n => format!(" [c] Clear ({})", n),
    };

    let line = Line::from(vec![
        Span::styled("◀ ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            province.to_string(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" ▶", Style::default().fg(Color::DarkGray)),
        Span::raw("   / "),
        Span::styled(search_text, search_style),
        Span::styled(
            clear_label,
            if app.filters.is_active() {
                Style::default().fg(Color::LightRed)
            } else {
                Style::default().fg(Color::DarkGray)
            },
        ),
    ]);

    let block = Block::default()
        .title(" SMN Argentina weather ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn render_meta(frame: &mut Frame, app: &App, dashboard: &Dashboard<'_>, area: Rect) {
    let Some(envelope) = &app.envelope else {
        return;
    };
    let freshness = Freshness::since(envelope.timestamp, Utc::now());
    let stats = dashboard.stats;

    let mut spans = vec![
        Span::raw(" Updated "),
        Span::raw(
            envelope
                .timestamp
                .with_timezone(&Local)
                .format("%H:%M")
                .to_string(),
        ),
        Span::raw(" ("),
        Span::styled(
            freshness.label,
            Style::default().fg(if freshness.fresh {
                Color::Green
            } else {
                Color::Yellow
            }),
        ),
        Span::raw(format!(
            ")  Stations: {}  Provinces: {}",
            stats.total_stations, stats.provinces_shown
        )),
    ];
    if app.filters.is_active() {
        spans.push(Span::raw(format!("  Matching: {}", stats.matching_stations)));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::Gray)),
        area,
    );
}

fn render_groups(frame: &mut Frame, app: &App, dashboard: &Dashboard<'_>, area: Rect) {
    let mut lines = Vec::new();

    for group in &dashboard.groups {
        lines.push(Line::from(vec![
            Span::styled(
                group.province.to_string(),
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  {} stations", group.stations.len()),
                Style::default().fg(Color::DarkGray),
            ),
        ]));
        for station in &group.stations {
            lines.push(station_line(station, app.filters.search()));
        }
        lines.push(Line::from(""));
    }

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::NONE))
        .scroll((app.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn station_line(reading: &WeatherReading, search: &str) -> Line<'static> {
    let card = Card::from_reading(reading);
    let mut spans = vec![Span::raw("  ")];

    let mut name_width = 0;
    for segment in highlight(&card.name, search) {
        name_width += segment.text.chars().count();
        let style = if segment.matched {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().add_modifier(Modifier::BOLD)
        };
        spans.push(Span::styled(segment.text, style));
    }
    spans.push(Span::raw(" ".repeat(28usize.saturating_sub(name_width))));

    let temp = reading.weather.as_ref().and_then(|w| w.temp);
    spans.push(Span::styled(
        format!("{:>8}", card.temperature),
        Style::default().fg(temperature_color(temp)),
    ));
    spans.push(Span::raw(format!(
        "  {:>5} hum  {:>9} {:<6}  ",
        card.humidity, card.wind_speed, card.wind_direction
    )));
    spans.push(Span::styled(
        card.description,
        Style::default().fg(Color::Gray),
    ));

    Line::from(spans)
}

fn render_message(frame: &mut Frame, area: Rect, message: &str, color: Color) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let hints = match app.input_mode {
        InputMode::Search => " Enter: done  Esc: clear filters  Backspace: delete",
        InputMode::Normal => " /: search  ←/→: province  c: clear  r: reload  ?: help  q: quit",
    };
    frame.render_widget(
        Paragraph::new(hints).style(Style::default().fg(Color::DarkGray)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::EnvelopeStore;
    use crate::data::{FetchEnvelope, StationWeather};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::{backend::TestBackend, Terminal};
    use tempfile::TempDir;

    fn loaded_app(dir: &TempDir) -> App {
        let store = EnvelopeStore::new(dir.path().join("weather_data.json"));
        store
            .write(&FetchEnvelope::success(
                vec![
                    WeatherReading {
                        name: Some("Ushuaia".to_string()),
                        province: Some("Tierra del Fuego".to_string()),
                        weather: Some(StationWeather {
                            temp: Some(-2.0),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                    WeatherReading {
                        name: Some("Bariloche".to_string()),
                        province: Some("Río Negro".to_string()),
                        ..Default::default()
                    },
                ],
                "http://test",
            ))
            .unwrap();
        let mut app = App::new(store);
        app.load();
        app
    }

    fn render_to_string(app: &App) -> String {
        let backend = TestBackend::new(100, 24);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal
            .draw(|frame| render_station_list(frame, app))
            .unwrap();
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_temperature_color() {
        assert_eq!(temperature_color(None), Color::Gray);
        assert_eq!(temperature_color(Some(31.0)), Color::Red);
        assert_eq!(temperature_color(Some(15.0)), Color::Green);
        assert_eq!(temperature_color(Some(-5.0)), Color::Blue);
    }

    #[test]
    fn test_renders_groups_and_stations() {
        let dir = TempDir::new().unwrap();
        let app = loaded_app(&dir);
        let content = render_to_string(&app);

        assert!(content.contains("Tierra del Fuego"));
        assert!(content.contains("Ushuaia"));
        assert!(content.contains("-2°C"));
        assert!(content.contains("All provinces"));
        assert!(content.contains("Stations: 2"));
    }

    #[test]
    fn test_renders_no_results_message() {
        let dir = TempDir::new().unwrap();
        let mut app = loaded_app(&dir);
        app.handle_key(KeyEvent::new(KeyCode::Char('/'), KeyModifiers::NONE));
        for c in "xyz".chars() {
            app.handle_key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE));
        }

        let content = render_to_string(&app);
        assert!(content.contains("No cities containing"));
        assert!(content.contains("Clear (1)"));
    }

    #[test]
    fn test_renders_load_error_inline() {
        let dir = TempDir::new().unwrap();
        let mut app = App::new(EnvelopeStore::new(dir.path().join("missing.json")));
        app.load();

        let content = render_to_string(&app);
        assert!(content.contains("Error loading weather data"));
    }

    #[test]
    fn test_highlighted_segment_is_styled() {
        let line = station_line(
            &WeatherReading {
                name: Some("Bariloche".to_string()),
                ..Default::default()
            },
            "lo",
        );
        let marked: Vec<_> = line
            .spans
            .iter()
            .filter(|s| s.style.bg == Some(Color::Yellow))
            .map(|s| s.content.to_string())
            .collect();
        assert_eq!(marked, vec!["lo"]);
    }
}
