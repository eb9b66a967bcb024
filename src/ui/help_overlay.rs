//! Help overlay listing the viewer's keys

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Key bindings grouped by section, as shown in the overlay
const SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Filters",
        &[
            ("/", "Search station names"),
            ("Enter", "Finish editing search"),
            ("←/h, →/l", "Previous/next province"),
            ("c, Esc", "Clear filters"),
        ],
    ),
    (
        "Navigation",
        &[("↑/k, ↓/j", "Scroll stations"), ("g", "Back to top")],
    ),
    (
        "Other",
        &[
            ("r", "Reload cached data"),
            ("?", "Toggle this help"),
            ("q", "Quit application"),
        ],
    ),
];

const OVERLAY_WIDTH: u16 = 48;

/// Renders the help overlay centered over the current view
pub fn render(frame: &mut Frame) {
    let lines = help_lines();
    // Content plus the two border rows
    let height = lines.len() as u16 + 2;
    let area = centered(frame.area(), OVERLAY_WIDTH, height);

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .title(" Help ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        ),
        area,
    );
}

fn help_lines() -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (section, keys) in SECTIONS {
        if !lines.is_empty() {
            lines.push(Line::from(""));
        }
        lines.push(Line::from(Span::styled(
            *section,
            Style::default().add_modifier(Modifier::BOLD),
        )));
        lines.extend(keys.iter().map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("  {:<10}", key), Style::default().fg(Color::Yellow)),
                Span::raw(*action),
            ])
        }));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Esc, ? or q closes",
        Style::default().fg(Color::DarkGray),
    )));
    lines
}

/// A `width` x `height` rect in the middle of `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height.min(area.height))])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width.min(area.width))])
        .flex(Flex::Center)
        .areas(row);
    cell
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_help_overlay_renders() {
        let backend = TestBackend::new(80, 24);
        let mut terminal = Terminal::new(backend).unwrap();

        terminal
            .draw(|frame| {
                render(frame);
            })
            .unwrap();

        let buffer = terminal.backend().buffer();
        let content: String = buffer.content().iter().map(|cell| cell.symbol()).collect();

        assert!(content.contains("Help"), "Should render help title");
        assert!(content.contains("Filters"), "Should show filters section");
        assert!(content.contains("Reload cached data"));
    }

    #[test]
    fn test_centered_stays_inside_small_area() {
        let area = Rect::new(0, 0, 30, 10);
        let rect = centered(area, OVERLAY_WIDTH, 20);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 10);

        let rect = centered(Rect::new(0, 0, 80, 24), 40, 10);
        assert_eq!((rect.x, rect.y), (20, 7));
    }

    #[test]
    fn test_every_binding_is_listed() {
        let text: String = help_lines()
            .iter()
            .flat_map(|line| line.spans.iter().map(|s| s.content.to_string()))
            .collect();
        for (_, keys) in SECTIONS {
            for (_, action) in *keys {
                assert!(text.contains(action), "missing {}", action);
            }
        }
    }
}
