pub mod board_view;
pub mod charting;
pub mod history_view;
pub mod screen;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

use coordrill::{board::BOARD_SIZE, game::GameState};

use crate::{App, Status};
use board_view::{BoardGeometry, BoardView};

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;
const SIDE_PANEL_WIDTH: u16 = 30;

const ORANGE: Color = Color::Rgb(255, 165, 0);

/// Splits the screen into board, side panel, status line and legend
fn screen_chunks(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1), // status
            Constraint::Length(1), // legend
        ])
        .split(area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(SIDE_PANEL_WIDTH)])
        .split(rows[0]);

    (top[0], top[1], rows[1], rows[2])
}

/// Where the board squares are drawn for a terminal of the given size.
/// Mouse handling uses this too, so clicks land on what is shown.
pub fn board_geometry(area: Rect) -> BoardGeometry {
    let (board, _, _, _) = screen_chunks(area);
    BoardGeometry::fit(board, BOARD_SIZE)
}

/// Countdown colour: red in the last five seconds, orange in the last ten
pub fn countdown_style(remaining_secs: u64) -> Style {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    match remaining_secs {
        0..=5 => bold.fg(Color::Red),
        6..=10 => bold.fg(ORANGE),
        _ => bold,
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.game.snapshot();
        let summary = snapshot.summary;

        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let (board_area, panel_area, status_area, legend_area) = screen_chunks(area);

        BoardView {
            board: self.game.board(),
            geometry: BoardGeometry::fit(board_area, BOARD_SIZE),
            show_coordinates: self.settings.show_coordinates,
            cursor: Some(self.cursor),
        }
        .render(board_area, buf);

        let mut lines = vec![];
        match (&snapshot.state, &snapshot.target) {
            (GameState::Active, Some(target)) => {
                lines.push(Line::from(Span::styled("Find", dim_style)));
                lines.push(Line::from(Span::styled(
                    target.clone(),
                    bold_style.fg(Color::Yellow),
                )));
                lines.push(Line::default());
                lines.push(Line::from(vec![
                    Span::raw("Time left: "),
                    Span::styled(
                        format!("{}s", snapshot.remaining_secs),
                        countdown_style(snapshot.remaining_secs),
                    ),
                ]));
            }
            _ => {
                lines.push(Line::from(Span::styled(
                    "Press (s) to start",
                    bold_style.fg(Color::Yellow),
                )));
                lines.push(Line::from(Span::styled(
                    format!("{}s per session", snapshot.duration_secs),
                    dim_style,
                )));
            }
        }

        lines.push(Line::default());
        lines.push(Line::from(format!("Score: {}", summary.score)));
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} correct", summary.correct),
                Style::default().fg(Color::Green),
            ),
            Span::raw(" / "),
            Span::styled(
                format!("{} wrong", summary.wrong),
                Style::default().fg(Color::Red),
            ),
        ]));
        lines.push(Line::from(format!("Accuracy: {:.1}%", summary.accuracy_pct)));
        lines.push(Line::from(format!("Avg time: {:.2}s", summary.avg_response_time)));
        lines.push(Line::from(if summary.correct > 0 {
            format!("Fastest: {:.2}s", summary.fastest_response)
        } else {
            "Fastest: -".to_string()
        }));

        lines.push(Line::default());
        lines.push(Line::from(Span::styled(
            format!("Playing as {}", snapshot.perspective),
            italic_style,
        )));

        let history = self.game.history();
        if !history.is_empty() {
            lines.push(Line::from(Span::styled(
                format!(
                    "{} sessions, best {}",
                    history.len(),
                    history.best_score().unwrap_or_default()
                ),
                italic_style,
            )));
        }

        if let (GameState::Idle, Some(last)) = (&snapshot.state, &self.last_result) {
            lines.push(Line::default());
            lines.push(Line::from(Span::styled("Last session", bold_style)));
            lines.push(Line::from(format!(
                "{} pts, {:.0}% in {} clicks",
                last.score,
                last.accuracy_pct,
                last.correct + last.wrong
            )));
        }

        Paragraph::new(lines)
            .block(Block::default().borders(Borders::LEFT))
            .wrap(Wrap { trim: true })
            .render(panel_area, buf);

        if let Some(status) = &self.status {
            let (text, style) = match status {
                Status::Info(msg) => (msg.as_str(), italic_style.fg(Color::Cyan)),
                Status::Error(msg) => (msg.as_str(), bold_style.fg(Color::Red)),
            };
            Paragraph::new(Span::styled(text, style))
                .alignment(Alignment::Center)
                .render(status_area, buf);
        }

        Paragraph::new(Span::styled(
            "(s)tart / (x) stop / (f)lip / (c)oords / (w)rite / (l)oad / (u)nload / (h)istory / (esc)ape",
            italic_style,
        ))
        .render(legend_area, buf);
    }
}
