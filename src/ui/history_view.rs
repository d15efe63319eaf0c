use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph, Widget},
};

use coordrill::history::HistoryEntry;

use crate::ui::charting::{format_label, session_points, x_bounds, y_bounds};
use crate::App;

struct Series {
    name: &'static str,
    color: Color,
    points: Vec<(f64, f64)>,
}

impl Series {
    fn new<F>(name: &'static str, color: Color, entries: &[HistoryEntry], f: F) -> Self
    where
        F: Fn(&HistoryEntry) -> f64,
    {
        Self {
            name,
            color,
            points: session_points(entries.iter().map(f)),
        }
    }
}

/// Renders one chart; `y_floor` clamps the lower bound for values that can't go negative
fn render_chart(
    title: &str,
    y_title: &str,
    series: &[Series],
    y_floor: Option<f64>,
    area: Rect,
    buf: &mut Buffer,
) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let sessions = series.first().map_or(0, |s| s.points.len());

    let all: Vec<&[(f64, f64)]> = series.iter().map(|s| s.points.as_slice()).collect();
    let [mut lo, hi] = y_bounds(&all);
    if let Some(floor) = y_floor {
        lo = lo.max(floor);
    }
    let [x_lo, x_hi] = x_bounds(sessions);

    let datasets = series
        .iter()
        .map(|s| {
            Dataset::default()
                .name(s.name)
                .marker(Marker::Braille)
                .style(Style::default().fg(s.color))
                .graph_type(GraphType::Line)
                .data(&s.points)
        })
        .collect();

    Chart::new(datasets)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .x_axis(
            Axis::default()
                .title("session")
                .bounds([x_lo, x_hi])
                .labels(vec![
                    Span::styled(format_label(x_lo), bold_style),
                    Span::styled(format_label(x_hi), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title(y_title.to_string())
                .bounds([lo, hi])
                .labels(vec![
                    Span::styled(format_label(lo), bold_style),
                    Span::styled(format_label(hi), bold_style),
                ]),
        )
        .render(area, buf);
}

/// Progress charts over every session in the history
pub struct HistoryView<'a> {
    app: &'a App,
}

impl<'a> HistoryView<'a> {
    pub fn new(app: &'a App) -> Self {
        Self { app }
    }
}

impl Widget for HistoryView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let history = self.app.game.history();
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(2)
            .vertical_margin(1)
            .constraints([
                Constraint::Length(1), // summary
                Constraint::Percentage(50),
                Constraint::Percentage(50),
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(
            "(h)/(tab) back / (w)rite / (l)oad / (u)nload / (esc)ape",
            italic_style,
        ))
        .render(rows[3], buf);

        if history.is_empty() {
            Paragraph::new(Span::styled(
                "No sessions yet. Finish a session or (l)oad saved statistics.",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(rows[0], buf);
            return;
        }

        let entries = history.entries();
        Paragraph::new(Span::styled(
            format!(
                "{} sessions   best score {}   last score {}",
                history.len(),
                history.best_score().unwrap_or_default(),
                history.last().map_or(0, |e| e.score),
            ),
            Style::default().add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center)
        .render(rows[0], buf);

        let top = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[1]);
        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(rows[2]);

        render_chart(
            "Score",
            "points",
            &[Series::new("score", Color::Magenta, entries, |e| e.score as f64)],
            None,
            top[0],
            buf,
        );

        let accuracy = Series::new("accuracy", Color::Cyan, entries, |e| e.accuracy_pct);
        render_chart("Accuracy", "%", &[accuracy], Some(0.0), top[1], buf);

        render_chart(
            "Clicks",
            "clicks",
            &[
                Series::new("correct", Color::Green, entries, |e| e.correct as f64),
                Series::new("wrong", Color::Red, entries, |e| e.wrong as f64),
            ],
            Some(0.0),
            bottom[0],
            buf,
        );

        render_chart(
            "Response time",
            "seconds",
            &[
                Series::new("average", Color::Blue, entries, |e| e.avg_response_time),
                Series::new("fastest", Color::Green, entries, |e| e.fastest_response),
                Series::new("slowest", Color::Red, entries, |e| e.slowest_response),
            ],
            Some(0.0),
            bottom[1],
            buf,
        );
    }
}
