use super::{nav_line, render_status_message, screens_nav};
use crate::models::{Anomaly, Recommendation};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

const GENERAL_TIPS: &[&str] = &[
    "Monitor soil pH levels regularly (optimal: 6.0-7.0)",
    "Rotate crops to maintain soil health",
    "Use organic matter to improve soil structure",
    "Consider companion planting for natural pest control",
];

const FERTILIZER_SCHEDULE: &[(&str, &str)] = &[
    ("Pre-Planting", "Organic compost + Base fertilizer"),
    ("Mid-Season", "Nitrogen boost + Micronutrients"),
    ("Pre-Harvest", "Potassium supplement"),
];

/// Anomaly warnings plus recommendations for the current prediction.
pub struct InsightsScreen<'a> {
    has_prediction: bool,
    anomalies: &'a [Anomaly],
    recommendations: &'a [Recommendation],
    selected_index: usize,
    status_message: Option<&'a str>,
}

impl<'a> InsightsScreen<'a> {
    pub fn new(anomalies: &'a [Anomaly], recommendations: &'a [Recommendation]) -> Self {
        Self {
            has_prediction: true,
            anomalies,
            recommendations,
            selected_index: 0,
            status_message: None,
        }
    }

    pub fn has_prediction(mut self, has_prediction: bool) -> Self {
        self.has_prediction = has_prediction;
        self
    }

    pub fn with_selection(mut self, index: usize) -> Self {
        self.selected_index = index;
        self
    }

    pub fn with_status(mut self, message: Option<&'a str>) -> Self {
        self.status_message = message;
        self
    }
}

impl Widget for InsightsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),      // Title
                Constraint::Percentage(40), // Anomalies
                Constraint::Min(8),         // Recommendations
                Constraint::Length(7),      // Tips and schedule
                Constraint::Length(1),      // Status
                Constraint::Length(1),      // Screen keys
                Constraint::Length(1),      // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Insights", Theme::title()),
            Span::styled(
                format!(
                    " ({} warnings, {} recommendations)",
                    self.anomalies.len(),
                    self.recommendations.len()
                ),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        if self.has_prediction {
            self.render_anomalies(chunks[1], buf);

            let content = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                .split(chunks[2]);
            self.render_list(content[0], buf);
            self.render_details(content[1], buf);
        } else {
            Paragraph::new(Span::styled(
                "Make a prediction to see warnings and recommendations",
                Theme::dim(),
            ))
            .render(chunks[1], buf);
        }

        let bottom = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[3]);
        render_tips(bottom[0], buf);
        render_schedule(bottom[1], buf);

        render_status_message(self.status_message, chunks[4], buf);
        Paragraph::new(nav_line(&[("↑↓", "Navigate Recommendations")])).render(chunks[5], buf);
        Paragraph::new(screens_nav()).render(chunks[6], buf);
    }
}

impl InsightsScreen<'_> {
    fn render_anomalies(&self, area: Rect, buf: &mut Buffer) {
        if self.anomalies.is_empty() {
            let block = Block::default()
                .title(Span::styled("System Status: Normal", Theme::success()))
                .borders(Borders::ALL)
                .border_style(Theme::border());
            let inner = block.inner(area);
            block.render(area, buf);

            let lines = vec![
                Line::from(Span::styled("✓ All Systems Normal", Theme::success())),
                Line::from(Span::styled(
                    "No anomalies detected. Your prediction parameters are within expected ranges.",
                    Theme::dim(),
                )),
            ];
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(inner, buf);
            return;
        }

        let block = Block::default()
            .title(Span::styled("Anomaly Detection & Warnings", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines = Vec::new();
        for anomaly in self.anomalies {
            let style = Style::default().fg(anomaly.severity.color());
            lines.push(Line::from(vec![
                Span::styled(format!("{} ", anomaly.severity.symbol()), style),
                Span::styled(&anomaly.title, style),
                Span::styled(
                    format!(" [{}]", anomaly.severity.as_str().to_uppercase()),
                    Theme::dim(),
                ),
            ]));
            lines.push(Line::from(Span::styled(
                format!("  {}", anomaly.description),
                Theme::normal(),
            )));
            if !anomaly.reasons.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  Possible causes: {}", anomaly.reasons.join("; ")),
                    Theme::dim(),
                )));
            }
            if !anomaly.suggestions.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("  Suggestions: {}", anomaly.suggestions.join("; ")),
                    Theme::dim(),
                )));
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }

    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Recommendations")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.recommendations.is_empty() {
            let lines = vec![
                Line::from(Span::styled(
                    "No specific recommendations at this time.",
                    Theme::dim(),
                )),
                Line::from(Span::styled(
                    "Your current conditions look optimal!",
                    Theme::success(),
                )),
            ];
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .recommendations
            .iter()
            .enumerate()
            .map(|(i, rec)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };

                let priority_style = Style::default().fg(rec.priority.color());
                let line = Line::from(vec![
                    Span::styled(format!("{} ", rec.priority.symbol()), priority_style),
                    Span::styled(&rec.title, Theme::normal()),
                ]);

                ListItem::new(line).style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_details(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Details")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(rec) = self.recommendations.get(self.selected_index) else {
            return;
        };

        let mut lines = vec![
            Line::from(Span::styled(&rec.title, Theme::header())),
            Line::from(vec![
                Span::styled("Priority: ", Theme::dim()),
                Span::styled(
                    rec.priority.as_str(),
                    Style::default().fg(rec.priority.color()),
                ),
                Span::styled("  Category: ", Theme::dim()),
                Span::styled(
                    rec.category.as_str(),
                    Style::default().fg(rec.category.color()),
                ),
            ]),
            Line::from(vec![]),
            Line::from(Span::styled(&rec.description, Theme::normal())),
        ];

        if !rec.data_points.is_empty() {
            lines.push(Line::from(vec![]));
            lines.push(Line::from(Span::styled("Based on:", Theme::dim())));
            for dp in &rec.data_points {
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}: ", dp.label), Theme::dim()),
                    Span::styled(&dp.value, Theme::highlight()),
                    Span::styled(format!(" ({})", dp.source), Theme::dim()),
                ]));
            }
        }

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}

fn render_tips(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title("General Tips")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    block.render(area, buf);

    let items: Vec<ListItem> = GENERAL_TIPS
        .iter()
        .map(|tip| ListItem::new(Span::styled(format!("• {}", tip), Theme::normal())))
        .collect();
    List::new(items).render(inner, buf);
}

fn render_schedule(area: Rect, buf: &mut Buffer) {
    let block = Block::default()
        .title("Fertilizer Schedule")
        .borders(Borders::ALL)
        .border_style(Theme::border());

    let inner = block.inner(area);
    block.render(area, buf);

    let lines: Vec<Line> = FERTILIZER_SCHEDULE
        .iter()
        .map(|(stage, plan)| {
            Line::from(vec![
                Span::styled(format!("{}: ", stage), Theme::success()),
                Span::styled(*plan, Theme::normal()),
            ])
        })
        .collect();
    Paragraph::new(lines).render(inner, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::{detect_anomalies, generate_recommendations};
    use crate::models::{PredictionInput, PredictionResult};

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn healthy_prediction_shows_all_clear_states() {
        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::empty(area);
        InsightsScreen::new(&[], &[]).render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains("All Systems Normal"));
        assert!(text.contains("No specific recommendations at this time."));
        assert!(text.contains("Pre-Harvest: Potassium supplement"));
    }

    #[test]
    fn lists_warnings_and_recommendations() {
        let input = PredictionInput::new(2024, 1200.0, 1.0, 42.0, "India", "Wheat");
        let result = PredictionResult::new(&input, 4000.0, Some(90));
        let anomalies = detect_anomalies(&input, &result);
        let recs = generate_recommendations(&input, &result, None);

        let area = Rect::new(0, 0, 120, 40);
        let mut buf = Buffer::empty(area);
        InsightsScreen::new(&anomalies, &recs).render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains("Extreme Heat Warning"));
        assert!(text.contains(&recs[0].title));
    }
}
