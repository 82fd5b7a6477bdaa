use super::{nav_line, render_status_message, screens_nav};
use crate::logic::calculations::format_thousands;
use crate::models::HistoryRecord;
use crate::ui::Theme;
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget, Wrap},
};

pub struct HistoryScreen<'a> {
    records: &'a [HistoryRecord],
    capacity: usize,
    selected_index: usize,
    status_message: Option<&'a str>,
}

impl<'a> HistoryScreen<'a> {
    pub fn new(records: &'a [HistoryRecord], capacity: usize) -> Self {
        Self {
            records,
            capacity,
            selected_index: 0,
            status_message: None,
        }
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

impl Widget for HistoryScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(10),   // Content
                Constraint::Length(1), // Status
                Constraint::Length(1), // Screen keys
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Prediction History", Theme::title()),
            Span::styled(
                format!(" ({} of {} kept)", self.records.len(), self.capacity),
                Theme::dim(),
            ),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(chunks[1]);

        self.render_list(content[0], buf);
        self.render_details(content[1], buf);

        render_status_message(self.status_message, chunks[2], buf);
        Paragraph::new(nav_line(&[
            ("↑↓", "Navigate"),
            ("Enter", "View"),
            ("d", "Delete"),
            ("c", "Clear"),
            ("e", "Export CSV"),
            ("h", "Export HTML"),
        ]))
        .render(chunks[3], buf);
        Paragraph::new(screens_nav()).render(chunks[4], buf);
    }
}

impl HistoryScreen<'_> {
    fn render_list(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Recent Predictions")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.records.is_empty() {
            let lines = vec![
                Line::from(Span::styled(
                    "No prediction history available.",
                    Theme::dim(),
                )),
                Line::from(Span::styled(
                    "Make your first prediction to see it here!",
                    Theme::dim(),
                )),
            ];
            Paragraph::new(lines).render(inner, buf);
            return;
        }

        // Keep the selection on screen
        let visible = inner.height as usize;
        let offset = (self.selected_index + 1).saturating_sub(visible);

        let items: Vec<ListItem> = self
            .records
            .iter()
            .enumerate()
            .skip(offset)
            .take(visible)
            .map(|(i, record)| {
                let style = if i == self.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };

                let band = record.prediction.confidence_band();
                let line = Line::from(vec![
                    Span::styled(
                        record
                            .timestamp
                            .with_timezone(&Local)
                            .format("%m/%d %H:%M")
                            .to_string(),
                        Theme::dim(),
                    ),
                    Span::raw(" "),
                    Span::styled(&record.input.item, Theme::highlight()),
                    Span::styled(format!(" {}", record.input.country), Theme::normal()),
                    Span::styled(
                        format!(" {} kg/ha", format_thousands(record.prediction.yield_value)),
                        Theme::success(),
                    ),
                    Span::styled(
                        format!(" {}%", record.prediction.confidence),
                        Style::default().fg(band.color()),
                    ),
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

        let Some(record) = self.records.get(self.selected_index) else {
            return;
        };

        let field = |label: &'static str, value: String| {
            Line::from(vec![
                Span::styled(format!("{:<14}", label), Theme::dim()),
                Span::styled(value, Theme::normal()),
            ])
        };

        let local = record.timestamp.with_timezone(&Local);
        let lines = vec![
            field("Date", local.format("%Y-%m-%d %H:%M").to_string()),
            field("Crop", record.input.item.clone()),
            field("Country", record.input.country.clone()),
            field("Year", record.input.year.to_string()),
            field("Rainfall", format!("{} mm", record.input.rainfall)),
            field("Temperature", format!("{}°C", record.input.avg_temp)),
            field("Pesticides", format!("{} tonnes", record.input.pesticides)),
            field(
                "Yield",
                format!("{} kg/ha", format_thousands(record.prediction.yield_value)),
            ),
            field("Confidence", format!("{}%", record.prediction.confidence)),
            field("Location", record.location_label()),
            Line::from(vec![]),
            Line::from(Span::styled(format!("id {}", record.id), Theme::dim())),
        ];

        Paragraph::new(lines)
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
