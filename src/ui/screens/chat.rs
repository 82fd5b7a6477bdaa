use super::{nav_line, render_status_message, screens_nav};
use crate::models::{ChatSession, Sender, QUICK_PROMPTS};
use crate::ui::components::InputWidget;
use crate::ui::Theme;
use chrono::Local;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct ChatScreen<'a> {
    session: &'a ChatSession,
    input: &'a str,
    editing: bool,
    enabled: bool,
    status_message: Option<&'a str>,
}

impl<'a> ChatScreen<'a> {
    pub fn new(session: &'a ChatSession, input: &'a str) -> Self {
        Self {
            session,
            input,
            editing: false,
            enabled: true,
            status_message: None,
        }
    }

    pub fn editing(mut self, editing: bool) -> Self {
        self.editing = editing;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn with_status(mut self, message: Option<&'a str>) -> Self {
        self.status_message = message;
        self
    }
}

impl Widget for ChatScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Min(8),    // Transcript
                Constraint::Length(1), // Quick prompts
                Constraint::Length(3), // Input
                Constraint::Length(1), // Status
                Constraint::Length(1), // Screen keys
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let mut title = vec![
            Span::styled("Farming Assistant", Theme::title()),
            Span::styled(" - Ask about crops, soil and pests", Theme::dim()),
        ];
        if !self.enabled {
            title.push(Span::styled("  (disabled)", Theme::warning()));
        }
        Paragraph::new(Line::from(title)).render(chunks[0], buf);

        self.render_transcript(chunks[1], buf);

        let mut prompts = vec![Span::styled("Quick: ", Theme::dim())];
        for (i, (label, _)) in QUICK_PROMPTS.iter().enumerate() {
            prompts.push(Span::styled(format!("[F{}]", i + 1), Theme::nav_key()));
            prompts.push(Span::styled(format!("{} ", label), Theme::nav_label()));
        }
        Paragraph::new(Line::from(prompts)).render(chunks[2], buf);

        InputWidget::new("Message", self.input)
            .placeholder("Press i to type a question")
            .focused(self.editing)
            .editing(self.editing)
            .render(chunks[3], buf);

        render_status_message(self.status_message, chunks[4], buf);

        let keys = if self.editing {
            nav_line(&[("Enter", "Send"), ("Esc", "Stop Typing")])
        } else {
            nav_line(&[("i", "Type")])
        };
        Paragraph::new(keys).render(chunks[5], buf);
        Paragraph::new(screens_nav()).render(chunks[6], buf);
    }
}

impl ChatScreen<'_> {
    fn render_transcript(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Conversation")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let mut lines: Vec<Line> = Vec::new();
        for message in &self.session.messages {
            let (who, color) = match message.sender {
                Sender::User => ("You", Theme::USER_MESSAGE),
                Sender::Bot => ("Assistant", Theme::BOT_MESSAGE),
            };
            lines.push(Line::from(vec![
                Span::styled(who, Style::default().fg(color)),
                Span::styled(
                    format!(
                        " {}",
                        message.timestamp.with_timezone(&Local).format("%H:%M")
                    ),
                    Theme::dim(),
                ),
            ]));
            for text_line in message.text.lines() {
                lines.push(Line::from(Span::styled(text_line, Theme::normal())));
            }
            lines.push(Line::from(vec![]));
        }

        if self.session.pending {
            lines.push(Line::from(Span::styled("Assistant is typing...", Theme::dim())));
        }

        // Show the tail of the conversation; wrapped lines are approximated
        // by counting each as one row.
        let visible = inner.height as usize;
        let skip = lines.len().saturating_sub(visible);
        let tail: Vec<Line> = lines.into_iter().skip(skip).collect();

        Paragraph::new(tail)
            .wrap(Wrap { trim: false })
            .render(inner, buf);
    }
}
