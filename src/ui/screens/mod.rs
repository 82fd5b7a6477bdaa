pub mod chat;
pub mod form;
pub mod history;
pub mod insights;
pub mod location;
pub mod results;

pub use chat::ChatScreen;
pub use form::FormScreen;
pub use history::HistoryScreen;
pub use insights::InsightsScreen;
pub use location::LocationScreen;
pub use results::ResultsScreen;

use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// `[key]Label` pairs for the bottom navigation row.
pub(crate) fn nav_line<'a>(items: &[(&'a str, &'a str)]) -> Line<'a> {
    let spans: Vec<Span> = items
        .iter()
        .enumerate()
        .flat_map(|(i, (key, label))| {
            let label = if i + 1 < items.len() {
                format!("{} ", label)
            } else {
                label.to_string()
            };
            [
                Span::styled(format!("[{}]", key), Theme::nav_key()),
                Span::styled(label, Theme::nav_label()),
            ]
        })
        .collect();
    Line::from(spans)
}

/// Screen switcher shown under every screen's own keys.
pub(crate) fn screens_nav() -> Line<'static> {
    nav_line(&[
        ("1", "Predict"),
        ("2", "Results"),
        ("3", "Insights"),
        ("4", "History"),
        ("5", "Chat"),
        ("6", "Location"),
        ("q", "Quit"),
    ])
}

pub(crate) fn render_status_message(message: Option<&str>, area: Rect, buf: &mut Buffer) {
    if let Some(msg) = message {
        let lowered = msg.to_lowercase();
        let style = if lowered.contains("error") || lowered.contains("failed") {
            Theme::error()
        } else if ["offline", "unavailable", "missing", "invalid", "disabled", "not "]
            .iter()
            .any(|word| lowered.contains(word))
        {
            Theme::warning()
        } else {
            Theme::success()
        };
        Paragraph::new(Span::styled(msg, style)).render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nav_line_pairs_keys_with_labels() {
        let line = nav_line(&[("Enter", "Edit"), ("Esc", "Back")]);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "[Enter]Edit [Esc]Back");
    }

    #[test]
    fn status_color_follows_message() {
        let area = Rect::new(0, 0, 40, 1);
        let cases = [
            ("Export failed: disk full", Theme::ERROR),
            ("OpenWeatherMap is not configured", Theme::WARNING),
            ("History cleared", Theme::SUCCESS),
        ];
        for (message, color) in cases {
            let mut buf = Buffer::empty(area);
            render_status_message(Some(message), area, &mut buf);
            assert_eq!(buf[(0, 0)].fg, color, "{}", message);
        }
    }
}
