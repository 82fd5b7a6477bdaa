use super::{nav_line, render_status_message, screens_nav};
use crate::app::{FormField, FormState};
use crate::models::catalog::{COUNTRIES, CROP_ITEMS};
use crate::ui::components::{InputWidget, SelectWidget};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};

pub struct FormScreen<'a> {
    state: &'a FormState,
    predicting: bool,
    status_message: Option<&'a str>,
}

impl<'a> FormScreen<'a> {
    pub fn new(state: &'a FormState) -> Self {
        Self {
            state,
            predicting: false,
            status_message: None,
        }
    }

    pub fn predicting(mut self, predicting: bool) -> Self {
        self.predicting = predicting;
        self
    }

    pub fn with_status(mut self, message: Option<&'a str>) -> Self {
        self.status_message = message;
        self
    }
}

impl Widget for FormScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),  // Title
                Constraint::Length(11), // Form (3 rows of paired fields)
                Constraint::Min(4),     // Help
                Constraint::Length(1),  // Status
                Constraint::Length(1),  // Screen keys
                Constraint::Length(1),  // Nav
            ])
            .split(area);

        let mut title = vec![
            Span::styled("Crop Yield Prediction", Theme::title()),
            Span::styled(" - Enter field conditions", Theme::dim()),
        ];
        if self.predicting {
            title.push(Span::styled("  Predicting...", Theme::highlight()));
        }
        Paragraph::new(Line::from(title)).render(chunks[0], buf);

        self.render_form(chunks[1], buf);
        self.render_help(chunks[2], buf);
        render_status_message(self.status_message, chunks[3], buf);

        let keys = if self.state.editing {
            nav_line(&[("Enter", "Save Field"), ("Esc", "Cancel")])
        } else {
            nav_line(&[
                ("↑↓", "Navigate"),
                ("Enter", "Edit"),
                ("←→", "Choose"),
                ("p", "Predict"),
                ("n", "Clear"),
            ])
        };
        Paragraph::new(keys).render(chunks[4], buf);
        Paragraph::new(screens_nav()).render(chunks[5], buf);
    }
}

impl FormScreen<'_> {
    fn render_form(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Field Conditions")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3); 3])
            .split(inner);

        for (row, pair) in rows.iter().zip(FormField::all().chunks(2)) {
            let cells = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                .split(*row);

            for (cell, field) in cells.iter().zip(pair) {
                self.render_field(*field, *cell, buf);
            }
        }
    }

    fn render_field(&self, field: FormField, area: Rect, buf: &mut Buffer) {
        let focused = field == self.state.focused_field;

        match field {
            FormField::Country => SelectWidget::new(field.label(), COUNTRIES, self.state.country_index)
                .placeholder(field.placeholder())
                .focused(focused)
                .render(area, buf),
            FormField::Item => SelectWidget::new(field.label(), CROP_ITEMS, self.state.crop_index)
                .placeholder(field.placeholder())
                .focused(focused)
                .render(area, buf),
            _ => {
                let editing = focused && self.state.editing;
                let value = if editing {
                    self.state.edit_buffer.as_str()
                } else {
                    self.state.text_value(field)
                };
                InputWidget::new(field.label(), value)
                    .placeholder(field.placeholder())
                    .focused(focused)
                    .editing(editing)
                    .render(area, buf)
            }
        }
    }

    fn render_help(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Help")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let help_text = match self.state.focused_field {
            FormField::Year => "Harvest year, 1900 to 2100",
            FormField::Rainfall => "Average annual rainfall in millimetres",
            FormField::Pesticides => "Pesticide use in tonnes",
            FormField::AvgTemp => "Average temperature over the season in °C",
            FormField::Country => "Use ←/→ to pick one of the countries the model was trained on",
            FormField::Item => "Use ←/→ to pick the crop to predict",
        };

        Paragraph::new(Span::styled(help_text, Theme::dim()))
            .wrap(Wrap { trim: true })
            .render(inner, buf);
    }
}
