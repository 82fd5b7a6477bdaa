use super::{nav_line, render_status_message, screens_nav};
use crate::app::LocationState;
use crate::models::{Location, WeatherSnapshot};
use crate::ui::components::{GaugeWidget, InputWidget};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

pub struct LocationScreen<'a> {
    state: &'a LocationState,
    location: Option<&'a Location>,
    weather: Option<&'a WeatherSnapshot>,
    weather_enabled: bool,
    status_message: Option<&'a str>,
}

impl<'a> LocationScreen<'a> {
    pub fn new(state: &'a LocationState) -> Self {
        Self {
            state,
            location: None,
            weather: None,
            weather_enabled: true,
            status_message: None,
        }
    }

    pub fn current(
        mut self,
        location: Option<&'a Location>,
        weather: Option<&'a WeatherSnapshot>,
    ) -> Self {
        self.location = location;
        self.weather = weather;
        self
    }

    pub fn weather_enabled(mut self, enabled: bool) -> Self {
        self.weather_enabled = enabled;
        self
    }

    pub fn with_status(mut self, message: Option<&'a str>) -> Self {
        self.status_message = message;
        self
    }
}

impl Widget for LocationScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(3), // Search box
                Constraint::Min(8),    // Results and weather
                Constraint::Length(1), // Status
                Constraint::Length(1), // Screen keys
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let mut title = vec![
            Span::styled("Location & Weather", Theme::title()),
            Span::styled(" - Current conditions feed the recommendations", Theme::dim()),
        ];
        if !self.weather_enabled {
            title.push(Span::styled(
                "  (OpenWeatherMap not configured)",
                Theme::warning(),
            ));
        }
        Paragraph::new(Line::from(title)).render(chunks[0], buf);

        InputWidget::new("Search place", &self.state.query)
            .placeholder("Press / to search for a city")
            .focused(self.state.editing)
            .editing(self.state.editing)
            .render(chunks[1], buf);

        let content = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[2]);

        self.render_results(content[0], buf);
        self.render_weather(content[1], buf);

        render_status_message(self.status_message, chunks[3], buf);

        let keys = if self.state.editing {
            nav_line(&[("Enter", "Search"), ("Esc", "Cancel")])
        } else {
            nav_line(&[
                ("/", "Search"),
                ("↑↓", "Navigate"),
                ("Enter", "Use Place"),
                ("c", "Configured Location"),
                ("r", "Refresh Weather"),
            ])
        };
        Paragraph::new(keys).render(chunks[4], buf);
        Paragraph::new(screens_nav()).render(chunks[5], buf);
    }
}

impl LocationScreen<'_> {
    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Search Results")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        if self.state.searching {
            Paragraph::new(Span::styled("Searching...", Theme::dim())).render(inner, buf);
            return;
        }

        if self.state.results.is_empty() {
            Paragraph::new(Span::styled("No results", Theme::dim())).render(inner, buf);
            return;
        }

        let items: Vec<ListItem> = self
            .state
            .results
            .iter()
            .enumerate()
            .map(|(i, location)| {
                let style = if i == self.state.selected_index {
                    Theme::selected()
                } else {
                    Style::default()
                };
                let line = Line::from(vec![
                    Span::styled(location.label(), Theme::normal()),
                    Span::styled(
                        format!("  {:.2}, {:.2}", location.latitude, location.longitude),
                        Theme::dim(),
                    ),
                ]);
                ListItem::new(line).style(style)
            })
            .collect();

        List::new(items).render(inner, buf);
    }

    fn render_weather(&self, area: Rect, buf: &mut Buffer) {
        let title = match self.location {
            Some(location) => format!("Current Weather - {}", location.label()),
            None => "Current Weather".to_string(),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let Some(weather) = self.weather else {
            Paragraph::new(Span::styled(
                "No weather loaded. Choose a place or press c for the configured location.",
                Theme::dim(),
            ))
            .render(inner, buf);
            return;
        };

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(0),
            ])
            .split(inner);

        GaugeWidget::new("Temp", Some(weather.temperature), "°C")
            .range(-10.0, 50.0)
            .precision(0)
            .thresholds(vec![
                (-10.0, Color::LightBlue),
                (15.0, Theme::SUCCESS),
                (30.0, Theme::WARNING),
                (40.0, Theme::ERROR),
            ])
            .inline()
            .render(rows[0], buf);

        GaugeWidget::new("Humidity", Some(weather.humidity as f64), "%")
            .precision(0)
            .thresholds(vec![
                (0.0, Theme::SUCCESS),
                (80.0, Theme::WARNING),
                (90.0, Theme::ERROR),
            ])
            .inline()
            .render(rows[1], buf);

        GaugeWidget::new("Rain (1h)", Some(weather.rainfall), " mm")
            .range(0.0, 20.0)
            .color(Color::LightBlue)
            .inline()
            .render(rows[2], buf);
    }
}
