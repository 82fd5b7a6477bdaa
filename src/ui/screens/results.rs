use super::{nav_line, render_status_message, screens_nav};
use crate::logic::calculations::{
    confidence_split, factor_impacts, format_thousands, yield_comparison, TrendPoint,
};
use crate::models::{PredictionInput, PredictionResult, WeatherSnapshot, YIELD_UNIT};
use crate::ui::components::{confidence_gauge, factor_gauge, yield_gauge, GaugeWidget};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct ResultsScreen<'a> {
    input: Option<&'a PredictionInput>,
    prediction: Option<&'a PredictionResult>,
    trend: &'a [TrendPoint],
    weather: Option<&'a WeatherSnapshot>,
    status_message: Option<&'a str>,
}

impl<'a> ResultsScreen<'a> {
    pub fn new(
        input: Option<&'a PredictionInput>,
        prediction: Option<&'a PredictionResult>,
        trend: &'a [TrendPoint],
    ) -> Self {
        Self {
            input,
            prediction,
            trend,
            weather: None,
            status_message: None,
        }
    }

    pub fn with_weather(mut self, weather: Option<&'a WeatherSnapshot>) -> Self {
        self.weather = weather;
        self
    }

    pub fn with_status(mut self, message: Option<&'a str>) -> Self {
        self.status_message = message;
        self
    }
}

impl Widget for ResultsScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // Title
                Constraint::Length(6), // Summary
                Constraint::Length(6), // Factors and confidence
                Constraint::Min(7),    // Comparison and trend
                Constraint::Length(1), // Status
                Constraint::Length(1), // Screen keys
                Constraint::Length(1), // Nav
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled("Prediction Results", Theme::title()),
            Span::styled(" - Yield analysis", Theme::dim()),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        match (self.input, self.prediction) {
            (Some(input), Some(prediction)) => {
                self.render_summary(input, prediction, chunks[1], buf);

                let middle = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                    .split(chunks[2]);
                self.render_factors(prediction, middle[0], buf);
                self.render_confidence(prediction, middle[1], buf);

                let bottom = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
                    .split(chunks[3]);
                self.render_comparison(prediction, bottom[0], buf);
                self.render_trend(bottom[1], buf);
            }
            _ => {
                let block = Block::default()
                    .borders(Borders::ALL)
                    .border_style(Theme::border());
                let inner = block.inner(chunks[1]);
                block.render(chunks[1], buf);
                let lines = vec![
                    Line::from(Span::styled("No prediction yet", Theme::header())),
                    Line::from(Span::styled(
                        "Fill in the form on the Predict screen and press p",
                        Theme::dim(),
                    )),
                ];
                Paragraph::new(lines).render(inner, buf);
            }
        }

        render_status_message(self.status_message, chunks[4], buf);
        Paragraph::new(nav_line(&[("n", "New Prediction"), ("e", "Edit Inputs")]))
            .render(chunks[5], buf);
        Paragraph::new(screens_nav()).render(chunks[6], buf);
    }
}

impl ResultsScreen<'_> {
    fn render_summary(
        &self,
        input: &PredictionInput,
        prediction: &PredictionResult,
        area: Rect,
        buf: &mut Buffer,
    ) {
        let block = Block::default()
            .title(Span::styled("Predicted Yield", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let band = prediction.confidence_band();
        let mut lines = vec![
            Line::from(vec![
                Span::styled(format_thousands(prediction.yield_value), Theme::yield_value()),
                Span::styled(format!(" {}", YIELD_UNIT), Theme::dim()),
                Span::raw("   "),
                Span::styled(
                    format!("{}% confidence", prediction.confidence),
                    Style::default().fg(band.color()),
                ),
            ]),
            Line::from(vec![
                Span::styled(&input.item, Theme::highlight()),
                Span::styled(" in ", Theme::dim()),
                Span::styled(&input.country, Theme::normal()),
                Span::styled(format!(", {}", input.year), Theme::dim()),
            ]),
            Line::from(Span::styled(
                format!(
                    "Rainfall {} mm · Temperature {}°C · Pesticides {} t",
                    input.rainfall, input.avg_temp, input.pesticides
                ),
                Theme::dim(),
            )),
        ];

        if let Some(weather) = self.weather {
            lines.push(Line::from(Span::styled(
                format!(
                    "Now at {}: {:.0}°C, {}% humidity, {} mm rain (1h)",
                    weather.location, weather.temperature, weather.humidity, weather.rainfall
                ),
                Theme::dim(),
            )));
        }

        Paragraph::new(lines).render(inner, buf);
    }

    fn render_factors(&self, prediction: &PredictionResult, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Factor Impact")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let impacts = factor_impacts(&prediction.factors);
        for (i, impact) in impacts.iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            factor_gauge(impact).render(Rect { y, height: 1, ..inner }, buf);
        }
    }

    fn render_confidence(&self, prediction: &PredictionResult, area: Rect, buf: &mut Buffer) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(area);

        confidence_gauge("Model Confidence", prediction.confidence).render(rows[0], buf);

        let (_, uncertainty) = confidence_split(prediction.confidence);
        if rows[1].height > 0 {
            GaugeWidget::new("Uncertainty", Some(uncertainty as f64), "%")
                .precision(0)
                .color(Theme::UNCERTAINTY)
                .inline()
                .render(rows[1], buf);
        }
    }

    fn render_comparison(&self, prediction: &PredictionResult, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Yield Comparison")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let comparison = yield_comparison(prediction.yield_value);
        let bars = [
            ("Predicted", comparison.predicted, Theme::YIELD),
            ("Average", comparison.average, Theme::YIELD_AVERAGE),
            ("Optimal", comparison.optimal, Theme::YIELD_OPTIMAL),
        ];

        for (i, (label, value, color)) in bars.iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            yield_gauge(label, *value, comparison.optimal, *color)
                .render(Rect { y, height: 1, ..inner }, buf);
        }
    }

    fn render_trend(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title("Yield Trend")
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        let max = self
            .trend
            .iter()
            .map(|p| p.yield_value)
            .fold(0.0_f64, f64::max);

        for (i, point) in self.trend.iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.y + inner.height {
                break;
            }
            let year = point.year.to_string();
            yield_gauge(&year, point.yield_value, max, Theme::YIELD)
                .render(Rect { y, height: 1, ..inner }, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::calculations::yield_trend;

    fn screen_text(buf: &Buffer) -> String {
        let area = buf.area;
        let mut text = String::new();
        for y in 0..area.height {
            for x in 0..area.width {
                text.push_str(buf[(x, y)].symbol());
            }
            text.push('\n');
        }
        text
    }

    #[test]
    fn renders_yield_with_separators_and_factors() {
        let input = PredictionInput::new(2024, 1200.0, 1.5, 22.0, "India", "Wheat");
        let prediction = PredictionResult::new(&input, 45123.6, Some(85));
        let trend = yield_trend(&input, &prediction, &[]);

        let area = Rect::new(0, 0, 100, 30);
        let mut buf = Buffer::empty(area);
        ResultsScreen::new(Some(&input), Some(&prediction), &trend).render(area, &mut buf);

        let text = screen_text(&buf);
        assert!(text.contains("45,124"));
        assert!(text.contains("85% confidence"));
        assert!(text.contains("High (85)"));
        assert!(text.contains("2020"));
    }

    #[test]
    fn empty_state_prompts_for_form() {
        let area = Rect::new(0, 0, 80, 30);
        let mut buf = Buffer::empty(area);
        ResultsScreen::new(None, None, &[]).render(area, &mut buf);
        assert!(screen_text(&buf).contains("No prediction yet"));
    }
}
