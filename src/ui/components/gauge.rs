use crate::logic::calculations::{format_thousands, FactorImpact};
use crate::ui::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

pub struct GaugeWidget<'a> {
    title: &'a str,
    value: Option<f64>,
    unit: &'a str,
    min: f64,
    max: f64,
    thresholds: Vec<(f64, Color)>,
    precision: usize,
    label: Option<String>,
    color: Option<Color>,
    bordered: bool,
}

impl<'a> GaugeWidget<'a> {
    pub fn new(title: &'a str, value: Option<f64>, unit: &'a str) -> Self {
        Self {
            title,
            value,
            unit,
            min: 0.0,
            max: 100.0,
            thresholds: Vec::new(),
            precision: 1,
            label: None,
            color: None,
            bordered: true,
        }
    }

    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    pub fn thresholds(mut self, thresholds: Vec<(f64, Color)>) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    /// Replace the formatted value with custom text.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    /// Single-row rendering: `title ███░░░ value`.
    pub fn inline(mut self) -> Self {
        self.bordered = false;
        self
    }

    fn get_color(&self, value: f64) -> Color {
        if let Some(color) = self.color {
            return color;
        }
        for (threshold, color) in self.thresholds.iter().rev() {
            if value >= *threshold {
                return *color;
            }
        }
        Theme::FG
    }

    fn value_text(&self, value: f64) -> String {
        match &self.label {
            Some(label) => label.clone(),
            None => format!("{:.prec$}{}", value, self.unit, prec = self.precision),
        }
    }

    fn ratio(&self, value: f64) -> f64 {
        if self.max <= self.min {
            return 0.0;
        }
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }

    fn render_bar(&self, area: Rect, buf: &mut Buffer, value: f64, color: Color) {
        let filled = (area.width as f64 * self.ratio(value)) as u16;

        for x in area.x..area.x + area.width {
            let ch = if x < area.x + filled { '█' } else { '░' };
            buf[(x, area.y)].set_char(ch).set_fg(color);
        }
    }

    fn render_inline(self, area: Rect, buf: &mut Buffer) {
        if area.height == 0 || area.width < 20 {
            return;
        }

        let title_width = (self.title.chars().count() as u16 + 1).min(area.width / 3);
        let Some(value) = self.value else {
            let line = Line::from(vec![
                Span::styled(format!("{} ", self.title), Theme::dim()),
                Span::styled("N/A", Theme::dim()),
            ]);
            Paragraph::new(line).render(area, buf);
            return;
        };

        let color = self.get_color(value);
        let text = self.value_text(value);
        let text_width = (text.chars().count() as u16 + 1).min(area.width / 3);
        let bar_width = area
            .width
            .saturating_sub(title_width)
            .saturating_sub(text_width);

        Paragraph::new(Span::styled(self.title, Theme::dim())).render(
            Rect {
                width: title_width,
                height: 1,
                ..area
            },
            buf,
        );

        let bar_area = Rect {
            x: area.x + title_width,
            y: area.y,
            width: bar_width,
            height: 1,
        };
        self.render_bar(bar_area, buf, value, color);

        Paragraph::new(Span::styled(format!(" {}", text), Style::default().fg(color))).render(
            Rect {
                x: bar_area.x + bar_width,
                y: area.y,
                width: text_width,
                height: 1,
            },
            buf,
        );
    }
}

impl Widget for GaugeWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if !self.bordered {
            self.render_inline(area, buf);
            return;
        }

        if area.height < 3 || area.width < 10 {
            return;
        }

        let block = Block::default()
            .title(self.title)
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let inner = block.inner(area);
        block.render(area, buf);

        match self.value {
            Some(value) => {
                let color = self.get_color(value);
                let value_line = Line::from(vec![Span::styled(
                    self.value_text(value),
                    Style::default().fg(color),
                )]);

                Paragraph::new(value_line).render(inner, buf);

                // Render bar if space allows
                if inner.height >= 2 {
                    let bar_area = Rect {
                        x: inner.x,
                        y: inner.y + 1,
                        width: inner.width,
                        height: 1,
                    };
                    self.render_bar(bar_area, buf, value, color);
                }
            }
            None => {
                let na_line = Line::from(vec![Span::styled("N/A", Theme::dim())]);
                Paragraph::new(na_line).render(inner, buf);
            }
        }
    }
}

/// Confidence percentage, colored by the same bands as the results badge.
pub fn confidence_gauge(title: &str, confidence: u8) -> GaugeWidget<'_> {
    GaugeWidget::new(title, Some(confidence as f64), "%")
        .range(0.0, 100.0)
        .precision(0)
        .thresholds(vec![
            (0.0, Theme::ERROR),
            (60.0, Theme::WARNING),
            (80.0, Theme::SUCCESS),
        ])
}

pub fn factor_gauge(impact: &FactorImpact) -> GaugeWidget<'static> {
    GaugeWidget::new(impact.factor.as_str(), Some(impact.score as f64), "")
        .range(0.0, 100.0)
        .label(format!("{} ({})", impact.level, impact.score))
        .color(impact.level.color())
        .inline()
}

/// Yield bar scaled against `max`, labelled in kg/ha with separators.
pub fn yield_gauge(title: &str, value: f64, max: f64, color: Color) -> GaugeWidget<'_> {
    GaugeWidget::new(title, Some(value), "")
        .range(0.0, max)
        .label(format!("{} kg/ha", format_thousands(value)))
        .color(color)
        .inline()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Factor, FactorLevel};

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn bordered_gauge_fills_proportionally() {
        let area = Rect::new(0, 0, 12, 4);
        let mut buf = Buffer::empty(area);
        confidence_gauge("Conf", 50).render(area, &mut buf);

        assert!(row(&buf, 1).contains("50%"));
        let bar = row(&buf, 2);
        assert_eq!(bar.matches('█').count(), 5);
        assert_eq!(bar.matches('░').count(), 5);
    }

    #[test]
    fn missing_value_shows_na() {
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        GaugeWidget::new("Temp", None, "°C").render(area, &mut buf);
        assert!(row(&buf, 1).contains("N/A"));
    }

    #[test]
    fn inline_factor_gauge_shows_level_and_score() {
        let impact = FactorImpact {
            factor: Factor::Rainfall,
            level: FactorLevel::High,
            score: 85,
        };
        let area = Rect::new(0, 0, 40, 1);
        let mut buf = Buffer::empty(area);
        factor_gauge(&impact).render(area, &mut buf);

        let line = row(&buf, 0);
        assert!(line.starts_with("Rainfall"));
        assert!(line.contains("High (85)"));
        assert!(line.contains('█'));
    }

    #[test]
    fn yield_gauge_formats_thousands() {
        let area = Rect::new(0, 0, 50, 1);
        let mut buf = Buffer::empty(area);
        yield_gauge("Optimal", 4800.0, 4800.0, Theme::YIELD_OPTIMAL).render(area, &mut buf);

        let line = row(&buf, 0);
        assert!(line.contains("4,800 kg/ha"));
        assert!(!line.contains('░'));
    }
}
