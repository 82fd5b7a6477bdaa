use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AnomalySeverity {
    Info,
    Warning,
    Critical,
}

impl AnomalySeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalySeverity::Info => "Info",
            AnomalySeverity::Warning => "Warning",
            AnomalySeverity::Critical => "Critical",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            AnomalySeverity::Info => Color::LightBlue,
            AnomalySeverity::Warning => Color::Yellow,
            AnomalySeverity::Critical => Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AnomalySeverity::Info => "ℹ",
            AnomalySeverity::Warning => "⚠",
            AnomalySeverity::Critical => "!",
        }
    }
}

impl std::fmt::Display for AnomalySeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which check produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnomalyKind {
    CriticalYield,
    BelowOptimalYield,
    ExcessiveRainfall,
    ExtremeHeat,
    LowConfidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    pub severity: AnomalySeverity,
    pub title: String,
    pub description: String,
    pub reasons: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Anomaly {
    pub fn new(
        kind: AnomalyKind,
        severity: AnomalySeverity,
        title: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            title: title.into(),
            description: description.into(),
            reasons: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reasons.push(reason.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    pub fn with_reasons(mut self, reasons: &[&str]) -> Self {
        self.reasons.extend(reasons.iter().map(|r| r.to_string()));
        self
    }

    pub fn with_suggestions(mut self, suggestions: &[&str]) -> Self {
        self.suggestions
            .extend(suggestions.iter().map(|s| s.to_string()));
        self
    }
}
