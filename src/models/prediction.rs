use super::PredictionInput;
use crate::logic::thresholds;
use serde::{Deserialize, Serialize};

/// Confidence reported when the prediction service omits one.
pub const DEFAULT_CONFIDENCE: u8 = 85;

pub const YIELD_UNIT: &str = "kg/hectare";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FactorLevel {
    Low,
    Medium,
    High,
}

impl FactorLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            FactorLevel::Low => "Low",
            FactorLevel::Medium => "Medium",
            FactorLevel::High => "High",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            FactorLevel::Low => Color::LightBlue,
            FactorLevel::Medium => Color::Yellow,
            FactorLevel::High => Color::LightRed,
        }
    }
}

impl std::fmt::Display for FactorLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Factor {
    Rainfall,
    Temperature,
    Pesticides,
}

impl Factor {
    pub fn all() -> &'static [Factor] {
        &[Factor::Rainfall, Factor::Temperature, Factor::Pesticides]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Factor::Rainfall => "Rainfall",
            Factor::Temperature => "Temperature",
            Factor::Pesticides => "Pesticides",
        }
    }
}

impl std::fmt::Display for Factor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Low/Medium/High labels for the three display factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factors {
    pub rainfall: FactorLevel,
    pub temperature: FactorLevel,
    pub pesticides: FactorLevel,
}

impl Factors {
    pub fn from_input(input: &PredictionInput) -> Self {
        Self {
            rainfall: thresholds::classify_rainfall(input.rainfall),
            temperature: thresholds::classify_temperature(input.avg_temp),
            pesticides: thresholds::classify_pesticides(input.pesticides),
        }
    }

    pub fn level(&self, factor: Factor) -> FactorLevel {
        match factor {
            Factor::Rainfall => self.rainfall,
            Factor::Temperature => self.temperature,
            Factor::Pesticides => self.pesticides,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfidenceBand {
    High,
    Medium,
    Low,
}

impl ConfidenceBand {
    pub fn from_confidence(confidence: u8) -> Self {
        if confidence >= 80 {
            ConfidenceBand::High
        } else if confidence >= 60 {
            ConfidenceBand::Medium
        } else {
            ConfidenceBand::Low
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            ConfidenceBand::High => Color::Green,
            ConfidenceBand::Medium => Color::Yellow,
            ConfidenceBand::Low => Color::Red,
        }
    }
}

/// Outcome of one call to the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// kg/hectare
    pub yield_value: f64,
    /// percent, 0-100
    pub confidence: u8,
    pub factors: Factors,
}

impl PredictionResult {
    /// Build a result for `input`; factor labels always come from the threshold tables.
    pub fn new(input: &PredictionInput, yield_value: f64, confidence: Option<u8>) -> Self {
        Self {
            yield_value,
            confidence: confidence.unwrap_or(DEFAULT_CONFIDENCE).min(100),
            factors: Factors::from_input(input),
        }
    }

    pub fn confidence_band(&self) -> ConfidenceBand {
        ConfidenceBand::from_confidence(self.confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(rainfall: f64, avg_temp: f64, pesticides: f64) -> PredictionInput {
        PredictionInput::new(2024, rainfall, pesticides, avg_temp, "India", "Wheat")
    }

    #[test]
    fn result_defaults_confidence() {
        let r = PredictionResult::new(&input(800.0, 20.0, 1.5), 3000.0, None);
        assert_eq!(r.confidence, DEFAULT_CONFIDENCE);
        assert_eq!(r.yield_value, 3000.0);
    }

    #[test]
    fn result_caps_confidence_at_100() {
        let r = PredictionResult::new(&input(800.0, 20.0, 1.5), 3000.0, Some(140));
        assert_eq!(r.confidence, 100);
    }

    #[test]
    fn factors_follow_threshold_tables() {
        let f = Factors::from_input(&input(1200.0, 26.0, 0.5));
        assert_eq!(f.rainfall, FactorLevel::High);
        assert_eq!(f.temperature, FactorLevel::High);
        assert_eq!(f.pesticides, FactorLevel::Low);

        let f = Factors::from_input(&input(600.0, 16.0, 1.5));
        assert_eq!(f.level(Factor::Rainfall), FactorLevel::Medium);
        assert_eq!(f.level(Factor::Temperature), FactorLevel::Medium);
        assert_eq!(f.level(Factor::Pesticides), FactorLevel::Medium);
    }

    #[test]
    fn confidence_bands() {
        assert_eq!(ConfidenceBand::from_confidence(80), ConfidenceBand::High);
        assert_eq!(ConfidenceBand::from_confidence(79), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(60), ConfidenceBand::Medium);
        assert_eq!(ConfidenceBand::from_confidence(59), ConfidenceBand::Low);
    }
}
