use std::collections::BTreeMap;

use crate::models::{
    Factor, FactorLevel, Factors, HistoryRecord, PredictionInput, PredictionResult,
};

/// Format a value rounded to whole units with comma thousands separators.
pub fn format_thousands(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());

    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if rounded < 0.0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Relative impact of a factor level on the bar chart, 0-100
pub fn impact_score(factor: Factor, level: FactorLevel) -> u8 {
    match (factor, level) {
        (Factor::Rainfall, FactorLevel::High) => 85,
        (Factor::Rainfall, FactorLevel::Medium) => 60,
        (Factor::Rainfall, FactorLevel::Low) => 35,
        (Factor::Temperature, FactorLevel::High) => 80,
        (Factor::Temperature, FactorLevel::Medium) => 55,
        (Factor::Temperature, FactorLevel::Low) => 30,
        (Factor::Pesticides, FactorLevel::High) => 70,
        (Factor::Pesticides, FactorLevel::Medium) => 50,
        (Factor::Pesticides, FactorLevel::Low) => 25,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorImpact {
    pub factor: Factor,
    pub level: FactorLevel,
    pub score: u8,
}

pub fn factor_impacts(factors: &Factors) -> Vec<FactorImpact> {
    Factor::all()
        .iter()
        .map(|&factor| {
            let level = factors.level(factor);
            FactorImpact {
                factor,
                level,
                score: impact_score(factor, level),
            }
        })
        .collect()
}

/// (confidence, uncertainty) percentages summing to 100
pub fn confidence_split(confidence: u8) -> (u8, u8) {
    let confidence = confidence.min(100);
    (confidence, 100 - confidence)
}

pub const AVERAGE_YIELD_RATIO: f64 = 0.85;
pub const OPTIMAL_YIELD_RATIO: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YieldComparison {
    pub predicted: f64,
    pub average: f64,
    pub optimal: f64,
}

pub fn yield_comparison(yield_value: f64) -> YieldComparison {
    YieldComparison {
        predicted: yield_value,
        average: yield_value * AVERAGE_YIELD_RATIO,
        optimal: yield_value * OPTIMAL_YIELD_RATIO,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendPoint {
    pub year: i32,
    pub yield_value: f64,
}

const TREND_YEARS: usize = 5;
const SYNTHETIC_TREND: [f64; TREND_YEARS] = [0.80, 0.85, 0.90, 0.95, 1.00];

/// Five-year yield trend ending at the input year.
///
/// Recorded predictions for the same crop and country are used when there
/// are any for other years; the current prediction always fills its own
/// year. Otherwise the trend is a synthetic ramp up to the current yield.
pub fn yield_trend(
    input: &PredictionInput,
    result: &PredictionResult,
    history: &[HistoryRecord],
) -> Vec<TrendPoint> {
    // history is newest first, so the first record seen for a year wins
    let mut by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for record in history.iter().filter(|r| {
        r.input.item.eq_ignore_ascii_case(&input.item)
            && r.input.country.eq_ignore_ascii_case(&input.country)
            && r.input.year <= input.year
    }) {
        by_year
            .entry(record.input.year)
            .or_insert(record.prediction.yield_value);
    }
    by_year.insert(input.year, result.yield_value);

    if by_year.len() < 2 {
        return synthetic_trend(input.year, result.yield_value);
    }

    let skip = by_year.len().saturating_sub(TREND_YEARS);
    by_year
        .into_iter()
        .skip(skip)
        .map(|(year, yield_value)| TrendPoint { year, yield_value })
        .collect()
}

fn synthetic_trend(year: i32, yield_value: f64) -> Vec<TrendPoint> {
    SYNTHETIC_TREND
        .iter()
        .enumerate()
        .map(|(i, ratio)| TrendPoint {
            year: year - (TREND_YEARS - 1 - i) as i32,
            yield_value: yield_value * ratio,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(year: i32, item: &str, yield_value: f64) -> (PredictionInput, PredictionResult) {
        let input = PredictionInput::new(year, 800.0, 1.5, 20.0, "India", item);
        let result = PredictionResult::new(&input, yield_value, None);
        (input, result)
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(1000.0), "1,000");
        assert_eq!(format_thousands(45123.6), "45,124");
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(-2500.0), "-2,500");
    }

    #[test]
    fn test_impact_scores() {
        let factors = Factors {
            rainfall: FactorLevel::High,
            temperature: FactorLevel::Medium,
            pesticides: FactorLevel::Low,
        };
        let scores: Vec<u8> = factor_impacts(&factors).iter().map(|i| i.score).collect();
        assert_eq!(scores, vec![85, 55, 25]);
    }

    #[test]
    fn test_confidence_split() {
        assert_eq!(confidence_split(85), (85, 15));
        assert_eq!(confidence_split(100), (100, 0));
    }

    #[test]
    fn test_yield_comparison() {
        let c = yield_comparison(4000.0);
        assert!((c.average - 3400.0).abs() < 1e-9);
        assert!((c.optimal - 4800.0).abs() < 1e-9);
    }

    #[test]
    fn synthetic_trend_without_history() {
        let (input, result) = prediction(2024, "Wheat", 4000.0);
        let trend = yield_trend(&input, &result, &[]);

        let years: Vec<i32> = trend.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![2020, 2021, 2022, 2023, 2024]);
        assert!((trend[0].yield_value - 3200.0).abs() < 1e-9);
        assert_eq!(trend[4].yield_value, 4000.0);
    }

    #[test]
    fn trend_uses_matching_history() {
        let (input, result) = prediction(2024, "Wheat", 4000.0);
        let history: Vec<HistoryRecord> = [
            prediction(2022, "Wheat", 3500.0),
            prediction(2021, "Maize", 9000.0),
            prediction(2020, "Wheat", 3000.0),
            prediction(2026, "Wheat", 5000.0),
        ]
        .into_iter()
        .map(|(i, r)| HistoryRecord::new(i, r, None))
        .collect();

        let trend = yield_trend(&input, &result, &history);
        let points: Vec<(i32, f64)> = trend.iter().map(|p| (p.year, p.yield_value)).collect();
        assert_eq!(points, vec![(2020, 3000.0), (2022, 3500.0), (2024, 4000.0)]);
    }

    #[test]
    fn trend_keeps_last_five_years() {
        let (input, result) = prediction(2024, "Wheat", 4000.0);
        let history: Vec<HistoryRecord> = (2015..2024)
            .map(|year| {
                let (i, r) = prediction(year, "Wheat", 1000.0 + year as f64);
                HistoryRecord::new(i, r, None)
            })
            .collect();

        let trend = yield_trend(&input, &result, &history);
        assert_eq!(trend.len(), 5);
        assert_eq!(trend[0].year, 2020);
        assert_eq!(trend[4].year, 2024);
    }
}
