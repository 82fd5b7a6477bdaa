pub mod confidence;
pub mod heat;
pub mod rainfall;
pub mod yield_gap;

use crate::models::{Anomaly, PredictionInput, PredictionResult};

use confidence::LowConfidenceCheck;
use heat::ExtremeHeatCheck;
use rainfall::ExcessiveRainfallCheck;
use yield_gap::YieldGapCheck;

/// A single anomaly check over a committed input/prediction pair
pub trait AnomalyCheck: Send + Sync {
    fn id(&self) -> &'static str;

    fn evaluate(&self, input: &PredictionInput, result: &PredictionResult) -> Option<Anomaly>;
}

/// Runs the checks in a fixed order; output order is emission order.
pub struct AnomalyDetector {
    checks: Vec<Box<dyn AnomalyCheck>>,
}

impl AnomalyDetector {
    pub fn new() -> Self {
        let checks: Vec<Box<dyn AnomalyCheck>> = vec![
            Box::new(YieldGapCheck),
            Box::new(ExcessiveRainfallCheck),
            Box::new(ExtremeHeatCheck),
            Box::new(LowConfidenceCheck),
        ];

        Self { checks }
    }

    pub fn detect(&self, input: &PredictionInput, result: &PredictionResult) -> Vec<Anomaly> {
        let anomalies: Vec<Anomaly> = self
            .checks
            .iter()
            .filter_map(|check| check.evaluate(input, result))
            .collect();

        tracing::debug!(
            item = %input.item,
            yield_value = result.yield_value,
            count = anomalies.len(),
            "Anomaly detection complete"
        );

        anomalies
    }

    pub fn list_checks(&self) -> Vec<&'static str> {
        self.checks.iter().map(|c| c.id()).collect()
    }
}

impl Default for AnomalyDetector {
    fn default() -> Self {
        Self::new()
    }
}

pub fn detect_anomalies(input: &PredictionInput, result: &PredictionResult) -> Vec<Anomaly> {
    AnomalyDetector::new().detect(input, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnomalyKind, AnomalySeverity};

    fn scenario(
        item: &str,
        rainfall: f64,
        avg_temp: f64,
        pesticides: f64,
        yield_value: f64,
        confidence: u8,
    ) -> (PredictionInput, PredictionResult) {
        let input = PredictionInput::new(2024, rainfall, pesticides, avg_temp, "India", item);
        let result = PredictionResult::new(&input, yield_value, Some(confidence));
        (input, result)
    }

    fn kinds(anomalies: &[Anomaly]) -> Vec<AnomalyKind> {
        anomalies.iter().map(|a| a.kind).collect()
    }

    #[test]
    fn hot_wheat_with_adequate_yield_has_only_heat_warning() {
        let (input, result) = scenario("Wheat", 1200.0, 42.0, 1.0, 4000.0, 90);
        let anomalies = detect_anomalies(&input, &result);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].title, "Extreme Heat Warning");
        assert_eq!(anomalies[0].severity, AnomalySeverity::Critical);
    }

    #[test]
    fn stressed_potatoes_raise_critical_alert_with_every_matching_reason() {
        let (input, result) = scenario("Potatoes", 200.0, 38.0, 6.0, 5000.0, 50);
        let anomalies = detect_anomalies(&input, &result);

        let critical = &anomalies[0];
        assert_eq!(critical.title, "Critical Yield Alert");
        assert_eq!(critical.severity, AnomalySeverity::Critical);
        assert_eq!(
            critical.reasons,
            vec![
                "Extremely low rainfall (drought conditions)",
                "Excessive heat stress",
                "Excessive pesticide use may harm beneficial organisms",
                "Low model confidence due to unusual input combinations",
            ]
        );
        assert_eq!(critical.suggestions.len(), 8);
        assert!(!critical.reasons.iter().any(|r| r.contains("Frost")));

        assert!(!kinds(&anomalies).contains(&AnomalyKind::BelowOptimalYield));
        assert_eq!(anomalies.last().map(|a| a.kind), Some(AnomalyKind::LowConfidence));
    }

    #[test]
    fn wet_rice_paddy_only_warns_about_rainfall() {
        let (input, result) = scenario("Rice, paddy", 2500.0, 20.0, 1.5, 6000.0, 85);
        let anomalies = detect_anomalies(&input, &result);

        assert_eq!(kinds(&anomalies), vec![AnomalyKind::ExcessiveRainfall]);
        assert_eq!(anomalies[0].severity, AnomalySeverity::Warning);
    }

    #[test]
    fn critical_and_below_optimal_are_exclusive() {
        // wheat: critical below 1000, below-optimal below 3500
        for yield_value in [0.0, 500.0, 999.9, 1000.0, 2000.0, 3499.9, 3500.0, 6000.0] {
            let (input, result) = scenario("Wheat", 800.0, 20.0, 1.5, yield_value, 90);
            let found = kinds(&detect_anomalies(&input, &result));
            let critical = found.contains(&AnomalyKind::CriticalYield);
            let below = found.contains(&AnomalyKind::BelowOptimalYield);

            assert!(!(critical && below), "both fired at {}", yield_value);
            assert_eq!(critical, yield_value < 1000.0, "critical at {}", yield_value);
            assert_eq!(
                below,
                (1000.0..3500.0).contains(&yield_value),
                "below-optimal at {}",
                yield_value
            );
        }
    }

    #[test]
    fn critical_alert_may_have_no_reasons() {
        let (input, result) = scenario("Maize", 800.0, 20.0, 1.5, 100.0, 90);
        let anomalies = detect_anomalies(&input, &result);

        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].reasons.is_empty());
        assert!(anomalies[0].suggestions.is_empty());
    }

    #[test]
    fn unknown_crop_uses_default_profile() {
        // default profile: critical below 500, below-optimal below 3500
        let (input, result) = scenario("Plantains and others", 800.0, 20.0, 1.5, 499.0, 90);
        assert_eq!(
            kinds(&detect_anomalies(&input, &result)),
            vec![AnomalyKind::CriticalYield]
        );

        let (input, result) = scenario("Plantains and others", 800.0, 20.0, 1.5, 500.0, 90);
        assert_eq!(
            kinds(&detect_anomalies(&input, &result)),
            vec![AnomalyKind::BelowOptimalYield]
        );
    }

    #[test]
    fn healthy_prediction_is_all_clear() {
        let (input, result) = scenario("Wheat", 800.0, 20.0, 1.5, 5200.0, 92);
        assert!(detect_anomalies(&input, &result).is_empty());
    }

    #[test]
    fn detection_is_deterministic() {
        let (input, result) = scenario("Potatoes", 2200.0, 41.0, 0.2, 9000.0, 55);
        let first = detect_anomalies(&input, &result);
        let second = detect_anomalies(&input, &result);
        assert_eq!(first, second);
        assert_eq!(
            kinds(&first),
            vec![
                AnomalyKind::CriticalYield,
                AnomalyKind::ExcessiveRainfall,
                AnomalyKind::ExtremeHeat,
                AnomalyKind::LowConfidence,
            ]
        );
    }

    #[test]
    fn checks_run_in_fixed_order() {
        assert_eq!(
            AnomalyDetector::default().list_checks(),
            vec!["yield_gap", "excessive_rainfall", "extreme_heat", "low_confidence"]
        );
    }
}
