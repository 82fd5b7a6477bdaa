use super::AnomalyCheck;
use crate::logic::thresholds::EXCESSIVE_RAINFALL_MM;
use crate::models::{Anomaly, AnomalyKind, AnomalySeverity, PredictionInput, PredictionResult};

/// Waterlogging risk when annual rainfall is extreme, independent of yield.
pub struct ExcessiveRainfallCheck;

impl AnomalyCheck for ExcessiveRainfallCheck {
    fn id(&self) -> &'static str {
        "excessive_rainfall"
    }

    fn evaluate(&self, input: &PredictionInput, _result: &PredictionResult) -> Option<Anomaly> {
        if input.rainfall <= EXCESSIVE_RAINFALL_MM {
            return None;
        }

        let anomaly = Anomaly::new(
            AnomalyKind::ExcessiveRainfall,
            AnomalySeverity::Warning,
            "Excessive Rainfall Warning",
            "Very high rainfall may cause waterlogging and root diseases.",
        )
        .with_reasons(&[
            "Potential waterlogging",
            "Increased disease pressure",
            "Nutrient leaching",
        ])
        .with_suggestions(&[
            "Improve field drainage",
            "Apply fungicides preventively",
            "Monitor for root rot diseases",
        ]);

        Some(anomaly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(rainfall: f64) -> Option<Anomaly> {
        let input = PredictionInput::new(2020, rainfall, 1.0, 20.0, "Brazil", "Soybeans");
        let result = PredictionResult::new(&input, 2500.0, None);
        ExcessiveRainfallCheck.evaluate(&input, &result)
    }

    #[test]
    fn threshold_is_exclusive() {
        assert!(check(2000.0).is_none());
        let anomaly = check(2000.5).unwrap();
        assert_eq!(anomaly.reasons.len(), 3);
        assert_eq!(anomaly.suggestions[0], "Improve field drainage");
    }
}
