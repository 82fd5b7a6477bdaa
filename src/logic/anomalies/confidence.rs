use super::AnomalyCheck;
use crate::logic::thresholds::LOW_CONFIDENCE;
use crate::models::{Anomaly, AnomalyKind, AnomalySeverity, PredictionInput, PredictionResult};

/// Flags predictions the model itself is unsure about.
pub struct LowConfidenceCheck;

impl AnomalyCheck for LowConfidenceCheck {
    fn id(&self) -> &'static str {
        "low_confidence"
    }

    fn evaluate(&self, _input: &PredictionInput, result: &PredictionResult) -> Option<Anomaly> {
        if result.confidence >= LOW_CONFIDENCE {
            return None;
        }

        Some(
            Anomaly::new(
                AnomalyKind::LowConfidence,
                AnomalySeverity::Info,
                "Low Prediction Confidence",
                format!(
                    "Model confidence is {}%, indicating uncertainty in the prediction.",
                    result.confidence
                ),
            )
            .with_reasons(&[
                "Unusual combination of input parameters",
                "Limited training data for this scenario",
                "Potential data quality issues",
            ])
            .with_suggestions(&[
                "Double-check input values",
                "Consult local agricultural extension services",
                "Consider multiple prediction models",
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(confidence: u8) -> Option<Anomaly> {
        let input = PredictionInput::new(2021, 900.0, 1.2, 22.0, "India", "Maize");
        let result = PredictionResult::new(&input, 9000.0, Some(confidence));
        LowConfidenceCheck.evaluate(&input, &result)
    }

    #[test]
    fn seventy_percent_is_confident_enough() {
        assert!(check(70).is_none());
        let anomaly = check(69).unwrap();
        assert_eq!(
            anomaly.description,
            "Model confidence is 69%, indicating uncertainty in the prediction."
        );
        assert_eq!(anomaly.severity, AnomalySeverity::Info);
    }
}
