use super::AnomalyCheck;
use crate::logic::thresholds::EXTREME_HEAT_C;
use crate::models::{Anomaly, AnomalyKind, AnomalySeverity, PredictionInput, PredictionResult};

pub struct ExtremeHeatCheck;

impl AnomalyCheck for ExtremeHeatCheck {
    fn id(&self) -> &'static str {
        "extreme_heat"
    }

    fn evaluate(&self, input: &PredictionInput, _result: &PredictionResult) -> Option<Anomaly> {
        if input.avg_temp <= EXTREME_HEAT_C {
            return None;
        }

        Some(
            Anomaly::new(
                AnomalyKind::ExtremeHeat,
                AnomalySeverity::Critical,
                "Extreme Heat Warning",
                "Dangerously high temperatures detected.",
            )
            .with_reasons(&[
                "Heat stress on crops",
                "Increased water demand",
                "Potential crop failure",
            ])
            .with_suggestions(&[
                "Provide immediate shade",
                "Increase irrigation frequency",
                "Consider emergency harvesting",
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forty_degrees_is_not_extreme() {
        let input = PredictionInput::new(2020, 600.0, 1.0, 40.0, "Egypt", "Wheat");
        let result = PredictionResult::new(&input, 4500.0, None);
        assert!(ExtremeHeatCheck.evaluate(&input, &result).is_none());

        let input = PredictionInput::new(2020, 600.0, 1.0, 40.1, "Egypt", "Wheat");
        let anomaly = ExtremeHeatCheck.evaluate(&input, &result).unwrap();
        assert_eq!(anomaly.severity, AnomalySeverity::Critical);
    }
}
