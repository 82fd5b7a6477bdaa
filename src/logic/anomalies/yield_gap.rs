use super::AnomalyCheck;
use crate::logic::calculations::format_thousands;
use crate::logic::thresholds::{
    self, DROUGHT_RAINFALL_MM, FROST_C, HEAT_STRESS_C, LOW_PEST_PROTECTION_T, LOW_RAINFALL_MM,
    PESTICIDE_OVERUSE_T, SUBOPTIMAL_COLD_C, SUBOPTIMAL_HOT_C, UNUSUAL_INPUT_CONFIDENCE,
};
use crate::models::{Anomaly, AnomalyKind, AnomalySeverity, PredictionInput, PredictionResult};

/// Compares the predicted yield with the crop's expected envelope.
///
/// Below half the profile minimum the yield is critical; otherwise below 70%
/// of the optimum it is sub-optimal. At most one of the two is reported, and
/// each carries the contributing conditions that currently hold.
pub struct YieldGapCheck;

impl AnomalyCheck for YieldGapCheck {
    fn id(&self) -> &'static str {
        "yield_gap"
    }

    fn evaluate(&self, input: &PredictionInput, result: &PredictionResult) -> Option<Anomaly> {
        let profile = thresholds::lookup_crop_profile(&input.item);

        if result.yield_value < profile.critical_floor() {
            Some(critical_alert(input, result))
        } else if result.yield_value < profile.optimal_floor() {
            Some(below_optimal(input))
        } else {
            None
        }
    }
}

fn critical_alert(input: &PredictionInput, result: &PredictionResult) -> Anomaly {
    let mut anomaly = Anomaly::new(
        AnomalyKind::CriticalYield,
        AnomalySeverity::Critical,
        "Critical Yield Alert",
        format!(
            "Predicted yield ({} kg/ha) is critically low for {}.",
            format_thousands(result.yield_value),
            input.item
        ),
    );

    if input.rainfall < DROUGHT_RAINFALL_MM {
        anomaly = anomaly
            .with_reason("Extremely low rainfall (drought conditions)")
            .with_suggestions(&[
                "Implement emergency irrigation systems",
                "Consider drought-resistant crop varieties",
            ]);
    }

    if input.avg_temp > HEAT_STRESS_C {
        anomaly = anomaly
            .with_reason("Excessive heat stress")
            .with_suggestions(&[
                "Provide shade or cooling systems",
                "Adjust planting schedule to avoid peak heat",
            ]);
    }

    if input.avg_temp < FROST_C {
        anomaly = anomaly
            .with_reason("Frost or freezing conditions")
            .with_suggestions(&[
                "Use frost protection methods",
                "Consider greenhouse cultivation",
            ]);
    }

    if input.pesticides > PESTICIDE_OVERUSE_T {
        anomaly = anomaly
            .with_reason("Excessive pesticide use may harm beneficial organisms")
            .with_suggestions(&[
                "Reduce pesticide application",
                "Implement integrated pest management",
            ]);
    }

    if result.confidence < UNUSUAL_INPUT_CONFIDENCE {
        anomaly = anomaly
            .with_reason("Low model confidence due to unusual input combinations")
            .with_suggestions(&[
                "Verify input data accuracy",
                "Consult local agricultural experts",
            ]);
    }

    anomaly
}

fn below_optimal(input: &PredictionInput) -> Anomaly {
    let mut anomaly = Anomaly::new(
        AnomalyKind::BelowOptimalYield,
        AnomalySeverity::Warning,
        "Below Optimal Yield",
        format!(
            "Predicted yield is below optimal levels for {} in {}.",
            input.item, input.country
        ),
    );

    if input.rainfall < LOW_RAINFALL_MM {
        anomaly = anomaly
            .with_reason("Below-average rainfall")
            .with_suggestion("Supplement with irrigation");
    }

    if input.avg_temp < SUBOPTIMAL_COLD_C || input.avg_temp > SUBOPTIMAL_HOT_C {
        anomaly = anomaly
            .with_reason("Sub-optimal temperature conditions")
            .with_suggestion("Consider climate-appropriate varieties");
    }

    if input.pesticides < LOW_PEST_PROTECTION_T {
        anomaly = anomaly
            .with_reason("Insufficient pest protection")
            .with_suggestion("Increase pest monitoring and control");
    }

    anomaly
}

#[cfg(test)]
mod tests {
    use super::*;

    fn evaluate(item: &str, rainfall: f64, temp: f64, pesticides: f64, yield_value: f64) -> Option<Anomaly> {
        let input = PredictionInput::new(2023, rainfall, pesticides, temp, "Kenya", item);
        let result = PredictionResult::new(&input, yield_value, Some(88));
        YieldGapCheck.evaluate(&input, &result)
    }

    #[test]
    fn critical_description_formats_yield() {
        let anomaly = evaluate("Potatoes", 800.0, 20.0, 1.0, 8500.0).unwrap();
        assert_eq!(
            anomaly.description,
            "Predicted yield (8,500 kg/ha) is critically low for Potatoes."
        );
    }

    #[test]
    fn frost_branch() {
        let anomaly = evaluate("Wheat", 800.0, 2.0, 1.0, 400.0).unwrap();
        assert_eq!(anomaly.reasons, vec!["Frost or freezing conditions"]);
        assert_eq!(
            anomaly.suggestions,
            vec!["Use frost protection methods", "Consider greenhouse cultivation"]
        );
    }

    #[test]
    fn below_optimal_collects_all_branches() {
        let anomaly = evaluate("Maize", 300.0, 32.0, 0.1, 3000.0).unwrap();
        assert_eq!(anomaly.kind, AnomalyKind::BelowOptimalYield);
        assert_eq!(
            anomaly.description,
            "Predicted yield is below optimal levels for Maize in Kenya."
        );
        assert_eq!(
            anomaly.reasons,
            vec![
                "Below-average rainfall",
                "Sub-optimal temperature conditions",
                "Insufficient pest protection",
            ]
        );
        assert_eq!(anomaly.suggestions.len(), 3);
    }

    #[test]
    fn cold_counts_as_suboptimal_temperature() {
        let anomaly = evaluate("Maize", 800.0, 8.0, 1.0, 3000.0).unwrap();
        assert_eq!(anomaly.reasons, vec!["Sub-optimal temperature conditions"]);
    }

    #[test]
    fn yield_at_optimal_floor_is_not_flagged() {
        // maize optimal 8000 * 0.7
        assert!(evaluate("Maize", 800.0, 20.0, 1.0, 5600.0).is_none());
        assert!(evaluate("Maize", 800.0, 20.0, 1.0, 5599.0).is_some());
    }
}
