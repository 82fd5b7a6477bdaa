use super::Rule;
use crate::logic::thresholds::WHEAT_PLANTING_C;
use crate::models::{
    PredictionInput, PredictionResult, Priority, Recommendation, RecommendationCategory,
    WeatherSnapshot,
};

/// Wheat planting window rule
///
/// Conditions:
/// - Crop name contains "wheat" (any case)
/// - Average temperature below 15°C
pub struct PlantingWindowRule;

impl Rule for PlantingWindowRule {
    fn id(&self) -> &'static str {
        "planting_window"
    }

    fn name(&self) -> &'static str {
        "Optimal Planting Time"
    }

    fn evaluate(
        &self,
        input: &PredictionInput,
        _result: &PredictionResult,
        _weather: Option<&WeatherSnapshot>,
    ) -> Option<Recommendation> {
        if !input.item.to_lowercase().contains("wheat") || input.avg_temp >= WHEAT_PLANTING_C {
            return None;
        }

        Some(
            Recommendation::new(
                self.id(),
                RecommendationCategory::Timing,
                Priority::Medium,
                "Optimal Planting Time",
                "Plant wheat in late fall for winter varieties or early spring for spring varieties.",
            )
            .with_data_point("Crop", &input.item, "Input")
            .with_data_point(
                "Avg Temperature",
                format!("{:.1}°C", input.avg_temp),
                "Input",
            ),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fires(item: &str, avg_temp: f64) -> bool {
        let input = PredictionInput::new(2024, 700.0, 1.5, avg_temp, "France", item);
        let result = PredictionResult::new(&input, 7000.0, None);
        PlantingWindowRule.evaluate(&input, &result, None).is_some()
    }

    #[test]
    fn matches_wheat_case_insensitively() {
        assert!(fires("Wheat", 10.0));
        assert!(fires("WINTER WHEAT", 10.0));
        assert!(!fires("Maize", 10.0));
    }

    #[test]
    fn fifteen_degrees_is_too_warm() {
        assert!(!fires("Wheat", 15.0));
        assert!(fires("Wheat", 14.9));
    }
}
