use super::Rule;
use crate::logic::calculations::format_thousands;
use crate::logic::thresholds::SOIL_ENHANCEMENT_YIELD;
use crate::models::{
    PredictionInput, PredictionResult, Priority, Recommendation, RecommendationCategory,
    WeatherSnapshot,
};

/// Soil enhancement rule
///
/// Conditions:
/// - Predicted yield below 5,000 kg/ha, regardless of crop
pub struct SoilFertilityRule;

impl Rule for SoilFertilityRule {
    fn id(&self) -> &'static str {
        "soil_enhancement"
    }

    fn name(&self) -> &'static str {
        "Soil Enhancement"
    }

    fn evaluate(
        &self,
        _input: &PredictionInput,
        result: &PredictionResult,
        _weather: Option<&WeatherSnapshot>,
    ) -> Option<Recommendation> {
        if result.yield_value >= SOIL_ENHANCEMENT_YIELD {
            return None;
        }

        Some(
            Recommendation::new(
                self.id(),
                RecommendationCategory::Fertilizer,
                Priority::High,
                "Soil Enhancement",
                "Apply NPK fertilizer (10-26-26) and organic compost to improve soil fertility.",
            )
            .with_data_point(
                "Predicted Yield",
                format!("{} kg/ha", format_thousands(result.yield_value)),
                "Prediction",
            ),
        )
    }
}
