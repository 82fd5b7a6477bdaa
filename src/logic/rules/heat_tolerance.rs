use super::Rule;
use crate::logic::thresholds::HEAT_VARIETY_C;
use crate::models::{
    PredictionInput, PredictionResult, Priority, Recommendation, RecommendationCategory,
    WeatherSnapshot,
};

/// Heat-tolerant variety rule
///
/// Conditions:
/// - Average temperature above 30°C
pub struct HeatToleranceRule;

impl Rule for HeatToleranceRule {
    fn id(&self) -> &'static str {
        "heat_resistant_varieties"
    }

    fn name(&self) -> &'static str {
        "Heat-Resistant Varieties"
    }

    fn evaluate(
        &self,
        input: &PredictionInput,
        _result: &PredictionResult,
        _weather: Option<&WeatherSnapshot>,
    ) -> Option<Recommendation> {
        if input.avg_temp <= HEAT_VARIETY_C {
            return None;
        }

        let rec = Recommendation::new(
            self.id(),
            RecommendationCategory::Crop,
            Priority::High,
            "Heat-Resistant Varieties",
            "Consider drought-resistant varieties like sorghum or millet for high temperature conditions.",
        )
        .with_data_point(
            "Avg Temperature",
            format!("{:.1}°C", input.avg_temp),
            "Input",
        );

        Some(rec)
    }
}
