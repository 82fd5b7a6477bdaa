use super::Rule;
use crate::logic::thresholds::PEST_MANAGEMENT_T;
use crate::models::{
    PredictionInput, PredictionResult, Priority, Recommendation, RecommendationCategory,
    WeatherSnapshot,
};

/// Integrated pest management rule
///
/// Conditions:
/// - Pesticide use below 1 tonne
pub struct PestManagementRule;

impl Rule for PestManagementRule {
    fn id(&self) -> &'static str {
        "pest_management"
    }

    fn name(&self) -> &'static str {
        "Pest Management"
    }

    fn evaluate(
        &self,
        input: &PredictionInput,
        _result: &PredictionResult,
        _weather: Option<&WeatherSnapshot>,
    ) -> Option<Recommendation> {
        if input.pesticides >= PEST_MANAGEMENT_T {
            return None;
        }

        Some(
            Recommendation::new(
                self.id(),
                RecommendationCategory::Pest,
                Priority::Medium,
                "Pest Management",
                "Implement integrated pest management with organic pesticides and beneficial insects.",
            )
            .with_data_point("Pesticides", format!("{:.2} t", input.pesticides), "Input"),
        )
    }
}
