use super::Rule;
use crate::logic::thresholds::FUNGAL_HUMIDITY;
use crate::models::{
    PredictionInput, PredictionResult, Priority, Recommendation, RecommendationCategory,
    WeatherSnapshot,
};

/// Fungal disease prevention rule
///
/// Only evaluated when live weather is available.
///
/// Conditions:
/// - Current relative humidity above 80%
pub struct FungalDiseaseRule;

impl Rule for FungalDiseaseRule {
    fn id(&self) -> &'static str {
        "fungal_disease"
    }

    fn name(&self) -> &'static str {
        "Fungal Disease Prevention"
    }

    fn evaluate(
        &self,
        _input: &PredictionInput,
        _result: &PredictionResult,
        weather: Option<&WeatherSnapshot>,
    ) -> Option<Recommendation> {
        let weather = weather?;

        if weather.humidity <= FUNGAL_HUMIDITY {
            return None;
        }

        let source = if weather.location.is_empty() {
            "Weather".to_string()
        } else {
            format!("Weather ({})", weather.location)
        };

        Some(
            Recommendation::new(
                self.id(),
                RecommendationCategory::Pest,
                Priority::High,
                "Fungal Disease Prevention",
                "High humidity increases fungal disease risk. Apply preventive fungicides.",
            )
            .with_data_point("Humidity", format!("{}%", weather.humidity), &source),
        )
    }
}
