use super::Rule;
use crate::logic::thresholds::{IRRIGATION_RAINFALL_MM, WET_CLIMATE_RAINFALL_MM};
use crate::models::{
    PredictionInput, PredictionResult, Priority, Recommendation, RecommendationCategory,
    WeatherSnapshot,
};

/// Rainfall suitability rule
///
/// Wet climates suit water-loving crops; dry ones need irrigation. Between
/// the two cutoffs nothing is recommended.
///
/// Conditions:
/// - Rainfall above 1500 mm: water-loving crops (medium)
/// - Otherwise rainfall below 500 mm: irrigation system (high)
pub struct RainfallRule;

impl Rule for RainfallRule {
    fn id(&self) -> &'static str {
        "rainfall"
    }

    fn name(&self) -> &'static str {
        "Rainfall Suitability"
    }

    fn evaluate(
        &self,
        input: &PredictionInput,
        _result: &PredictionResult,
        _weather: Option<&WeatherSnapshot>,
    ) -> Option<Recommendation> {
        let rainfall = format!("{:.0} mm", input.rainfall);

        if input.rainfall > WET_CLIMATE_RAINFALL_MM {
            Some(
                Recommendation::new(
                    "water_loving_crops",
                    RecommendationCategory::Crop,
                    Priority::Medium,
                    "Water-Loving Crops",
                    "High rainfall conditions are ideal for rice, sugarcane, or tropical fruits.",
                )
                .with_data_point("Annual Rainfall", rainfall, "Input"),
            )
        } else if input.rainfall < IRRIGATION_RAINFALL_MM {
            Some(
                Recommendation::new(
                    "irrigation_system",
                    RecommendationCategory::Irrigation,
                    Priority::High,
                    "Irrigation System",
                    "Install drip irrigation or sprinkler systems to compensate for low rainfall.",
                )
                .with_data_point("Annual Rainfall", rainfall, "Input"),
            )
        } else {
            None
        }
    }
}
