pub mod engine;
pub mod fungal_disease;
pub mod heat_tolerance;
pub mod pest_management;
pub mod planting_window;
pub mod rainfall;
pub mod soil_fertility;

pub use engine::{generate_recommendations, RulesEngine};

use crate::models::{PredictionInput, PredictionResult, Recommendation, WeatherSnapshot};

/// Trait for agronomic recommendation rules
pub trait Rule: Send + Sync {
    /// Unique identifier for this rule
    fn id(&self) -> &'static str;

    /// Human-readable name
    fn name(&self) -> &'static str;

    /// Evaluate the rule and return a recommendation if conditions are met
    fn evaluate(
        &self,
        input: &PredictionInput,
        result: &PredictionResult,
        weather: Option<&WeatherSnapshot>,
    ) -> Option<Recommendation>;
}
