use super::{
    fungal_disease::FungalDiseaseRule, heat_tolerance::HeatToleranceRule,
    pest_management::PestManagementRule, planting_window::PlantingWindowRule,
    rainfall::RainfallRule, soil_fertility::SoilFertilityRule, Rule,
};
use crate::models::{PredictionInput, PredictionResult, Recommendation, WeatherSnapshot};

pub struct RulesEngine {
    rules: Vec<Box<dyn Rule>>,
}

impl RulesEngine {
    pub fn new() -> Self {
        let rules: Vec<Box<dyn Rule>> = vec![
            Box::new(HeatToleranceRule),
            Box::new(RainfallRule),
            Box::new(SoilFertilityRule),
            Box::new(PestManagementRule),
            Box::new(PlantingWindowRule),
            Box::new(FungalDiseaseRule),
        ];

        Self { rules }
    }

    pub fn evaluate(
        &self,
        input: &PredictionInput,
        result: &PredictionResult,
        weather: Option<&WeatherSnapshot>,
    ) -> Vec<Recommendation> {
        let recommendations: Vec<Recommendation> = self
            .rules
            .iter()
            .filter_map(|rule| rule.evaluate(input, result, weather))
            .collect();

        tracing::debug!(
            item = %input.item,
            with_weather = weather.is_some(),
            count = recommendations.len(),
            "Recommendation rules evaluated"
        );

        recommendations
    }

    pub fn list_rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules.iter().map(|r| (r.id(), r.name())).collect()
    }
}

impl Default for RulesEngine {
    fn default() -> Self {
        Self::new()
    }
}

pub fn generate_recommendations(
    input: &PredictionInput,
    result: &PredictionResult,
    weather: Option<&WeatherSnapshot>,
) -> Vec<Recommendation> {
    RulesEngine::new().evaluate(input, result, weather)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Priority, RecommendationCategory};

    fn inputs(
        item: &str,
        rainfall: f64,
        avg_temp: f64,
        pesticides: f64,
        yield_value: f64,
    ) -> (PredictionInput, PredictionResult) {
        let input = PredictionInput::new(2024, rainfall, pesticides, avg_temp, "India", item);
        let result = PredictionResult::new(&input, yield_value, None);
        (input, result)
    }

    fn ids(recs: &[Recommendation]) -> Vec<&str> {
        recs.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn every_rule_fires_in_order() {
        let (input, result) = inputs("Wheat", 300.0, 12.0, 0.5, 3000.0);
        let weather = WeatherSnapshot::new(18.0, 90, 2.0);
        let recs = generate_recommendations(&input, &result, Some(&weather));

        assert_eq!(
            ids(&recs),
            vec![
                "irrigation_system",
                "soil_enhancement",
                "pest_management",
                "planting_window",
                "fungal_disease",
            ]
        );
    }

    #[test]
    fn hot_and_wet_conditions() {
        let (input, result) = inputs("Rice, paddy", 1800.0, 32.0, 1.5, 7000.0);
        let recs = generate_recommendations(&input, &result, None);

        assert_eq!(ids(&recs), vec!["heat_resistant_varieties", "water_loving_crops"]);
        assert_eq!(recs[0].category, RecommendationCategory::Crop);
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[1].priority, Priority::Medium);
    }

    #[test]
    fn rainfall_branches_never_both_fire() {
        for rainfall in [0.0, 499.9, 500.0, 1000.0, 1500.0, 1500.1, 1800.0, 3000.0] {
            let (input, result) = inputs("Maize", rainfall, 20.0, 1.5, 9000.0);
            let found = generate_recommendations(&input, &result, None);
            let wet = found.iter().any(|r| r.id == "water_loving_crops");
            let dry = found.iter().any(|r| r.id == "irrigation_system");

            assert!(!(wet && dry), "both fired at {}", rainfall);
            assert_eq!(wet, rainfall > 1500.0);
            assert_eq!(dry, rainfall < 500.0);
        }
    }

    #[test]
    fn dead_zone_and_good_yield_means_no_recommendations() {
        let (input, result) = inputs("Maize", 900.0, 22.0, 1.5, 9000.0);
        assert!(generate_recommendations(&input, &result, None).is_empty());
    }

    #[test]
    fn humidity_rule_requires_weather() {
        let (input, result) = inputs("Maize", 900.0, 22.0, 1.5, 9000.0);
        assert!(generate_recommendations(&input, &result, None).is_empty());

        let humid = WeatherSnapshot::new(24.0, 81, 0.0);
        let recs = generate_recommendations(&input, &result, Some(&humid));
        assert_eq!(ids(&recs), vec!["fungal_disease"]);

        let borderline = WeatherSnapshot::new(24.0, 80, 0.0);
        assert!(generate_recommendations(&input, &result, Some(&borderline)).is_empty());
    }

    #[test]
    fn generation_is_deterministic() {
        let (input, result) = inputs("Wheat", 1600.0, 35.0, 0.2, 1200.0);
        let weather = WeatherSnapshot::new(30.0, 85, 1.0);
        assert_eq!(
            generate_recommendations(&input, &result, Some(&weather)),
            generate_recommendations(&input, &result, Some(&weather))
        );
    }

    #[test]
    fn rules_listed_in_evaluation_order() {
        let ids: Vec<&str> = RulesEngine::new()
            .list_rules()
            .into_iter()
            .map(|(id, _)| id)
            .collect();
        assert_eq!(
            ids,
            vec![
                "heat_resistant_varieties",
                "rainfall",
                "soil_enhancement",
                "pest_management",
                "planting_window",
                "fungal_disease",
            ]
        );
    }
}
