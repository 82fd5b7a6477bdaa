//! Threshold tables: per-crop expected-yield envelopes and every numeric cutoff
//! used by the anomaly checks and the recommendation rules.
//!
//! Factor bands use strict `>` comparisons, so a value sitting exactly on a
//! cutoff belongs to the lower band.

use crate::models::FactorLevel;

/// Expected yield envelope for a crop, kg/ha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CropProfile {
    pub min: f64,
    pub max: f64,
    pub optimal: f64,
}

impl CropProfile {
    const fn new(min: f64, max: f64, optimal: f64) -> Self {
        Self { min, max, optimal }
    }

    /// Below this the yield is critically low.
    pub fn critical_floor(&self) -> f64 {
        self.min * CRITICAL_YIELD_RATIO
    }

    /// Below this (and above the critical floor) the yield is sub-optimal.
    pub fn optimal_floor(&self) -> f64 {
        self.optimal * BELOW_OPTIMAL_RATIO
    }
}

pub const DEFAULT_PROFILE: CropProfile = CropProfile::new(1000.0, 10000.0, 5000.0);

/// Keys are lowercase crop names; the second `rice` entry is the catalogue spelling.
const CROP_PROFILES: &[(&str, CropProfile)] = &[
    ("wheat", CropProfile::new(2000.0, 8000.0, 5000.0)),
    ("rice", CropProfile::new(3000.0, 10000.0, 6500.0)),
    ("rice, paddy", CropProfile::new(3000.0, 10000.0, 6500.0)),
    ("maize", CropProfile::new(4000.0, 12000.0, 8000.0)),
    ("soybeans", CropProfile::new(1500.0, 4000.0, 2500.0)),
    ("potatoes", CropProfile::new(20000.0, 60000.0, 40000.0)),
    ("cassava", CropProfile::new(8000.0, 25000.0, 15000.0)),
];

pub fn lookup_crop_profile(crop_name: &str) -> CropProfile {
    let key = crop_name.trim().to_lowercase();
    CROP_PROFILES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, profile)| *profile)
        .unwrap_or(DEFAULT_PROFILE)
}

// Factor bands
pub const RAINFALL_HIGH_MM: f64 = 1000.0;
pub const RAINFALL_MEDIUM_MM: f64 = 500.0;
pub const TEMPERATURE_HIGH_C: f64 = 25.0;
pub const TEMPERATURE_MEDIUM_C: f64 = 15.0;
pub const PESTICIDES_HIGH_T: f64 = 2.0;
pub const PESTICIDES_MEDIUM_T: f64 = 1.0;

pub fn classify_rainfall(mm: f64) -> FactorLevel {
    classify(mm, RAINFALL_HIGH_MM, RAINFALL_MEDIUM_MM)
}

pub fn classify_temperature(celsius: f64) -> FactorLevel {
    classify(celsius, TEMPERATURE_HIGH_C, TEMPERATURE_MEDIUM_C)
}

pub fn classify_pesticides(tonnes: f64) -> FactorLevel {
    classify(tonnes, PESTICIDES_HIGH_T, PESTICIDES_MEDIUM_T)
}

fn classify(value: f64, high: f64, medium: f64) -> FactorLevel {
    if value > high {
        FactorLevel::High
    } else if value > medium {
        FactorLevel::Medium
    } else {
        FactorLevel::Low
    }
}

// Yield envelope ratios
pub const CRITICAL_YIELD_RATIO: f64 = 0.5;
pub const BELOW_OPTIMAL_RATIO: f64 = 0.7;

// Critical yield contributors
pub const DROUGHT_RAINFALL_MM: f64 = 300.0;
pub const HEAT_STRESS_C: f64 = 35.0;
pub const FROST_C: f64 = 5.0;
pub const PESTICIDE_OVERUSE_T: f64 = 5.0;
pub const UNUSUAL_INPUT_CONFIDENCE: u8 = 60;

// Below-optimal contributors
pub const LOW_RAINFALL_MM: f64 = 500.0;
pub const SUBOPTIMAL_COLD_C: f64 = 10.0;
pub const SUBOPTIMAL_HOT_C: f64 = 30.0;
pub const LOW_PEST_PROTECTION_T: f64 = 0.5;

// Environmental and confidence checks
pub const EXCESSIVE_RAINFALL_MM: f64 = 2000.0;
pub const EXTREME_HEAT_C: f64 = 40.0;
pub const LOW_CONFIDENCE: u8 = 70;

// Recommendation rules
pub const HEAT_VARIETY_C: f64 = 30.0;
pub const WET_CLIMATE_RAINFALL_MM: f64 = 1500.0;
pub const IRRIGATION_RAINFALL_MM: f64 = 500.0;
pub const SOIL_ENHANCEMENT_YIELD: f64 = 5000.0;
pub const PEST_MANAGEMENT_T: f64 = 1.0;
pub const WHEAT_PLANTING_C: f64 = 15.0;
pub const FUNGAL_HUMIDITY: u8 = 80;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profiles_satisfy_min_optimal_max() {
        for (name, p) in CROP_PROFILES.iter().chain([("default", DEFAULT_PROFILE)].iter()) {
            assert!(p.min < p.optimal, "{} min >= optimal", name);
            assert!(p.optimal < p.max, "{} optimal >= max", name);
        }
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert_eq!(lookup_crop_profile("Wheat"), lookup_crop_profile("wheat"));
        assert_eq!(lookup_crop_profile("POTATOES").min, 20000.0);
        assert_eq!(lookup_crop_profile(" maize ").optimal, 8000.0);
    }

    #[test]
    fn rice_paddy_uses_rice_profile() {
        assert_eq!(lookup_crop_profile("Rice, paddy"), lookup_crop_profile("rice"));
        assert_eq!(lookup_crop_profile("Rice, paddy").optimal, 6500.0);
    }

    #[test]
    fn unknown_crops_fall_back_to_default() {
        assert_eq!(lookup_crop_profile("Yams"), DEFAULT_PROFILE);
        assert_eq!(lookup_crop_profile(""), DEFAULT_PROFILE);
    }

    #[test]
    fn floors() {
        let wheat = lookup_crop_profile("wheat");
        assert_eq!(wheat.critical_floor(), 1000.0);
        assert_eq!(wheat.optimal_floor(), 3500.0);
    }

    #[test]
    fn rainfall_boundaries_are_strict() {
        assert_eq!(classify_rainfall(0.0), FactorLevel::Low);
        assert_eq!(classify_rainfall(500.0), FactorLevel::Low);
        assert_eq!(classify_rainfall(500.01), FactorLevel::Medium);
        assert_eq!(classify_rainfall(1000.0), FactorLevel::Medium);
        assert_eq!(classify_rainfall(1000.01), FactorLevel::High);
    }

    #[test]
    fn rainfall_classification_is_monotonic() {
        let mut previous = FactorLevel::Low;
        let mut mm = 0.0;
        while mm < 3000.0 {
            let level = classify_rainfall(mm);
            assert!(level >= previous, "level dropped at {}", mm);
            previous = level;
            mm += 12.5;
        }
    }

    #[test]
    fn temperature_boundaries_are_strict() {
        assert_eq!(classify_temperature(-5.0), FactorLevel::Low);
        assert_eq!(classify_temperature(15.0), FactorLevel::Low);
        assert_eq!(classify_temperature(15.1), FactorLevel::Medium);
        assert_eq!(classify_temperature(25.0), FactorLevel::Medium);
        assert_eq!(classify_temperature(25.1), FactorLevel::High);
    }

    #[test]
    fn pesticide_boundaries_are_strict() {
        assert_eq!(classify_pesticides(1.0), FactorLevel::Low);
        assert_eq!(classify_pesticides(1.01), FactorLevel::Medium);
        assert_eq!(classify_pesticides(2.0), FactorLevel::Medium);
        assert_eq!(classify_pesticides(2.01), FactorLevel::High);
    }
}
