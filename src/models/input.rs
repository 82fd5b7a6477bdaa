use super::catalog;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Validated agronomic inputs for one prediction.
///
/// Only ever built through [`PredictionForm::validate`] (or directly in tests),
/// so every numeric field is finite and within range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionInput {
    pub year: i32,
    /// mm/year
    pub rainfall: f64,
    /// tonnes
    pub pesticides: f64,
    /// °C
    pub avg_temp: f64,
    pub country: String,
    pub item: String,
}

impl PredictionInput {
    pub fn new(
        year: i32,
        rainfall: f64,
        pesticides: f64,
        avg_temp: f64,
        country: impl Into<String>,
        item: impl Into<String>,
    ) -> Self {
        Self {
            year,
            rainfall,
            pesticides,
            avg_temp,
            country: country.into(),
            item: item.into(),
        }
    }

    /// Back-fill a form with these values, e.g. to edit a past prediction.
    pub fn to_form(&self) -> PredictionForm {
        PredictionForm {
            year: self.year.to_string(),
            rainfall: self.rainfall.to_string(),
            pesticides: self.pesticides.to_string(),
            avg_temp: self.avg_temp.to_string(),
            country: self.country.clone(),
            item: self.item.clone(),
        }
    }
}

/// Raw text as typed by the user, before validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredictionForm {
    pub year: String,
    pub rainfall: String,
    pub pesticides: String,
    pub avg_temp: String,
    pub country: String,
    pub item: String,
}

impl PredictionForm {
    pub fn validate(&self) -> Result<PredictionInput, ValidationError> {
        let year_raw = required("year", &self.year)?;
        let rainfall_raw = required("rainfall", &self.rainfall)?;
        let pesticides_raw = required("pesticides", &self.pesticides)?;
        let avg_temp_raw = required("average temperature", &self.avg_temp)?;
        let country_raw = required("country", &self.country)?;
        let item_raw = required("crop type", &self.item)?;

        let year: i32 = year_raw
            .parse()
            .map_err(|_| ValidationError::InvalidNumber {
                field: "year",
                value: year_raw.to_string(),
            })?;
        let rainfall = parse_finite("rainfall", rainfall_raw)?;
        let pesticides = parse_finite("pesticides", pesticides_raw)?;
        let avg_temp = parse_finite("average temperature", avg_temp_raw)?;

        if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
            return Err(ValidationError::YearOutOfRange(year));
        }
        if rainfall < 0.0 {
            return Err(ValidationError::Negative { field: "rainfall" });
        }
        if pesticides < 0.0 {
            return Err(ValidationError::Negative {
                field: "pesticides",
            });
        }

        let country = catalog::canonical_country(country_raw)
            .ok_or_else(|| ValidationError::UnknownCountry(country_raw.to_string()))?;
        let item = catalog::canonical_crop(item_raw)
            .ok_or_else(|| ValidationError::UnknownCrop(item_raw.to_string()))?;

        Ok(PredictionInput::new(
            year, rainfall, pesticides, avg_temp, country, item,
        ))
    }
}

fn required<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn parse_finite(field: &'static str, value: &str) -> Result<f64, ValidationError> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(ValidationError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}
