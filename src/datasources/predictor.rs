use crate::config::PredictorConfig;
use crate::error::{CropCastError, Result};
use crate::models::{PredictionInput, PredictionResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client for the external yield-prediction service.
pub struct PredictionClient {
    client: reqwest::Client,
    config: PredictorConfig,
}

/// Feature vector in the order the model was trained on:
/// year, rainfall, pesticides, average temperature, country, crop.
#[derive(Debug, Serialize)]
struct PredictRequest<'a> {
    features: (i32, f64, f64, f64, &'a str, &'a str),
}

impl<'a> From<&'a PredictionInput> for PredictRequest<'a> {
    fn from(input: &'a PredictionInput) -> Self {
        Self {
            features: (
                input.year,
                input.rainfall,
                input.pesticides,
                input.avg_temp,
                &input.country,
                &input.item,
            ),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictResponse {
    #[serde(default)]
    prediction: Option<f64>,
    #[serde(default)]
    confidence: Option<f64>,
    #[serde(default)]
    error: Option<String>,
}

impl PredictionClient {
    pub fn new(config: PredictorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;

        Ok(Self { client, config })
    }

    pub async fn predict(&self, input: &PredictionInput) -> Result<PredictionResult> {
        let url = format!("{}/predict", self.config.url.trim_end_matches('/'));
        tracing::debug!(%url, item = %input.item, country = %input.country, "Requesting prediction");

        let response = self
            .client
            .post(&url)
            .json(&PredictRequest::from(input))
            .send()
            .await
            .map_err(|e| {
                CropCastError::DataSourceUnavailable(format!(
                    "Failed to connect to the prediction service: {}",
                    e
                ))
            })?;

        // The service reports model errors as JSON with a 4xx/5xx status,
        // so the body is parsed before the status is considered.
        let status = response.status();
        let body = response.text().await?;

        match parse_prediction(input, &body) {
            Err(CropCastError::InvalidData(_)) if !status.is_success() => {
                Err(CropCastError::DataSourceUnavailable(format!(
                    "Prediction service returned {}",
                    status
                )))
            }
            other => other,
        }
    }

    /// Test connection to the prediction service
    pub async fn test_connection(&self) -> Result<bool> {
        let response = self
            .client
            .get(&self.config.url)
            .send()
            .await
            .map_err(|e| CropCastError::DataSourceUnavailable(format!("Predictor: {}", e)))?;

        Ok(!response.status().is_server_error())
    }
}

/// Validate a prediction service response body at the boundary.
pub fn parse_prediction(input: &PredictionInput, body: &str) -> Result<PredictionResult> {
    let response: PredictResponse = serde_json::from_str(body).map_err(|e| {
        CropCastError::InvalidData(format!("Malformed prediction response: {}", e))
    })?;

    if let Some(error) = response.error {
        return Err(CropCastError::Prediction(error));
    }

    let yield_value = response
        .prediction
        .filter(|p| p.is_finite())
        .ok_or_else(|| {
            CropCastError::InvalidData("Prediction response has no usable yield".into())
        })?;

    let confidence = response
        .confidence
        .filter(|c| c.is_finite())
        .map(|c| c.clamp(0.0, 100.0).round() as u8);

    Ok(PredictionResult::new(input, yield_value, confidence))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FactorLevel, DEFAULT_CONFIDENCE};

    fn input() -> PredictionInput {
        PredictionInput::new(2013, 1485.0, 121.0, 16.37, "Albania", "Maize")
    }

    #[test]
    fn request_serializes_feature_vector() {
        let input = input();
        let json = serde_json::to_string(&PredictRequest::from(&input)).unwrap();
        assert_eq!(
            json,
            r#"{"features":[2013,1485.0,121.0,16.37,"Albania","Maize"]}"#
        );
    }

    #[test]
    fn parses_prediction_with_confidence() {
        let result = parse_prediction(&input(), r#"{"prediction": 36613.2, "confidence": 92}"#)
            .unwrap();
        assert_eq!(result.yield_value, 36613.2);
        assert_eq!(result.confidence, 92);
        assert_eq!(result.factors.rainfall, FactorLevel::High);
        assert_eq!(result.factors.temperature, FactorLevel::Medium);
    }

    #[test]
    fn missing_confidence_defaults() {
        let result = parse_prediction(&input(), r#"{"prediction": 5000}"#).unwrap();
        assert_eq!(result.confidence, DEFAULT_CONFIDENCE);
    }

    #[test]
    fn out_of_range_confidence_is_clamped() {
        let high = parse_prediction(&input(), r#"{"prediction": 1, "confidence": 140}"#).unwrap();
        assert_eq!(high.confidence, 100);
        let low = parse_prediction(&input(), r#"{"prediction": 1, "confidence": -3}"#).unwrap();
        assert_eq!(low.confidence, 0);
    }

    #[test]
    fn service_error_is_reported() {
        let err = parse_prediction(
            &input(),
            r#"{"error": "Expected 6 features: [year, rainfall, pesticides, avgTemp, country, item]"}"#,
        )
        .unwrap_err();
        match err {
            CropCastError::Prediction(msg) => assert!(msg.starts_with("Expected 6 features")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn missing_prediction_is_invalid() {
        assert!(matches!(
            parse_prediction(&input(), r#"{"confidence": 80}"#),
            Err(CropCastError::InvalidData(_))
        ));
        assert!(matches!(
            parse_prediction(&input(), "<html>oops</html>"),
            Err(CropCastError::InvalidData(_))
        ));
    }
}
