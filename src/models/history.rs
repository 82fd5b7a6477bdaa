use super::{PredictionInput, PredictionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLocation {
    pub name: String,
    pub country: String,
}

impl HistoryLocation {
    pub fn label(&self) -> String {
        format!("{}, {}", self.name, self.country)
    }
}

/// One past prediction as kept in the local history log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub input: PredictionInput,
    pub prediction: PredictionResult,
    pub location: Option<HistoryLocation>,
}

impl HistoryRecord {
    pub fn new(
        input: PredictionInput,
        prediction: PredictionResult,
        location: Option<HistoryLocation>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            input,
            prediction,
            location,
        }
    }

    pub fn location_label(&self) -> String {
        self.location
            .as_ref()
            .map(|l| l.label())
            .unwrap_or_else(|| "N/A".to_string())
    }
}
