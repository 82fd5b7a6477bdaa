use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropCastError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Data source unavailable: {0}")]
    DataSourceUnavailable(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Rejections raised while turning raw form text into a `PredictionInput`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing Information: please fill in the {0} field")]
    MissingField(&'static str),

    #[error("Invalid Input: {field} must be a valid number (got '{value}')")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Invalid Year: {0} is outside 1900-2100")]
    YearOutOfRange(i32),

    #[error("Invalid Input: {field} cannot be negative")]
    Negative { field: &'static str },

    #[error("Unknown country '{0}'")]
    UnknownCountry(String),

    #[error("Unknown crop '{0}'")]
    UnknownCrop(String),
}

pub type Result<T> = std::result::Result<T, CropCastError>;
