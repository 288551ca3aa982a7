//! Shared types for the price estimator.
//!
//! The raw request record, the categorical enums it carries, the
//! prediction result handed back to the shell, and the domain error type.
//! Feature-engineering and model modules both depend on these, so they
//! live in one place.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Raw request record
// ---------------------------------------------------------------------------

/// One car as entered by the user, before feature engineering.
///
/// Every attribute is optional on the wire so that an absent field can be
/// reported as [`PricingError::MissingField`] rather than a parse failure.
/// Field names match the column names the models were trained with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCarRecord {
    #[serde(rename = "Make", default)]
    pub make: Option<String>,
    #[serde(rename = "Type", default)]
    pub car_type: Option<String>,
    /// Calendar year of manufacture.
    #[serde(rename = "Year", default)]
    pub year: Option<i32>,
    #[serde(rename = "Mileage", default)]
    pub mileage: Option<f64>,
    #[serde(rename = "Gear_Type", default)]
    pub gear_type: Option<GearType>,
    #[serde(rename = "Origin", default)]
    pub origin: Option<Origin>,
    #[serde(rename = "Options", default)]
    pub options: Option<CarOptions>,
    /// Engine displacement in liters.
    #[serde(rename = "Engine_Size", default)]
    pub engine_size: Option<f64>,
}

impl RawCarRecord {
    /// The record used throughout the tests: a 2018 Toyota Corolla.
    #[cfg(test)]
    pub fn sample() -> Self {
        RawCarRecord {
            make: Some("Toyota".to_string()),
            car_type: Some("Corolla".to_string()),
            year: Some(2018),
            mileage: Some(120_000.0),
            gear_type: Some(GearType::Automatic),
            origin: Some(Origin::Saudi),
            options: Some(CarOptions::Full),
            engine_size: Some(2.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Transmission type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GearType {
    Automatic,
    Manual,
}

impl GearType {
    pub const ALL: &'static [GearType] = &[GearType::Automatic, GearType::Manual];

    pub fn as_str(&self) -> &'static str {
        match self {
            GearType::Automatic => "Automatic",
            GearType::Manual => "Manual",
        }
    }
}

impl fmt::Display for GearType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the car was originally sold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Origin {
    Saudi,
    #[serde(rename = "Gulf Arabic")]
    GulfArabic,
    Other,
    Unknown,
}

impl Origin {
    pub const ALL: &'static [Origin] = &[
        Origin::Saudi,
        Origin::GulfArabic,
        Origin::Other,
        Origin::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::Saudi => "Saudi",
            Origin::GulfArabic => "Gulf Arabic",
            Origin::Other => "Other",
            Origin::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Equipment level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CarOptions {
    Full,
    #[serde(rename = "Semi Full")]
    SemiFull,
    Standard,
}

impl CarOptions {
    pub const ALL: &'static [CarOptions] =
        &[CarOptions::Full, CarOptions::SemiFull, CarOptions::Standard];

    pub fn as_str(&self) -> &'static str {
        match self {
            CarOptions::Full => "Full",
            CarOptions::SemiFull => "Semi Full",
            CarOptions::Standard => "Standard",
        }
    }
}

impl fmt::Display for CarOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Prediction result
// ---------------------------------------------------------------------------

/// Which specialist regressor produced the final estimate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialist {
    #[serde(rename = "low-price specialist")]
    LowPrice,
    #[serde(rename = "high-price specialist")]
    HighPrice,
}

impl Specialist {
    pub fn label(&self) -> &'static str {
        match self {
            Specialist::LowPrice => "low-price specialist",
            Specialist::HighPrice => "high-price specialist",
        }
    }
}

impl fmt::Display for Specialist {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Final estimate for one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Price on the linear scale, in the currency of the training labels.
    pub price: f64,
    pub model_used: Specialist,
}

impl fmt::Display for PredictionResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.0} ({})", self.price, self.model_used)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Domain errors for feature engineering, model loading, and prediction.
#[derive(Debug, thiserror::Error)]
pub enum PricingError {
    #[error("Failed to load model artifact {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Invalid value for {field}: {value}")]
    InvalidRange { field: &'static str, value: f64 },

    #[error(
        "Feature schema mismatch for model {model}: missing [{}], unexpected [{}]",
        .missing.join(", "),
        .unexpected.join(", ")
    )]
    FeatureSchemaMismatch {
        model: String,
        missing: Vec<String>,
        unexpected: Vec<String>,
    },

    #[error("Model unavailable ({model}): {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("Model {model} produced an unusable prediction: {value}")]
    InvalidPrediction { model: String, value: f64 },

    #[error("Tier table error: {0}")]
    TierTable(String),
}

impl PricingError {
    /// Whether the error was caused by the caller's input rather than the
    /// models or the pipeline itself.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PricingError::MissingField(_) | PricingError::InvalidRange { .. }
        )
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
