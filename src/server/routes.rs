//! HTTP route handlers.
//!
//! All endpoints return JSON. The pipeline is shared read-only via
//! `Arc<ServerState>`; no handler mutates it.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Datelike, Local};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::features::EngineeredFeatureRecord;
use crate::predictor::{PricingPipeline, PRICE_THRESHOLD};
use crate::types::{CarOptions, GearType, Origin, PricingError, RawCarRecord, Specialist};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// Shared state accessible by all route handlers.
pub struct ServerState {
    pub pipeline: PricingPipeline,
    pub service_name: String,
    pub currency: String,
}

impl ServerState {
    pub fn new(pipeline: PricingPipeline, service_name: String, currency: String) -> Self {
        Self {
            pipeline,
            service_name,
            currency,
        }
    }
}

pub type AppState = Arc<ServerState>;

// ---------------------------------------------------------------------------
// Form choices
// ---------------------------------------------------------------------------

/// Makes offered by the entry form.
pub const FORM_MAKES: &[&str] = &[
    "Chevrolet", "Ford", "GMC", "Hyundai", "Kia", "Lexus", "Mazda", "Mercedes", "Nissan", "Toyota",
];

/// Models offered by the entry form.
pub const FORM_TYPES: &[&str] = &[
    "Accent", "Accord", "Camry", "Corolla", "Elantra", "Hilux", "Land Cruiser", "Sonata", "Yaris",
];

pub const MIN_YEAR: i32 = 1960;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub service: String,
    pub ready: bool,
    pub tier_table_version: String,
    pub price_threshold: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NumericInput<T> {
    pub min: T,
    pub max: T,
    pub step: T,
    pub default: T,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionsResponse {
    pub makes: Vec<&'static str>,
    pub types: Vec<&'static str>,
    pub gear_types: Vec<&'static str>,
    pub origins: Vec<&'static str>,
    pub options: Vec<&'static str>,
    pub year: NumericInput<i32>,
    pub mileage: NumericInput<f64>,
    pub engine_size: NumericInput<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub price: f64,
    pub model_used: Specialist,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize)]
struct ErrorBody {
    error: String,
}

/// A pipeline error rendered as a JSON response.
#[derive(Debug)]
pub struct ApiError(pub PricingError);

impl From<PricingError> for ApiError {
    fn from(e: PricingError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            e if e.is_input_error() => StatusCode::UNPROCESSABLE_ENTITY,
            PricingError::ModelUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// GET /api/status
pub async fn get_status(State(state): State<AppState>) -> Json<StatusResponse> {
    Json(StatusResponse {
        service: state.service_name.clone(),
        ready: state.pipeline.predictor().is_ready(),
        tier_table_version: state.pipeline.engineer().tiers().version().to_string(),
        price_threshold: PRICE_THRESHOLD,
    })
}

/// GET /api/options
pub async fn get_options() -> Json<OptionsResponse> {
    Json(OptionsResponse {
        makes: FORM_MAKES.to_vec(),
        types: FORM_TYPES.to_vec(),
        gear_types: GearType::ALL.iter().map(GearType::as_str).collect(),
        origins: Origin::ALL.iter().map(Origin::as_str).collect(),
        options: CarOptions::ALL.iter().map(CarOptions::as_str).collect(),
        year: NumericInput {
            min: MIN_YEAR,
            max: Local::now().year(),
            step: 1,
            default: 2018,
        },
        mileage: NumericInput {
            min: 100.0,
            max: 1_000_000.0,
            step: 1_000.0,
            default: 120_000.0,
        },
        engine_size: NumericInput {
            min: 1.0,
            max: 9.0,
            step: 0.1,
            default: 2.0,
        },
    })
}

/// POST /api/features
pub async fn post_features(
    State(state): State<AppState>,
    Json(raw): Json<RawCarRecord>,
) -> Result<Json<EngineeredFeatureRecord>, ApiError> {
    let features = state
        .pipeline
        .engineer()
        .engineer(&raw, Local::now().date_naive())?;
    Ok(Json(features))
}

/// POST /api/predict
pub async fn post_predict(
    State(state): State<AppState>,
    Json(raw): Json<RawCarRecord>,
) -> Result<Json<PredictResponse>, ApiError> {
    let request_id = Uuid::new_v4();

    match state.pipeline.estimate_now(&raw) {
        Ok(result) => {
            info!(
                %request_id,
                make = raw.make.as_deref().unwrap_or_default(),
                price = format!("{:.0}", result.price),
                model_used = %result.model_used,
                "Prediction served"
            );
            Ok(Json(PredictResponse {
                price: result.price,
                model_used: result.model_used,
                currency: state.currency.clone(),
            }))
        }
        Err(e) => {
            warn!(%request_id, error = %e, "Prediction failed");
            Err(ApiError(e))
        }
    }
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
