//! Two-stage price prediction.
//!
//! The high-price specialist runs first and its own estimate decides the
//! price regime. Below [`PRICE_THRESHOLD`] the low-price specialist is
//! asked for the final figure; otherwise the high-price estimate stands.
//! Both specialists predict `log1p(price)`.
//!
//! An initial estimate on the wrong side of the threshold sends the car to
//! the wrong specialist. That is an accepted property of the scheme: the
//! threshold was chosen empirically and is not a perfect separator.

use chrono::{Local, NaiveDate};
use tracing::debug;

use crate::features::{EngineeredFeatureRecord, FeatureEngineer};
use crate::model::ModelSlot;
use crate::types::{PredictionResult, PricingError, RawCarRecord, Specialist};

/// Regime boundary in the currency of the training labels.
pub const PRICE_THRESHOLD: f64 = 49_000.00;

const LOW_ROLE: &str = "model_low";
const HIGH_ROLE: &str = "model_high";

/// Regime for an initial linear-scale estimate. Strictly below the
/// threshold is low-price; the threshold itself is high-price.
pub fn route(initial_price: f64) -> Specialist {
    if initial_price < PRICE_THRESHOLD {
        Specialist::LowPrice
    } else {
        Specialist::HighPrice
    }
}

// ---------------------------------------------------------------------------
// Predictor
// ---------------------------------------------------------------------------

/// Routes each request between the two specialist models.
///
/// Models are injected at construction and only read afterwards, so one
/// predictor can be shared across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct PricePredictor {
    low: ModelSlot,
    high: ModelSlot,
}

impl PricePredictor {
    pub fn new(low: ModelSlot, high: ModelSlot) -> Self {
        Self { low, high }
    }

    /// Whether both specialists loaded.
    pub fn is_ready(&self) -> bool {
        self.low.is_loaded() && self.high.is_loaded()
    }

    /// Estimate the price for one engineered record.
    ///
    /// Calls the high-price model exactly once, and the low-price model at
    /// most once. Fails without calling either model if one is unavailable.
    pub fn predict_price(
        &self,
        features: &EngineeredFeatureRecord,
    ) -> Result<PredictionResult, PricingError> {
        let high = self.high.get(HIGH_ROLE)?;
        let low = self.low.get(LOW_ROLE)?;

        let initial_log = high.predict(features)?;
        let initial_price = initial_log.exp_m1();
        let model_used = route(initial_price);

        debug!(
            initial_price = format!("{initial_price:.2}"),
            threshold = PRICE_THRESHOLD,
            model_used = %model_used,
            "Price regime routed"
        );

        let (final_log, role) = match model_used {
            Specialist::LowPrice => (low.predict(features)?, LOW_ROLE),
            Specialist::HighPrice => (initial_log, HIGH_ROLE),
        };

        let price = final_log.exp_m1();
        if !price.is_finite() || price <= 0.0 {
            return Err(PricingError::InvalidPrediction {
                model: role.to_string(),
                value: price,
            });
        }

        Ok(PredictionResult { price, model_used })
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Feature engineering followed by prediction: the sequence a shell runs
/// for each raw record.
#[derive(Debug, Clone)]
pub struct PricingPipeline {
    engineer: FeatureEngineer,
    predictor: PricePredictor,
}

impl PricingPipeline {
    pub fn new(engineer: FeatureEngineer, predictor: PricePredictor) -> Self {
        Self {
            engineer,
            predictor,
        }
    }

    pub fn engineer(&self) -> &FeatureEngineer {
        &self.engineer
    }

    pub fn predictor(&self) -> &PricePredictor {
        &self.predictor
    }

    /// Engineer `raw` as of `today` and predict its price. No model is
    /// called when the raw record is rejected.
    pub fn estimate(
        &self,
        raw: &RawCarRecord,
        today: NaiveDate,
    ) -> Result<PredictionResult, PricingError> {
        let features = self.engineer.engineer(raw, today)?;
        self.predictor.predict_price(&features)
    }

    /// [`estimate`](Self::estimate) using the local calendar date.
    pub fn estimate_now(&self, raw: &RawCarRecord) -> Result<PredictionResult, PricingError> {
        self.estimate(raw, Local::now().date_naive())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
