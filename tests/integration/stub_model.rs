//! Stub model for integration testing.
//!
//! A deterministic `PriceModel` that returns a fixed log price and counts
//! how often it was asked, with an optional forced error.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use carprice::features::EngineeredFeatureRecord;
use carprice::model::PriceModel;
use carprice::types::PricingError;

/// A price model whose answer is fixed by the test.
///
/// Clones share the call counter, so a test can keep one handle while the
/// predictor owns another.
#[derive(Clone)]
pub struct StubModel {
    log_price: f64,
    calls: Arc<AtomicUsize>,
    last_make: Arc<Mutex<Option<String>>>,
    force_schema_error: bool,
}

impl StubModel {
    /// A model predicting `price` on the linear scale.
    pub fn priced(price: f64) -> Self {
        Self {
            log_price: price.ln_1p(),
            calls: Arc::new(AtomicUsize::new(0)),
            last_make: Arc::new(Mutex::new(None)),
            force_schema_error: false,
        }
    }

    /// A model returning `log_price` unchanged.
    pub fn with_log(log_price: f64) -> Self {
        Self {
            log_price,
            ..Self::priced(0.0)
        }
    }

    /// A model that rejects every record as a schema mismatch.
    pub fn failing() -> Self {
        Self {
            force_schema_error: true,
            ..Self::priced(0.0)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_make(&self) -> Option<String> {
        self.last_make.lock().unwrap().clone()
    }
}

impl PriceModel for StubModel {
    fn predict(&self, features: &EngineeredFeatureRecord) -> Result<f64, PricingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_make.lock().unwrap() = Some(features.make.clone());

        if self.force_schema_error {
            return Err(PricingError::FeatureSchemaMismatch {
                model: "stub".to_string(),
                missing: vec!["Region".to_string()],
                unexpected: Vec::new(),
            });
        }
        Ok(self.log_price)
    }
}
