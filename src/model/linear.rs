//! Linear regressor over numeric columns and one-hot encoded categories.
//!
//! A category level the model never saw during fitting contributes zero,
//! the same as a one-hot encoder configured to ignore unknown levels.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::kind_mismatch;
use crate::features::{EngineeredFeatureRecord, FeatureValue};
use crate::types::PricingError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearModel {
    pub intercept: f64,
    /// Weight per numeric column.
    #[serde(default)]
    pub numeric: BTreeMap<String, f64>,
    /// Weight per (categorical column, level).
    #[serde(default)]
    pub categorical: BTreeMap<String, BTreeMap<String, f64>>,
}

impl LinearModel {
    pub(crate) fn referenced_features(&self) -> impl Iterator<Item = &str> {
        self.numeric
            .keys()
            .chain(self.categorical.keys())
            .map(String::as_str)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.intercept.is_finite() {
            return Err("intercept is not finite".to_string());
        }
        if let Some((feature, _)) = self.numeric.iter().find(|(_, w)| !w.is_finite()) {
            return Err(format!("weight for {feature} is not finite"));
        }
        for (feature, levels) in &self.categorical {
            if self.numeric.contains_key(feature) {
                return Err(format!("{feature} has both numeric and categorical weights"));
            }
            if let Some((level, _)) = levels.iter().find(|(_, w)| !w.is_finite()) {
                return Err(format!("weight for {feature}={level} is not finite"));
            }
        }
        Ok(())
    }

    pub(crate) fn predict(
        &self,
        model: &str,
        features: &EngineeredFeatureRecord,
    ) -> Result<f64, PricingError> {
        let mut total = self.intercept;

        for (feature, weight) in &self.numeric {
            match features.get(feature) {
                Some(FeatureValue::Numeric(value)) => total += weight * value,
                _ => return Err(kind_mismatch(model, feature, "numeric")),
            }
        }

        for (feature, levels) in &self.categorical {
            match features.get(feature) {
                Some(FeatureValue::Categorical(level)) => {
                    total += levels.get(level).copied().unwrap_or(0.0);
                }
                _ => return Err(kind_mismatch(model, feature, "categorical")),
            }
        }

        Ok(total)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
