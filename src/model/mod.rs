//! Regression models that map an engineered record to a log price.
//!
//! Defines the `PriceModel` capability the predictor depends on, the JSON
//! artifact format fitted models are exported to, and the loader that turns
//! an artifact file into a shareable model.

pub mod linear;
pub mod tree;

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::features::EngineeredFeatureRecord;
use crate::types::PricingError;
use linear::LinearModel;
use tree::TreeEnsemble;

/// A fitted regressor.
///
/// Implementations must be pure with respect to `predict`: the same record
/// always yields the same output and no call mutates the model, so one
/// instance can be shared by every request.
#[cfg_attr(test, mockall::automock)]
pub trait PriceModel: Send + Sync {
    /// Predicted `log1p(price)` for one car.
    fn predict(&self, features: &EngineeredFeatureRecord) -> Result<f64, PricingError>;
}

// ---------------------------------------------------------------------------
// Artifact format
// ---------------------------------------------------------------------------

/// On-disk form of a fitted model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    /// Column names the model was fitted on, order-independent.
    pub features: Vec<String>,
    #[serde(flatten)]
    pub estimator: Estimator,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    Linear(LinearModel),
    TreeEnsemble(TreeEnsemble),
}

impl Estimator {
    fn referenced_features(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Estimator::Linear(m) => Box::new(m.referenced_features()),
            Estimator::TreeEnsemble(m) => Box::new(m.referenced_features()),
        }
    }

    fn validate(&self) -> Result<(), String> {
        match self {
            Estimator::Linear(m) => m.validate(),
            Estimator::TreeEnsemble(m) => m.validate(),
        }
    }

    fn predict(&self, model: &str, features: &EngineeredFeatureRecord) -> Result<f64, PricingError> {
        match self {
            Estimator::Linear(m) => m.predict(model, features),
            Estimator::TreeEnsemble(m) => m.predict(model, features),
        }
    }
}

// ---------------------------------------------------------------------------
// Loaded model
// ---------------------------------------------------------------------------

/// A validated artifact, ready for inference.
#[derive(Debug, Clone)]
pub struct ArtifactModel {
    name: String,
    schema: BTreeSet<String>,
    estimator: Estimator,
}

impl ArtifactModel {
    /// Read and validate an artifact file.
    pub fn load(path: &Path) -> Result<Self, PricingError> {
        let load_err = |reason: String| PricingError::ModelLoad {
            path: path.display().to_string(),
            reason,
        };

        let json = fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let artifact: ModelArtifact =
            serde_json::from_str(&json).map_err(|e| load_err(format!("invalid artifact: {e}")))?;
        let model = Self::from_artifact(artifact).map_err(load_err)?;

        info!(
            path = %path.display(),
            model = %model.name,
            features = model.schema.len(),
            "Model artifact loaded"
        );
        Ok(model)
    }

    /// Validate an in-memory artifact.
    pub fn from_artifact(artifact: ModelArtifact) -> Result<Self, String> {
        if artifact.features.is_empty() {
            return Err("feature list is empty".to_string());
        }

        let mut schema = BTreeSet::new();
        for feature in &artifact.features {
            if !schema.insert(feature.clone()) {
                return Err(format!("duplicate feature {feature}"));
            }
        }

        if let Some(undeclared) = artifact
            .estimator
            .referenced_features()
            .find(|f| !schema.contains(*f))
        {
            return Err(format!("estimator uses undeclared feature {undeclared}"));
        }

        artifact.estimator.validate()?;

        Ok(Self {
            name: artifact.name,
            schema,
            estimator: artifact.estimator,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> &BTreeSet<String> {
        &self.schema
    }
}

impl PriceModel for ArtifactModel {
    fn predict(&self, features: &EngineeredFeatureRecord) -> Result<f64, PricingError> {
        check_schema(&self.name, &self.schema, features)?;
        self.estimator.predict(&self.name, features)
    }
}

/// Require the record's columns to be exactly the model's training columns.
pub fn check_schema(
    model: &str,
    expected: &BTreeSet<String>,
    features: &EngineeredFeatureRecord,
) -> Result<(), PricingError> {
    let provided: BTreeSet<&str> = features.field_names().iter().copied().collect();

    let missing: Vec<String> = expected
        .iter()
        .filter(|f| !provided.contains(f.as_str()))
        .cloned()
        .collect();
    let unexpected: Vec<String> = provided
        .iter()
        .filter(|f| !expected.contains(**f))
        .map(|f| f.to_string())
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(PricingError::FeatureSchemaMismatch {
            model: model.to_string(),
            missing,
            unexpected,
        })
    }
}

/// A column exists but carries the wrong kind of value for the estimator.
pub(crate) fn kind_mismatch(model: &str, feature: &str, expected: &str) -> PricingError {
    PricingError::FeatureSchemaMismatch {
        model: model.to_string(),
        missing: vec![format!("{feature} ({expected})")],
        unexpected: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// Model slot
// ---------------------------------------------------------------------------

/// A model that either loaded at startup or failed to.
///
/// Keeping the failure reason lets a long-running shell report
/// [`PricingError::ModelUnavailable`] per request instead of exiting.
#[derive(Clone)]
pub enum ModelSlot {
    Loaded(Arc<dyn PriceModel>),
    Unavailable { reason: String },
}

impl ModelSlot {
    pub fn loaded<M: PriceModel + 'static>(model: M) -> Self {
        ModelSlot::Loaded(Arc::new(model))
    }

    /// Load an artifact, recording any failure instead of returning it.
    pub fn load(path: &Path) -> Self {
        match ArtifactModel::load(path) {
            Ok(model) => ModelSlot::loaded(model),
            Err(e) => ModelSlot::Unavailable { reason: e.to_string() },
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, ModelSlot::Loaded(_))
    }

    /// The model, or `ModelUnavailable` naming `role`.
    pub fn get(&self, role: &str) -> Result<&dyn PriceModel, PricingError> {
        match self {
            ModelSlot::Loaded(model) => Ok(model.as_ref()),
            ModelSlot::Unavailable { reason } => Err(PricingError::ModelUnavailable {
                model: role.to_string(),
                reason: reason.clone(),
            }),
        }
    }
}

impl fmt::Debug for ModelSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelSlot::Loaded(_) => write!(f, "ModelSlot::Loaded"),
            ModelSlot::Unavailable { reason } => write!(f, "ModelSlot::Unavailable({reason})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
