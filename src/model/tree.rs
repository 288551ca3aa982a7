//! Additive ensemble of regression trees (gradient-boosted style).
//!
//! Nodes are stored flat with children addressed by index. Every child
//! index must be greater than its parent's, which keeps each tree acyclic
//! and bounds a walk by the node count.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::kind_mismatch;
use crate::features::{EngineeredFeatureRecord, FeatureValue};
use crate::types::PricingError;

fn default_learning_rate() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeEnsemble {
    pub base_score: f64,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// `value <= threshold` goes left. NaN goes right.
    Numeric {
        feature: String,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Level in `categories` goes left.
    Categorical {
        feature: String,
        categories: BTreeSet<String>,
        left: usize,
        right: usize,
    },
    Leaf { value: f64 },
}

impl TreeEnsemble {
    pub(crate) fn referenced_features(&self) -> impl Iterator<Item = &str> {
        self.trees
            .iter()
            .flat_map(|tree| tree.nodes.iter())
            .filter_map(|node| match node {
                Node::Numeric { feature, .. } | Node::Categorical { feature, .. } => {
                    Some(feature.as_str())
                }
                Node::Leaf { .. } => None,
            })
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.base_score.is_finite() || !self.learning_rate.is_finite() {
            return Err("base_score and learning_rate must be finite".to_string());
        }
        if self.trees.is_empty() {
            return Err("ensemble has no trees".to_string());
        }
        for (t, tree) in self.trees.iter().enumerate() {
            tree.validate().map_err(|e| format!("tree {t}: {e}"))?;
        }
        Ok(())
    }

    pub(crate) fn predict(
        &self,
        model: &str,
        features: &EngineeredFeatureRecord,
    ) -> Result<f64, PricingError> {
        let mut sum = 0.0;
        for tree in &self.trees {
            sum += tree.evaluate(model, features)?;
        }
        Ok(self.base_score + self.learning_rate * sum)
    }
}

impl Tree {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Numeric { left, right, threshold, .. } => {
                    if threshold.is_nan() {
                        return Err(format!("node {idx} has a NaN threshold"));
                    }
                    self.check_children(idx, *left, *right)?;
                }
                Node::Categorical { left, right, .. } => {
                    self.check_children(idx, *left, *right)?;
                }
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {idx} is not finite"));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_children(&self, idx: usize, left: usize, right: usize) -> Result<(), String> {
        for child in [left, right] {
            if child <= idx || child >= self.nodes.len() {
                return Err(format!("node {idx} has invalid child index {child}"));
            }
        }
        Ok(())
    }

    fn evaluate(&self, model: &str, features: &EngineeredFeatureRecord) -> Result<f64, PricingError> {
        let mut idx = 0;
        loop {
            let node = self.nodes.get(idx).ok_or_else(|| PricingError::ModelUnavailable {
                model: model.to_string(),
                reason: format!("tree node {idx} does not exist"),
            })?;
            let next = match node {
                Node::Leaf { value } => return Ok(*value),
                Node::Numeric { feature, threshold, left, right } => {
                    let value = match features.get(feature) {
                        Some(FeatureValue::Numeric(v)) => v,
                        _ => return Err(kind_mismatch(model, feature, "numeric")),
                    };
                    if value <= *threshold { *left } else { *right }
                }
                Node::Categorical { feature, categories, left, right } => {
                    let level = match features.get(feature) {
                        Some(FeatureValue::Categorical(s)) => s,
                        _ => return Err(kind_mismatch(model, feature, "categorical")),
                    };
                    if categories.contains(level) { *left } else { *right }
                }
            };
            if next <= idx {
                return Err(PricingError::ModelUnavailable {
                    model: model.to_string(),
                    reason: format!("tree node {idx} points back to node {next}"),
                });
            }
            idx = next;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
