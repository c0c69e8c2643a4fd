use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::ForecastError;
use crate::features::FeatureVector;

/// One node in a flattened decision tree. `feature < 0` marks a leaf whose
/// `value` is the probability of the positive (top-10) class; split nodes
/// route `row[feature] <= threshold` to `left`, otherwise to `right`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeNode {
    pub feature: i32,
    pub threshold: f64,
    pub left: usize,
    pub right: usize,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    fn predict(&self, row: &[f64]) -> Result<f64, String> {
        let mut index = 0usize;
        // Bounded walk so a cyclic or truncated artifact cannot hang.
        for _ in 0..=self.nodes.len() {
            let node = self
                .nodes
                .get(index)
                .ok_or_else(|| format!("node index {} out of bounds", index))?;
            if node.feature < 0 {
                return Ok(node.value);
            }
            let feature = node.feature as usize;
            let observed = *row
                .get(feature)
                .ok_or_else(|| format!("feature index {} out of bounds", feature))?;
            index = if observed <= node.threshold {
                node.left
            } else {
                node.right
            };
        }
        Err("tree walk did not reach a leaf".to_string())
    }
}

/// Serialized tree-ensemble classifier. Ensemble prediction is the mean of
/// per-tree leaf probabilities.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassifierArtifact {
    pub version: u32,
    pub trees: Vec<DecisionTree>,
}

/// Loaded classifier handle: artifact plus the ordered feature-name list.
///
/// Constructed once at process start and shared behind an `Arc`; it holds
/// no mutable state, so concurrent `predict` calls need no locking.
#[derive(Debug)]
pub struct Classifier {
    artifact: ClassifierArtifact,
    feature_order: Vec<String>,
}

impl Classifier {
    pub fn load(artifact_path: &Path, features_path: &Path) -> Result<Self, ForecastError> {
        let raw = std::fs::read_to_string(artifact_path).map_err(|err| {
            ForecastError::ModelUnavailable(format!(
                "failed to read {}: {}",
                artifact_path.display(),
                err
            ))
        })?;
        let artifact: ClassifierArtifact = serde_json::from_str(&raw).map_err(|err| {
            ForecastError::ModelUnavailable(format!(
                "failed to parse {}: {}",
                artifact_path.display(),
                err
            ))
        })?;

        let raw = std::fs::read_to_string(features_path).map_err(|err| {
            ForecastError::ModelUnavailable(format!(
                "failed to read {}: {}",
                features_path.display(),
                err
            ))
        })?;
        let feature_order: Vec<String> = serde_json::from_str(&raw).map_err(|err| {
            ForecastError::ModelUnavailable(format!(
                "failed to parse {}: {}",
                features_path.display(),
                err
            ))
        })?;

        Self::from_parts(artifact, feature_order)
    }

    /// Build a handle from already-deserialized parts. Validates the
    /// feature-name list against the compiled feature schema; a name the
    /// vector builder cannot produce would silently feed the model zeros,
    /// so it fails the load instead.
    pub fn from_parts(
        artifact: ClassifierArtifact,
        feature_order: Vec<String>,
    ) -> Result<Self, ForecastError> {
        if artifact.trees.is_empty() {
            return Err(ForecastError::ModelUnavailable(
                "artifact contains no trees".to_string(),
            ));
        }
        for name in &feature_order {
            if !FeatureVector::is_known_name(name) {
                return Err(ForecastError::ModelUnavailable(format!(
                    "unknown feature in feature list: {}",
                    name
                )));
            }
        }

        info!(
            trees = artifact.trees.len(),
            features = feature_order.len(),
            "loaded rankability classifier"
        );

        Ok(Self {
            artifact,
            feature_order,
        })
    }

    pub fn feature_order(&self) -> &[String] {
        &self.feature_order
    }

    /// Probability of the positive class for one feature vector.
    ///
    /// The row is assembled strictly in loaded feature order; a name absent
    /// from the vector reads 0.0. Inference failures propagate, never
    /// default.
    pub fn predict(&self, vector: &FeatureVector) -> Result<f64, ForecastError> {
        let row: Vec<f64> = self
            .feature_order
            .iter()
            .map(|name| vector.get(name).unwrap_or(0.0))
            .collect();

        let mut total = 0.0;
        for tree in &self.artifact.trees {
            total += tree.predict(&row).map_err(|err| {
                warn!(?vector, error = %err, "classifier inference failed");
                ForecastError::Prediction(err)
            })?;
        }

        let probability = total / self.artifact.trees.len() as f64;
        Ok(probability.clamp(0.0, 1.0))
    }
}
