//! Model artifact loading.
//!
//! The artifact carries everything the engine needs from offline training:
//! the scoring coefficients, the canonical feature order, the baseline
//! probability used as the attribution anchor, and the imputation and
//! reference constants for encoding and per-feature attribution.

use crate::encoder::{FEATURE_COUNT, FEATURE_NAMES};
use crate::error::EngineError;
use crate::model::inference::Scorer;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Trained model artifact, serialized as JSON alongside the model version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelArtifact {
    /// Model version string; counterfactual differences are only comparable
    /// within one version
    pub version: String,
    /// Canonical feature order the weights are indexed by
    pub feature_names: Vec<String>,
    /// Logistic regression coefficients, one per feature
    pub weights: Vec<f64>,
    pub intercept: f64,
    /// Mean predicted probability over the training population
    pub baseline_probability: f64,
    /// Training-set median age, used to impute missing ages
    pub age_median: f64,
    /// Training-set median fare
    pub fare_median: f64,
    /// Population mode/median per feature, the attribution reference point
    pub reference_values: Vec<f64>,
}

impl ModelArtifact {
    /// Load and validate an artifact from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model artifact from {}", path.display()))?;
        let artifact: ModelArtifact = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse model artifact from {}", path.display()))?;

        artifact
            .check()
            .with_context(|| format!("Invalid model artifact in {}", path.display()))?;

        info!(
            version = %artifact.version,
            features = artifact.feature_names.len(),
            baseline = artifact.baseline_probability,
            "Model artifact loaded"
        );

        Ok(artifact)
    }

    /// Validate internal consistency against the encoder's canonical order.
    pub fn check(&self) -> Result<(), EngineError> {
        if self.feature_names.len() != FEATURE_COUNT
            || self.weights.len() != FEATURE_COUNT
            || self.reference_values.len() != FEATURE_COUNT
        {
            return Err(EngineError::computation(format!(
                "artifact expects {} features, encoder produces {}",
                self.feature_names.len(),
                FEATURE_COUNT
            )));
        }
        for (artifact_name, canonical) in self.feature_names.iter().zip(FEATURE_NAMES.iter()) {
            if artifact_name != canonical {
                return Err(EngineError::computation(format!(
                    "artifact feature `{artifact_name}` does not match canonical order entry `{canonical}`"
                )));
            }
        }
        if !(0.0..1.0).contains(&self.baseline_probability) || self.baseline_probability == 0.0 {
            return Err(EngineError::computation(format!(
                "baseline probability {} outside (0, 1)",
                self.baseline_probability
            )));
        }
        let constants = self
            .weights
            .iter()
            .chain(self.reference_values.iter())
            .chain([&self.intercept, &self.age_median, &self.fare_median]);
        for value in constants {
            if !value.is_finite() {
                return Err(EngineError::computation(
                    "artifact contains a non-finite constant",
                ));
            }
        }
        Ok(())
    }
}

impl Default for ModelArtifact {
    /// Built-in coefficients fit to the historical survival patterns, so the
    /// demo runner and tests work without an artifact file.
    fn default() -> Self {
        Self {
            version: "titanic-logistic-1".to_string(),
            feature_names: FEATURE_NAMES.iter().map(|s| s.to_string()).collect(),
            // Order: pclass, age, sibsp, parch, fare, family_size, is_alone,
            // fare_per_person, has_cabin, sex_male, sex_female, embarked_c,
            // embarked_q, embarked_s, title_mr, title_mrs, title_miss,
            // title_master, title_other
            weights: vec![
                -0.75, -0.015, -0.20, -0.05, 0.002, -0.10, -0.05, 0.002, 0.45, -1.30, 1.30, 0.25,
                0.0, -0.10, -0.35, 0.40, 0.35, 0.55, 0.0,
            ],
            intercept: 0.90,
            baseline_probability: 0.3838,
            age_median: 28.0,
            fare_median: 14.45,
            // Population mode/median passenger: 3rd class, male, 28, alone,
            // median fare, embarked Southampton, title Mr
            reference_values: vec![
                3.0, 28.0, 0.0, 0.0, 14.45, 1.0, 1.0, 14.45, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 1.0,
                0.0, 0.0, 0.0, 0.0,
            ],
        }
    }
}

/// Logistic scorer over the artifact coefficients.
#[derive(Debug, Clone)]
pub struct LogisticScorer {
    weights: Vec<f64>,
    intercept: f64,
}

impl LogisticScorer {
    pub fn new(artifact: &ModelArtifact) -> Self {
        Self {
            weights: artifact.weights.clone(),
            intercept: artifact.intercept,
        }
    }
}

impl Scorer for LogisticScorer {
    fn score(&self, features: &[f64]) -> Result<f64, EngineError> {
        if features.len() != self.weights.len() {
            return Err(EngineError::computation(format!(
                "scorer expects {} features, got {}",
                self.weights.len(),
                features.len()
            )));
        }

        let z: f64 = self
            .weights
            .iter()
            .zip(features)
            .map(|(w, x)| w * x)
            .sum::<f64>()
            + self.intercept;

        let probability = 1.0 / (1.0 + (-z).exp());
        if !probability.is_finite() {
            return Err(EngineError::computation(
                "scoring produced a non-finite probability",
            ));
        }
        Ok(probability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_artifact_is_consistent() {
        let artifact = ModelArtifact::default();
        assert!(artifact.check().is_ok());
        assert_eq!(artifact.feature_names.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_artifact_roundtrip() {
        let artifact = ModelArtifact::default();
        let json = serde_json::to_string(&artifact).unwrap();
        let parsed: ModelArtifact = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.version, artifact.version);
        assert_eq!(parsed.weights, artifact.weights);
        assert!(parsed.check().is_ok());
    }

    #[test]
    fn test_check_rejects_length_mismatch() {
        let mut artifact = ModelArtifact::default();
        artifact.weights.pop();
        assert!(artifact.check().is_err());
    }

    #[test]
    fn test_check_rejects_reordered_features() {
        let mut artifact = ModelArtifact::default();
        artifact.feature_names.swap(0, 1);
        assert!(artifact.check().is_err());
    }

    #[test]
    fn test_check_rejects_non_finite_constant() {
        let mut artifact = ModelArtifact::default();
        artifact.weights[0] = f64::NAN;
        assert!(artifact.check().is_err());
    }

    #[test]
    fn test_logistic_score_in_unit_interval() {
        let artifact = ModelArtifact::default();
        let scorer = LogisticScorer::new(&artifact);

        let p = scorer.score(&artifact.reference_values).unwrap();
        assert!(p > 0.0 && p < 1.0);
    }
}
