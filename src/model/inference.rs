//! Prediction service over an injected classifier.
//!
//! The service is the only component that touches the scoring function. It
//! holds an atomically swappable, immutable model handle so hot model updates
//! never tear an in-flight prediction.

use crate::encoder::FeatureVector;
use crate::error::EngineError;
use crate::model::artifact::{LogisticScorer, ModelArtifact};
use serde::Serialize;
use std::sync::{Arc, RwLock};
use tracing::info;

/// Capability the external model collaborator must supply: a deterministic,
/// side-effect-free map from a feature vector to a survival probability.
pub trait Scorer: Send + Sync {
    fn score(&self, features: &[f64]) -> Result<f64, EngineError>;
}

/// Model output for one feature vector.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionOutput {
    pub probability_survived: f64,
    pub probability_died: f64,
    /// 1 iff probability_survived >= 0.5
    pub predicted_label: u8,
}

impl PredictionOutput {
    /// Confidence is the probability of the predicted outcome.
    pub fn confidence(&self) -> f64 {
        self.probability_survived.max(self.probability_died)
    }
}

/// Immutable snapshot of a loaded model: scoring function plus the constants
/// versioned with it.
pub struct ModelHandle {
    artifact: ModelArtifact,
    scorer: Box<dyn Scorer>,
}

impl ModelHandle {
    /// Build a handle with the artifact's own logistic scorer.
    pub fn new(artifact: ModelArtifact) -> Result<Self, EngineError> {
        artifact.check()?;
        let scorer = Box::new(LogisticScorer::new(&artifact));
        Ok(Self { artifact, scorer })
    }

    /// Build a handle around an externally supplied scoring function.
    pub fn with_scorer(artifact: ModelArtifact, scorer: Box<dyn Scorer>) -> Result<Self, EngineError> {
        artifact.check()?;
        Ok(Self { artifact, scorer })
    }

    pub fn artifact(&self) -> &ModelArtifact {
        &self.artifact
    }

    pub fn scorer(&self) -> &dyn Scorer {
        self.scorer.as_ref()
    }

    /// Score a raw feature slice, checking the result is a valid probability.
    pub fn score(&self, features: &[f64]) -> Result<f64, EngineError> {
        let probability = self.scorer.score(features)?;
        if !probability.is_finite() || !(0.0..=1.0).contains(&probability) {
            return Err(EngineError::computation(format!(
                "model returned an invalid probability: {probability}"
            )));
        }
        Ok(probability)
    }
}

/// Wraps the injected classifier behind the 0.5 decision threshold.
pub struct PredictionService {
    model: RwLock<Option<Arc<ModelHandle>>>,
}

impl PredictionService {
    /// Create a service with no model published yet.
    pub fn new() -> Self {
        Self {
            model: RwLock::new(None),
        }
    }

    /// Create a service with a model already published.
    pub fn with_model(handle: ModelHandle) -> Self {
        Self {
            model: RwLock::new(Some(Arc::new(handle))),
        }
    }

    /// Atomically publish a new immutable model handle. In-flight predictions
    /// keep the snapshot they already acquired.
    pub fn swap_model(&self, handle: ModelHandle) {
        let version = handle.artifact().version.clone();
        if let Ok(mut slot) = self.model.write() {
            *slot = Some(Arc::new(handle));
            info!(version = %version, "Model handle published");
        }
    }

    /// Acquire the current model snapshot.
    pub fn current(&self) -> Result<Arc<ModelHandle>, EngineError> {
        self.model
            .read()
            .map_err(|_| EngineError::ModelUnavailable)?
            .as_ref()
            .cloned()
            .ok_or(EngineError::ModelUnavailable)
    }

    /// Score a feature vector into a probability pair and predicted label.
    pub fn predict(&self, vector: &FeatureVector) -> Result<PredictionOutput, EngineError> {
        let handle = self.current()?;
        Self::predict_with(&handle, vector)
    }

    /// Score against a specific model snapshot. Callers that issue several
    /// related predictions (counterfactual diffing, attribution) use one
    /// snapshot so all probabilities come from the same model version.
    pub fn predict_with(
        handle: &ModelHandle,
        vector: &FeatureVector,
    ) -> Result<PredictionOutput, EngineError> {
        let probability_survived = handle.score(vector.values())?;

        Ok(PredictionOutput {
            probability_survived,
            probability_died: 1.0 - probability_survived,
            predicted_label: u8::from(probability_survived >= 0.5),
        })
    }
}

impl Default for PredictionService {
    fn default() -> Self {
        Self::new()
    }
}
