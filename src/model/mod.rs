//! Model artifact and prediction components

pub mod artifact;
pub mod inference;

pub use artifact::{LogisticScorer, ModelArtifact};
pub use inference::{ModelHandle, PredictionOutput, PredictionService, Scorer};
