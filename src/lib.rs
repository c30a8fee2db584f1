//! Fairness-Aware Survival Prediction Pipeline Library
//!
//! Predicts Titanic passenger survival from an injected classifier, explains
//! each prediction with per-feature attributions and counterfactual
//! scenarios, and audits the predictor for bias across protected attributes
//! (sex, ticket class).

pub mod config;
pub mod dataset;
pub mod encoder;
pub mod error;
pub mod explain;
pub mod fairness;
pub mod metrics;
pub mod model;
pub mod pipeline;
pub mod types;

pub use config::AppConfig;
pub use dataset::HoldoutDataset;
pub use encoder::{FeatureEncoder, FeatureVector};
pub use error::EngineError;
pub use model::{ModelArtifact, ModelHandle, PredictionService};
pub use pipeline::SurvivalPipeline;
pub use types::passenger::PassengerRecord;
