//! Type definitions for the fairness pipeline

pub mod passenger;
pub mod response;

pub use passenger::{Embarked, PassengerRecord, Sex};
pub use response::{
    ExplanationResponse, FairnessResponse, FeatureImportanceResponse, PredictionResponse,
};

