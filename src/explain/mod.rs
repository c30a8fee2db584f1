//! Prediction explanation components

pub mod attribution;
pub mod counterfactual;
pub mod importance;

pub use attribution::{attribute, FeatureContribution};
pub use counterfactual::{counterfactuals, CounterfactualScenario};
pub use importance::{FeatureImportanceEntry, PartialDependencePoint};
