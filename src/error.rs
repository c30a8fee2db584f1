//! Engine error kinds.
//!
//! Validation failures are raised at the boundary before the engine proper
//! runs; model-unavailable and computation errors come from the engine itself.

use thiserror::Error;

/// Errors produced by the prediction and fairness engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A request field is malformed or out of range. Carries the offending
    /// field name so the boundary can report it.
    #[error("invalid value for field `{field}`: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    /// No model handle has been published to the prediction service.
    #[error("model is not loaded")]
    ModelUnavailable,

    /// Encoding or attribution produced a non-finite value, or an internal
    /// invariant (attribution efficiency) was violated beyond tolerance.
    #[error("computation produced an invalid result: {reason}")]
    Computation { reason: String },
}

impl EngineError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    pub fn computation(reason: impl Into<String>) -> Self {
        Self::Computation {
            reason: reason.into(),
        }
    }
}
