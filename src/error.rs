//! Error types.
//!
//! The calendarization pass itself is total: a negative scheduling outcome
//! is a decision-log row, not an error. Errors only come from the upstream
//! contract (input validation, record parsing, activity-library
//! normalisation, profile derivation) and from loading configuration.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors surfaced before the engine runs.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Input tables violate the upstream contract.
    #[error("input validation failed with {} error(s): {}", .0.len(), summarize(.0))]
    Validation(Vec<ValidationError>),
    /// Configuration could not be parsed.
    #[error("invalid engine configuration: {0}")]
    Config(#[from] serde_json::Error),
    /// Upstream records are malformed or miss required columns.
    #[error("malformed input records: {0}")]
    Records(#[source] serde_json::Error),
}

impl From<Vec<ValidationError>> for EngineError {
    fn from(errors: Vec<ValidationError>) -> Self {
        EngineError::Validation(errors)
    }
}

fn summarize(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
