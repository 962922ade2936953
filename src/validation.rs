//! Input validation for calendarization runs.
//!
//! Checks the structural integrity of the two input tables before the
//! engine runs. Detects:
//! - Duplicate or empty customer/activity IDs
//! - Activities without any delivery channel
//! - Surrender ratios outside `[0, 1]`
//!
//! Validation collects every problem instead of stopping at the first, so
//! a caller can report the whole batch at once.

use crate::models::{ActivityDefinition, CustomerProfile};
use std::collections::HashSet;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two rows share the same ID.
    DuplicateId,
    /// A row has a blank ID.
    EmptyId,
    /// An activity has no delivery channel.
    EmptyChannels,
    /// A numeric field is not a number.
    InvalidNumber,
    /// A numeric field is outside its allowed range.
    OutOfRange,
    /// A field holds a value outside its enumeration.
    InvalidEnumValue,
    /// Two upstream extracts share no key.
    NoOverlap,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates the input tables of a calendarization run.
///
/// Checks:
/// 1. No blank or duplicate customer IDs
/// 2. Surrender ratio is finite and within `[0, 1]`
/// 3. No blank or duplicate activity IDs
/// 4. Every activity has at least one channel
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_input(
    customers: &[CustomerProfile],
    activities: &[ActivityDefinition],
) -> ValidationResult {
    let mut errors = Vec::new();

    let mut customer_ids = HashSet::new();
    for c in customers {
        if c.customer_id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Customer with blank CustomerID",
            ));
        } else if !customer_ids.insert(c.customer_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate customer ID: {}", c.customer_id),
            ));
        }

        let ratio = c.percent_surrenders;
        if !ratio.is_finite() || !(0.0..=1.0).contains(&ratio) {
            errors.push(ValidationError::new(
                ValidationErrorKind::OutOfRange,
                format!(
                    "Customer '{}' has PercentSurrenders {} outside [0, 1]",
                    c.customer_id, ratio
                ),
            ));
        }
    }

    let mut activity_ids = HashSet::new();
    for a in activities {
        if a.activity_id.trim().is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Activity with blank ActivityID",
            ));
        } else if !activity_ids.insert(a.activity_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate activity ID: {}", a.activity_id),
            ));
        }

        if a.channels.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyChannels,
                format!("Activity '{}' has no channels", a.activity_id),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
