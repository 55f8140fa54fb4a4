// Utility functions

pub mod json_extractor;

use crate::types::*;

/// Validates a value against a constraint and returns an error if it fails
pub fn validate<T, F>(
    value: T,
    constraint: F,
    error_message: impl Into<String>,
) -> EvalResult<T>
where
    F: FnOnce(&T) -> bool,
{
    if constraint(&value) {
        Ok(value)
    } else {
        Err(EvalError::ValidationError(error_message.into()))
    }
}

/// Validates a range constraint for numeric values
pub fn validate_range<T>(
    value: T,
    min: T,
    max: T,
    param_name: &str,
) -> EvalResult<T>
where
    T: PartialOrd + Copy + std::fmt::Display,
{
    validate(
        value,
        |&v| v >= min && v <= max,
        format!("{} must be between {} and {}, but got {}", param_name, min, max, value),
    )
}
