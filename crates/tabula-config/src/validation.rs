//! Range and format checks for patch values.
//!
//! Checks are collected rather than short-circuited, so a single call reports
//! every offending field of a patch.
//!
//! # Example
//!
//! ```rust
//! use tabula_config::{Patch, ValidationError};
//!
//! let mut patch = Patch::new("Broken");
//! patch.oscillator.volume = 2.0;
//! patch.unison.voices = 0;
//!
//! let err = patch.validate().unwrap_err();
//! assert!(matches!(err, ValidationError::Multiple(_)));
//! assert_eq!(err.fields(), vec!["oscillator.volume", "unison.voices"]);
//! ```

use thiserror::Error;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric value outside its accepted range.
    #[error("'{field}' value {value} out of range [{min}, {max}]")]
    OutOfRange {
        /// Dotted path of the field, e.g. `envelope.attack_ms`.
        field: String,
        /// The value that was out of range.
        value: f32,
        /// Minimum allowed value.
        min: f32,
        /// Maximum allowed value.
        max: f32,
    },

    /// Value that is not numeric or cannot be interpreted.
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue {
        /// Dotted path of the field.
        field: String,
        /// Description of the problem.
        reason: String,
    },

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    Multiple(Vec<ValidationError>),
}

impl ValidationError {
    /// Dotted paths of every offending field, in the order they were found.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::OutOfRange { field, .. } | Self::InvalidValue { field, .. } => {
                vec![field.as_str()]
            }
            Self::Multiple(errors) => errors.iter().flat_map(Self::fields).collect(),
        }
    }
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Accumulates validation failures.
#[derive(Debug, Default)]
pub(crate) struct Checker {
    errors: Vec<ValidationError>,
}

impl Checker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Record an error unless `min <= value <= max`. NaN always fails.
    pub(crate) fn range(&mut self, field: &str, value: f32, min: f32, max: f32) {
        if !(min..=max).contains(&value) {
            self.errors.push(ValidationError::OutOfRange {
                field: field.to_string(),
                value,
                min,
                max,
            });
        }
    }

    /// Integer variant of [`range`](Self::range).
    pub(crate) fn count(&mut self, field: &str, value: usize, min: usize, max: usize) {
        if !(min..=max).contains(&value) {
            self.errors.push(ValidationError::OutOfRange {
                field: field.to_string(),
                value: value as f32,
                min: min as f32,
                max: max as f32,
            });
        }
    }

    pub(crate) fn invalid(&mut self, field: &str, reason: impl Into<String>) {
        self.errors.push(ValidationError::InvalidValue {
            field: field.to_string(),
            reason: reason.into(),
        });
    }

    /// `Ok` when nothing was recorded, the error itself when exactly one was,
    /// [`ValidationError::Multiple`] otherwise.
    pub(crate) fn finish(mut self) -> ValidationResult<()> {
        match self.errors.len() {
            0 => Ok(()),
            1 => Err(self.errors.remove(0)),
            _ => Err(ValidationError::Multiple(self.errors)),
        }
    }
}
