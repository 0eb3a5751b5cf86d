//! Error types for visibility filter construction.

use thiserror::Error;

/// Errors that can occur when building a [`VisibilityFilter`](super::VisibilityFilter).
///
/// Filters are built from host configuration that is expected to always be
/// well formed, so any of these indicates a bug in the caller rather than a
/// recoverable condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    /// The configuration was not a key-value object.
    #[error("Filter configuration must be an object, got {0}")]
    NotAnObject(String),

    /// A required field was absent.
    #[error("Missing required field `{0}`")]
    MissingField(&'static str),

    /// A required field was present but not a number.
    #[error("Field `{field}` must be numeric, got {found}")]
    NotNumeric { field: &'static str, found: String },

    /// A numeric field was NaN or infinite.
    #[error("Field `{field}` must be finite, got {value}")]
    NotFinite { field: &'static str, value: f64 },
}
