//! Controller error types.

use thiserror::Error;

use crate::filter::FilterError;

/// Errors returned by [`VisibilityFilterController`](super::VisibilityFilterController).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ControllerError {
    /// The worker task has exited; commands can no longer be applied.
    #[error("Visibility worker has stopped")]
    WorkerStopped,

    /// Filter data supplied by the host was invalid.
    #[error("Invalid visibility filter: {0}")]
    InvalidFilter(#[from] FilterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_stopped_display() {
        assert_eq!(
            ControllerError::WorkerStopped.to_string(),
            "Visibility worker has stopped"
        );
    }

    #[test]
    fn test_from_filter_error() {
        let err: ControllerError = FilterError::MissingField("minZoom").into();
        assert!(matches!(err, ControllerError::InvalidFilter(_)));
        assert!(err.to_string().contains("minZoom"));
    }
}
