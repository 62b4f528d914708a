pub mod primitives;
pub mod revolve;
pub mod sweep;

/// Structured error type for mesh-building operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OperationError {
    /// Profile has too few points for the operation.
    #[error("profile has {provided} points, need at least {required}")]
    InsufficientProfile { required: usize, provided: usize },

    /// Too few angular or radial segments.
    #[error("need at least {required} segments, got {provided}")]
    InsufficientSegments { required: usize, provided: usize },

    /// Path has too few points for a sweep or spline.
    #[error("path has {provided} points, need at least {required}")]
    InsufficientPath { required: usize, provided: usize },

    /// Radius / height is zero, negative or not finite.
    #[error("{parameter} must be positive, got {value}")]
    InvalidDimension { parameter: &'static str, value: f64 },
}

pub(crate) fn require_segments(provided: usize, required: usize) -> Result<(), OperationError> {
    if provided < required {
        return Err(OperationError::InsufficientSegments { required, provided });
    }
    Ok(())
}

pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<(), OperationError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(OperationError::InvalidDimension { parameter, value });
    }
    Ok(())
}
