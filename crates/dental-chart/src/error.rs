use arch_kernel::OperationError;
use chart_types::ChartError;

/// Errors surfaced by scene assembly and host dispatch.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("chart error: {0}")]
    Chart(#[from] ChartError),

    #[error("geometry error: {0}")]
    Geometry(#[from] OperationError),

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}
