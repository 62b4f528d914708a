/// Errors raised while reading clinical chart input.
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("tooth number {value} is outside 1..=32")]
    InvalidToothNumber { value: i64 },

    #[error("chart key {key:?} is not a tooth number")]
    InvalidToothKey { key: String },

    #[error("chart JSON is malformed: {0}")]
    Json(#[from] serde_json::Error),
}
