use thiserror::Error;

/// Failure taxonomy for the forecast core.
///
/// `ModelUnavailable` is a fatal configuration problem; the other variants
/// mean a single input could not be scored and must not abort a batch.
#[derive(Debug, Error)]
pub enum ForecastError {
    #[error("classifier unavailable: {0}")]
    ModelUnavailable(String),

    #[error("classifier prediction failed: {0}")]
    Prediction(String),

    #[error("reference group is empty")]
    InsufficientReferenceData,
}
