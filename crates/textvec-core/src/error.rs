use thiserror::Error;

/// Failure taxonomy for the embedding pipeline. Every variant is fatal:
/// the process reports once and exits non-zero, with nothing on stdout.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Input error: {0}")]
    Input(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, Error>;
