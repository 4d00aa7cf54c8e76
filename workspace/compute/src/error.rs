use thiserror::Error;

/// Error types for the forecast engine.
#[derive(Error, Debug)]
pub enum ComputeError {
    /// The training frame has too few usable rows to fit a model.
    #[error("insufficient history: {0}")]
    InsufficientHistory(String),

    /// The fit itself failed (singular system, non-finite coefficients).
    #[error("model fit failure: {0}")]
    ModelFitFailure(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
