use thiserror::Error;

/// Error types for the market-data loader.
#[derive(Error, Debug)]
pub enum MarketError {
    /// The provider was unreachable, answered with an error status, or
    /// returned no usable rows for the ticker.
    #[error("no market data available for '{ticker}': {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// The provider answered but the payload did not match the expected
    /// chart schema.
    #[error("failed to decode market data for '{ticker}': {reason}")]
    Decode { ticker: String, reason: String },
}

impl MarketError {
    pub fn unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    pub fn decode(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }
}

/// Type alias for Result with MarketError
pub type Result<T> = std::result::Result<T, MarketError>;
