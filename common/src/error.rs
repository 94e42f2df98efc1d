//! Error types for currency, provider and unit values.

use thiserror::Error;

/// Errors raised while building or converting bsvrates values.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BsvRatesError {
    /// Amount is zero, negative, not finite or out of range.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Rate is not a positive finite value.
    #[error("Invalid rate: {0}")]
    InvalidRate(String),

    /// Currency id or name is not known.
    #[error("Unknown currency: {0}")]
    UnknownCurrency(String),

    /// Provider name is not known.
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Provider selection is empty, repeats a provider or uses unknown bits.
    #[error("Invalid provider set: {0}")]
    InvalidProviderSet(String),
}

impl BsvRatesError {
    /// Get error code for logs and API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            BsvRatesError::InvalidAmount(_) => "INVALID_AMOUNT",
            BsvRatesError::InvalidRate(_) => "INVALID_RATE",
            BsvRatesError::UnknownCurrency(_) => "UNKNOWN_CURRENCY",
            BsvRatesError::UnknownProvider(_) => "UNKNOWN_PROVIDER",
            BsvRatesError::InvalidProviderSet(_) => "INVALID_PROVIDER_SET",
        }
    }
}

/// Result type alias for value-level operations.
pub type Result<T> = std::result::Result<T, BsvRatesError>;
