//! Rate client error types.

use bsvrates_common::{BsvRatesError, Currency, Provider, ProviderSet};
use serde::Serialize;
use thiserror::Error;

use crate::provider::LastRequest;

/// A request to a provider API that did not produce a response.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({last_request})")]
pub struct RequestError {
    /// The request that failed.
    pub last_request: LastRequest,
    /// What went wrong.
    pub message: String,
}

impl RequestError {
    pub fn new(last_request: LastRequest, message: impl Into<String>) -> Self {
        Self {
            last_request,
            message: message.into(),
        }
    }
}

/// Errors that can occur while fetching rates or conversions.
#[derive(Debug, Error)]
pub enum RatesError {
    /// Currency is not accepted by every provider.
    #[error("Currency [{0}] is not accepted by all providers at this time")]
    CurrencyNotAccepted(Currency),

    /// Amount, rate or other value failed validation.
    #[error(transparent)]
    Value(#[from] BsvRatesError),

    /// Provider API request failed.
    #[error("{provider} request failed: {source}")]
    Request {
        provider: Provider,
        source: RequestError,
    },

    /// Provider answered with a payload that carries no usable price.
    #[error("{provider} returned an invalid response: {reason}")]
    InvalidResponse { provider: Provider, reason: String },

    /// Provider answered with zero or a negative value.
    #[error("{provider} returned a non-positive value")]
    NonPositiveValue { provider: Provider },

    /// Provider is selected but no adapter is registered for it.
    #[error("No adapter registered for {0}")]
    AdapterMissing(Provider),

    /// Caller deadline passed before a provider answered.
    #[error("Deadline exceeded while waiting for {provider}")]
    DeadlineExceeded { provider: Provider },

    /// Every selected provider failed.
    #[error("Unable to get rate from providers: {attempted}")]
    AllProvidersFailed {
        attempted: ProviderSet,
        failures: Vec<ProviderFailure>,
    },
}

impl RatesError {
    /// Get error code for logs and API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RatesError::CurrencyNotAccepted(_) => "CURRENCY_NOT_ACCEPTED",
            RatesError::Value(e) => e.error_code(),
            RatesError::Request { .. } => "PROVIDER_REQUEST_FAILED",
            RatesError::InvalidResponse { .. } => "PROVIDER_INVALID_RESPONSE",
            RatesError::NonPositiveValue { .. } => "PROVIDER_NON_POSITIVE_VALUE",
            RatesError::AdapterMissing(_) => "PROVIDER_ADAPTER_MISSING",
            RatesError::DeadlineExceeded { .. } => "DEADLINE_EXCEEDED",
            RatesError::AllProvidersFailed { .. } => "ALL_PROVIDERS_FAILED",
        }
    }
}

/// Why a single provider was skipped during fail-over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: Provider,
    pub code: &'static str,
    pub reason: String,
}

impl ProviderFailure {
    pub fn new(provider: Provider, error: &RatesError) -> Self {
        Self {
            provider,
            code: error.error_code(),
            reason: error.to_string(),
        }
    }
}

/// Result type for rate operations.
pub type RatesResult<T> = Result<T, RatesError>;
