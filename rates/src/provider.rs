//! Price provider adapter trait and shared response types.

use async_trait::async_trait;
use bsvrates_common::{bsv_float_to_satoshis, Currency, Provider};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RatesResult;

/// The request behind a provider response, kept for diagnosing failures.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LastRequest {
    pub method: String,
    pub url: String,
    pub status_code: u16,
}

impl LastRequest {
    pub fn new(method: impl Into<String>, url: impl Into<String>, status_code: u16) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            status_code,
        }
    }
}

impl fmt::Display for LastRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} -> {}", self.method, self.url, self.status_code)
    }
}

/// A provider's own conversion of a fiat amount into BSV.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceConversion {
    /// BSV value of the converted amount.
    pub price: f64,
    pub last_request: Option<LastRequest>,
}

impl PriceConversion {
    /// Satoshi value of the conversion, fractional satoshis rounded up.
    pub fn satoshis(&self) -> bsvrates_common::Result<u64> {
        bsv_float_to_satoshis(self.price)
    }
}

/// Adapter over one external price-quote service.
#[async_trait]
pub trait PriceProvider: Send + Sync {
    /// Which provider this adapter speaks for.
    fn provider(&self) -> Provider;

    /// Current price of one BSV in `currency`.
    async fn get_rate(&self, currency: Currency) -> RatesResult<f64>;

    /// Convert `amount` of `currency` into BSV using the provider's own
    /// conversion endpoint.
    ///
    /// Returns `None` when the provider has no such endpoint; callers then
    /// derive the conversion from [`PriceProvider::get_rate`].
    async fn get_conversion(
        &self,
        _currency: Currency,
        _amount: f64,
    ) -> RatesResult<Option<PriceConversion>> {
        Ok(None)
    }
}

/// Mock price provider for testing.
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{MockCall, MockPriceProvider};

#[cfg(any(test, feature = "test-utils"))]
mod mock {
    use super::*;
    use crate::error::{RatesError, RequestError};
    use parking_lot::Mutex;
    use std::time::Duration;

    /// A call recorded by [`MockPriceProvider`].
    #[derive(Debug, Clone, PartialEq)]
    pub enum MockCall {
        Rate(Currency),
        Conversion(Currency, f64),
    }

    /// Scripted provider that records every call it receives.
    pub struct MockPriceProvider {
        provider: Provider,
        rate: Option<f64>,
        conversion: Option<Option<f64>>,
        delay: Option<Duration>,
        calls: Mutex<Vec<MockCall>>,
    }

    impl MockPriceProvider {
        /// Create a provider whose requests fail until a rate is set.
        pub fn new(provider: Provider) -> Self {
            Self {
                provider,
                rate: None,
                conversion: None,
                delay: None,
                calls: Mutex::new(Vec::new()),
            }
        }

        /// Answer rate requests with `rate`.
        pub fn with_rate(mut self, rate: f64) -> Self {
            self.rate = Some(rate);
            self
        }

        /// Answer conversions natively with a BSV `price`.
        pub fn with_conversion(mut self, price: f64) -> Self {
            self.conversion = Some(Some(price));
            self
        }

        /// Fail native conversion requests.
        pub fn with_failing_conversion(mut self) -> Self {
            self.conversion = Some(None);
            self
        }

        /// Sleep before answering.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn calls(&self) -> Vec<MockCall> {
            self.calls.lock().clone()
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().len()
        }

        fn failure(&self) -> RatesError {
            RatesError::Request {
                provider: self.provider,
                source: RequestError::new(
                    LastRequest::new("GET", format!("mock://{}", self.provider), 502),
                    format!("request to {} fails... 502", self.provider),
                ),
            }
        }

        async fn pause(&self) {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    #[async_trait]
    impl PriceProvider for MockPriceProvider {
        fn provider(&self) -> Provider {
            self.provider
        }

        async fn get_rate(&self, currency: Currency) -> RatesResult<f64> {
            self.calls.lock().push(MockCall::Rate(currency));
            self.pause().await;
            self.rate.ok_or_else(|| self.failure())
        }

        async fn get_conversion(
            &self,
            currency: Currency,
            amount: f64,
        ) -> RatesResult<Option<PriceConversion>> {
            self.calls.lock().push(MockCall::Conversion(currency, amount));
            self.pause().await;
            match self.conversion {
                None => Ok(None),
                Some(Some(price)) => Ok(Some(PriceConversion {
                    price,
                    last_request: Some(LastRequest::new(
                        "GET",
                        format!("mock://{}/conversion", self.provider),
                        200,
                    )),
                })),
                Some(None) => Err(self.failure()),
            }
        }
    }
}
