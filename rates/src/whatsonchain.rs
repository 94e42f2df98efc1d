//! WhatsOnChain adapter.

use async_trait::async_trait;
use bsvrates_common::{Currency, Provider};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RatesError, RatesResult, RequestError};
use crate::provider::{LastRequest, PriceProvider};

/// Rate value as sent by the API, either a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    pub fn parse(&self) -> Option<f64> {
        match self {
            RateValue::Number(value) => Some(*value),
            RateValue::Text(text) => text.trim().parse().ok(),
        }
    }
}

impl Default for RateValue {
    fn default() -> Self {
        RateValue::Text(String::new())
    }
}

impl fmt::Display for RateValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateValue::Number(value) => write!(f, "{value}"),
            RateValue::Text(text) => f.write_str(text),
        }
    }
}

/// Current BSV exchange rate.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExchangeRate {
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub rate: RateValue,
    #[serde(skip)]
    pub last_request: Option<LastRequest>,
}

#[async_trait]
pub trait WhatsOnChainApi: Send + Sync {
    async fn get_exchange_rate(&self) -> Result<ExchangeRate, RequestError>;
}

/// [`PriceProvider`] backed by a WhatsOnChain client.
pub struct WhatsOnChainProvider<C> {
    client: C,
}

impl<C: WhatsOnChainApi> WhatsOnChainProvider<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    fn invalid(reason: String) -> RatesError {
        RatesError::InvalidResponse {
            provider: Provider::WhatsOnChain,
            reason,
        }
    }
}

#[async_trait]
impl<C: WhatsOnChainApi> PriceProvider for WhatsOnChainProvider<C> {
    fn provider(&self) -> Provider {
        Provider::WhatsOnChain
    }

    async fn get_rate(&self, currency: Currency) -> RatesResult<f64> {
        let response = self
            .client
            .get_exchange_rate()
            .await
            .map_err(|source| RatesError::Request {
                provider: Provider::WhatsOnChain,
                source,
            })?;

        // The API only quotes one currency; an empty field means the default.
        if !response.currency.is_empty() && !response.currency.eq_ignore_ascii_case(currency.name()) {
            return Err(Self::invalid(format!(
                "rate quoted in {} instead of {}",
                response.currency, currency
            )));
        }

        response
            .rate
            .parse()
            .ok_or_else(|| Self::invalid(format!("unparseable rate {:?}", response.rate.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StubWhatsOnChain {
        response: Result<ExchangeRate, RequestError>,
    }

    impl StubWhatsOnChain {
        fn rate(currency: &str, rate: RateValue) -> Self {
            Self {
                response: Ok(ExchangeRate {
                    currency: currency.to_string(),
                    rate,
                    last_request: None,
                }),
            }
        }
    }

    #[async_trait]
    impl WhatsOnChainApi for StubWhatsOnChain {
        async fn get_exchange_rate(&self) -> Result<ExchangeRate, RequestError> {
            self.response.clone()
        }
    }

    #[test]
    fn test_exchange_rate_json() {
        let text: ExchangeRate =
            serde_json::from_str(r#"{"currency": "USD", "rate": "159.01"}"#).unwrap();
        assert_eq!(text.rate.parse(), Some(159.01));

        let number: ExchangeRate =
            serde_json::from_str(r#"{"currency": "USD", "rate": 159.01}"#).unwrap();
        assert_eq!(number.rate, RateValue::Number(159.01));

        let empty: ExchangeRate = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.rate.parse(), None);
    }

    #[tokio::test]
    async fn test_provider_rate() {
        let provider =
            WhatsOnChainProvider::new(StubWhatsOnChain::rate("usd", RateValue::Text("159.01".into())));
        assert_eq!(provider.provider(), Provider::WhatsOnChain);
        assert_eq!(provider.get_rate(Currency::Dollars).await.unwrap(), 159.01);

        let upper =
            WhatsOnChainProvider::new(StubWhatsOnChain::rate("USD", RateValue::Number(160.5)));
        assert_eq!(upper.get_rate(Currency::Dollars).await.unwrap(), 160.5);
    }

    #[tokio::test]
    async fn test_provider_invalid_responses() {
        let garbled =
            WhatsOnChainProvider::new(StubWhatsOnChain::rate("usd", RateValue::Text("n/a".into())));
        assert!(matches!(
            garbled.get_rate(Currency::Dollars).await,
            Err(RatesError::InvalidResponse { .. })
        ));

        let wrong_currency =
            WhatsOnChainProvider::new(StubWhatsOnChain::rate("eur", RateValue::Number(140.0)));
        assert!(matches!(
            wrong_currency.get_rate(Currency::Dollars).await,
            Err(RatesError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn test_provider_request_failure() {
        let provider = WhatsOnChainProvider::new(StubWhatsOnChain {
            response: Err(RequestError::new(
                LastRequest::new("GET", "https://api.whatsonchain.com/v1/bsv/main/exchangerate", 503),
                "some error occurred",
            )),
        });

        let error = provider.get_rate(Currency::Dollars).await.unwrap_err();
        assert_eq!(error.error_code(), "PROVIDER_REQUEST_FAILED");
    }
}
