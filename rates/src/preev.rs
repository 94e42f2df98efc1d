//! Preev adapter.

use async_trait::async_trait;
use bsvrates_common::{Currency, Provider};
use serde::{Deserialize, Serialize};

use crate::error::{RatesError, RatesResult, RequestError};
use crate::provider::{LastRequest, PriceProvider};

/// Preev pair id for BSV/USD.
pub const PREEV_PAIR_ID: &str = "12eLTxv1vyUeJtp5zqWbqpdWvfLdZ7dGf8";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Ticker {
    #[serde(rename = "p")]
    pub id: String,
    #[serde(rename = "t")]
    pub timestamp: i64,
    #[serde(rename = "tx")]
    pub transaction: Option<TickerTransaction>,
    #[serde(rename = "i")]
    pub prices: Option<PriceSource>,
    #[serde(skip)]
    pub last_request: Option<LastRequest>,
}

impl Ticker {
    /// Last price from the Preev price index.
    pub fn last_price(&self) -> Option<f64> {
        self.prices.as_ref()?.ppi.as_ref().map(|p| p.last_price)
    }
}

/// Transaction the ticker was published in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TickerTransaction {
    #[serde(rename = "h")]
    pub hash: String,
    #[serde(rename = "t")]
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceSource {
    pub ppi: Option<PriceIndex>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PriceIndex {
    #[serde(rename = "c")]
    pub last_price: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

#[async_trait]
pub trait PreevApi: Send + Sync {
    async fn get_ticker(&self, pair_id: &str) -> Result<Ticker, RequestError>;
}

/// [`PriceProvider`] backed by a Preev client.
pub struct PreevProvider<C> {
    client: C,
    pair_id: String,
}

impl<C: PreevApi> PreevProvider<C> {
    pub fn new(client: C) -> Self {
        Self {
            client,
            pair_id: PREEV_PAIR_ID.to_string(),
        }
    }

    pub fn with_pair_id(mut self, pair_id: impl Into<String>) -> Self {
        self.pair_id = pair_id.into();
        self
    }

    pub fn pair_id(&self) -> &str {
        &self.pair_id
    }
}

#[async_trait]
impl<C: PreevApi> PriceProvider for PreevProvider<C> {
    fn provider(&self) -> Provider {
        Provider::Preev
    }

    async fn get_rate(&self, currency: Currency) -> RatesResult<f64> {
        // The pair is quoted in dollars only.
        if currency != Currency::Dollars {
            return Err(RatesError::CurrencyNotAccepted(currency));
        }

        let ticker = self
            .client
            .get_ticker(&self.pair_id)
            .await
            .map_err(|source| RatesError::Request {
                provider: Provider::Preev,
                source,
            })?;

        ticker.last_price().ok_or_else(|| RatesError::InvalidResponse {
            provider: Provider::Preev,
            reason: format!("ticker {} has no price index", self.pair_id),
        })
    }
}
