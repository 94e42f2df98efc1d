//! Rate and satoshi quotes returned by the client.

use bsvrates_common::{decimal_from_f64, Amount, Currency, Provider, SATOSHIS_PER_BITCOIN};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price of one BSV in a fiat currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub currency: Currency,
    /// Fiat per BSV, always positive.
    pub rate: f64,
    /// Provider that produced the rate.
    pub provider: Provider,
    pub quoted_at: DateTime<Utc>,
}

impl RateQuote {
    pub fn new(currency: Currency, rate: f64, provider: Provider) -> Self {
        Self {
            currency,
            rate,
            provider,
            quoted_at: Utc::now(),
        }
    }
}

/// How a satoshi count was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionSource {
    /// The provider converted the amount itself.
    Native,
    /// Derived from the provider's rate.
    Rate(f64),
}

/// A fiat amount converted into satoshis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatoshiQuote {
    pub currency: Currency,
    /// Fiat amount that was converted.
    pub amount: f64,
    pub satoshis: Amount,
    pub provider: Provider,
    pub source: ConversionSource,
    pub executed_at: DateTime<Utc>,
}

impl SatoshiQuote {
    pub fn new(
        currency: Currency,
        amount: f64,
        satoshis: u64,
        provider: Provider,
        source: ConversionSource,
    ) -> Self {
        Self {
            currency,
            amount,
            satoshis: Amount::from_satoshis(satoshis),
            provider,
            source,
            executed_at: Utc::now(),
        }
    }

    /// Fiat per BSV implied by the conversion.
    ///
    /// Lower than the quoted rate by at most one satoshi's worth of rounding.
    pub fn effective_rate(&self) -> Option<Decimal> {
        if self.satoshis.satoshis() == 0 {
            return None;
        }
        decimal_from_f64(self.amount)?
            .checked_mul(Decimal::from(SATOSHIS_PER_BITCOIN))?
            .checked_div(Decimal::from(self.satoshis.satoshis()))
    }
}
