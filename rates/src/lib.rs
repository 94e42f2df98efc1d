//! bsvrates
//!
//! BSV exchange rates and fiat to satoshi conversions from several price
//! providers, tried in order until one answers.
//!
//! # Features
//!
//! - Ordered fail-over across CoinPaprika, WhatsOnChain and Preev
//! - Exact decimal satoshi arithmetic with ceiling rounding
//! - Optional per-call deadline
//!
//! # Example
//!
//! ```rust,ignore
//! use bsvrates::{Currency, RatesClient, RatesConfig};
//!
//! let client = RatesClient::with_api_clients(RatesConfig::from_env(), paprika, woc, preev);
//!
//! let quote = client.get_rate(Currency::Dollars, None).await?;
//! println!("1 BSV = {} usd via {}", quote.rate, quote.provider);
//!
//! let conversion = client.get_conversion(Currency::Dollars, 0.01, None).await?;
//! println!("{} satoshis", conversion.satoshis.to_satoshi_string());
//! ```

pub mod client;
pub mod coinpaprika;
pub mod config;
pub mod conversion;
pub mod error;
pub mod preev;
pub mod provider;
pub mod whatsonchain;

pub use bsvrates_common::{Amount, Currency, Provider, ProviderSet, Unit};
pub use client::RatesClient;
pub use config::RatesConfig;
pub use conversion::{ConversionSource, RateQuote, SatoshiQuote};
pub use error::{RatesError, RatesResult};
pub use provider::{LastRequest, PriceConversion, PriceProvider};
