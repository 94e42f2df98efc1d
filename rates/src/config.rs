//! Rates client configuration.

use bsvrates_common::ProviderSet;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::coinpaprika::COIN_PAPRIKA_QUOTE_ID;
use crate::preev::PREEV_PAIR_ID;

/// Configuration for [`RatesClient`](crate::RatesClient).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesConfig {
    /// Providers tried in order when a call does not name its own.
    pub providers: ProviderSet,
    /// CoinPaprika coin id quoted for BSV.
    pub coin_paprika_coin_id: String,
    /// Preev pair id quoted for BSV/USD.
    pub preev_pair_id: String,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            providers: ProviderSet::default(),
            coin_paprika_coin_id: COIN_PAPRIKA_QUOTE_ID.to_string(),
            preev_pair_id: PREEV_PAIR_ID.to_string(),
        }
    }
}

impl RatesConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults.
    ///
    /// An unparseable provider list is logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(providers) = lookup("BSVRATES_PROVIDERS") {
            match providers.parse::<ProviderSet>() {
                Ok(parsed) => config.providers = parsed,
                Err(error) => warn!(
                    value = %providers,
                    error = %error,
                    "Ignoring invalid BSVRATES_PROVIDERS"
                ),
            }
        }

        if let Some(coin_id) = lookup("BSVRATES_COINPAPRIKA_COIN_ID") {
            config.coin_paprika_coin_id = coin_id;
        }

        if let Some(pair_id) = lookup("BSVRATES_PREEV_PAIR_ID") {
            config.preev_pair_id = pair_id;
        }

        config
    }

    pub fn with_providers(mut self, providers: ProviderSet) -> Self {
        self.providers = providers;
        self
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.providers.is_empty() {
            return Err("Provider list cannot be empty".to_string());
        }

        if self.coin_paprika_coin_id.trim().is_empty() {
            return Err("CoinPaprika coin id cannot be empty".to_string());
        }

        if self.preev_pair_id.trim().is_empty() {
            return Err("Preev pair id cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bsvrates_common::Provider;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = RatesConfig::default();
        assert_eq!(
            config.providers.as_slice(),
            &[Provider::CoinPaprika, Provider::WhatsOnChain, Provider::Preev]
        );
        assert_eq!(config.coin_paprika_coin_id, "bsv-bitcoin-sv");
        assert_eq!(config.preev_pair_id, "12eLTxv1vyUeJtp5zqWbqpdWvfLdZ7dGf8");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_lookup() {
        let config = RatesConfig::from_lookup(lookup(&[
            ("BSVRATES_PROVIDERS", "preev, whatsonchain"),
            ("BSVRATES_COINPAPRIKA_COIN_ID", "bsv-test"),
        ]));
        assert_eq!(
            config.providers.as_slice(),
            &[Provider::Preev, Provider::WhatsOnChain]
        );
        assert_eq!(config.coin_paprika_coin_id, "bsv-test");
        assert_eq!(config.preev_pair_id, PREEV_PAIR_ID);
    }

    #[test]
    fn test_invalid_provider_list_keeps_default() {
        let config = RatesConfig::from_lookup(lookup(&[("BSVRATES_PROVIDERS", "preev,preev")]));
        assert_eq!(config.providers, ProviderSet::default());

        let config = RatesConfig::from_lookup(lookup(&[("BSVRATES_PROVIDERS", "bitstamp")]));
        assert_eq!(config.providers, ProviderSet::default());
    }

    #[test]
    fn test_config_validation() {
        let config = RatesConfig {
            coin_paprika_coin_id: " ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RatesConfig {
            preev_pair_id: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_json() {
        let config = RatesConfig::default()
            .with_providers(ProviderSet::new(vec![Provider::WhatsOnChain]).unwrap());
        let json = serde_json::to_string(&config).unwrap();
        let parsed: RatesConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
