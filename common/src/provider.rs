//! Rate providers and ordered provider selections.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{BsvRatesError, Result};

/// An external price-quote source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Provider {
    /// CoinPaprika market data API.
    CoinPaprika,
    /// WhatsOnChain exchange rate endpoint.
    WhatsOnChain,
    /// Preev price index.
    Preev,
}

impl Provider {
    /// All providers in default priority order.
    pub const ALL: [Provider; 3] = [Provider::CoinPaprika, Provider::WhatsOnChain, Provider::Preev];

    /// Display name of the provider.
    pub fn name(self) -> &'static str {
        match self {
            Provider::CoinPaprika => "CoinPaprika",
            Provider::WhatsOnChain => "WhatsOnChain",
            Provider::Preev => "Preev",
        }
    }

    /// Flag bit used by bit-set style selections.
    pub fn bit(self) -> u8 {
        match self {
            Provider::WhatsOnChain => 1,
            Provider::CoinPaprika => 2,
            Provider::Preev => 4,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Provider {
    type Err = BsvRatesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let name = s.trim();
        Provider::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(name))
            .ok_or_else(|| BsvRatesError::UnknownProvider(s.to_string()))
    }
}

/// Ordered, non-empty selection of providers without repeats.
///
/// Providers are queried in the order they appear here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Provider>", into = "Vec<Provider>")]
pub struct ProviderSet(Vec<Provider>);

impl ProviderSet {
    /// Build a selection from providers in priority order.
    pub fn new(providers: impl IntoIterator<Item = Provider>) -> Result<Self> {
        let mut ordered: Vec<Provider> = Vec::new();
        for provider in providers {
            if ordered.contains(&provider) {
                return Err(BsvRatesError::InvalidProviderSet(format!(
                    "{provider} listed more than once"
                )));
            }
            ordered.push(provider);
        }

        if ordered.is_empty() {
            return Err(BsvRatesError::InvalidProviderSet(
                "at least one provider is required".to_string(),
            ));
        }

        Ok(Self(ordered))
    }

    /// Build a selection from flag bits, ordered by default priority.
    pub fn from_bits(bits: u8) -> Result<Self> {
        let known = Provider::ALL.iter().fold(0u8, |acc, p| acc | p.bit());
        if bits == 0 || bits & !known != 0 {
            return Err(BsvRatesError::InvalidProviderSet(format!(
                "bits {bits:#05b} are not a combination of known providers"
            )));
        }

        Self::new(Provider::ALL.into_iter().filter(|p| bits & p.bit() != 0))
    }

    /// Flag bits of the selected providers.
    pub fn bits(&self) -> u8 {
        self.0.iter().fold(0, |acc, p| acc | p.bit())
    }

    /// Iterate providers in priority order.
    pub fn iter(&self) -> impl Iterator<Item = Provider> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[Provider] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, provider: Provider) -> bool {
        self.0.contains(&provider)
    }

    /// Comma separated display names, e.g. `CoinPaprika, Preev`.
    pub fn names(&self) -> String {
        self.0
            .iter()
            .map(|p| p.name())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl Default for ProviderSet {
    fn default() -> Self {
        Self(Provider::ALL.to_vec())
    }
}

impl fmt::Display for ProviderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.names())
    }
}

impl FromStr for ProviderSet {
    type Err = BsvRatesError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let providers = s
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.parse::<Provider>())
            .collect::<Result<Vec<Provider>>>()?;
        Self::new(providers)
    }
}

impl TryFrom<Vec<Provider>> for ProviderSet {
    type Error = BsvRatesError;

    fn try_from(providers: Vec<Provider>) -> Result<Self> {
        Self::new(providers)
    }
}

impl From<ProviderSet> for Vec<Provider> {
    fn from(set: ProviderSet) -> Self {
        set.0
    }
}

impl From<Provider> for ProviderSet {
    fn from(provider: Provider) -> Self {
        Self(vec![provider])
    }
}

impl<'a> IntoIterator for &'a ProviderSet {
    type Item = Provider;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, Provider>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}
