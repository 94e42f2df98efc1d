//! Currencies that rates and amounts can be denominated in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BsvRatesError;

/// A currency known to bsvrates.
///
/// Only [`Currency::Dollars`] is accepted by every provider today. Bitcoin
/// exists so satoshi amounts can be formatted and transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    /// US dollars.
    #[serde(rename = "usd")]
    Dollars,
    /// Bitcoin SV.
    #[serde(rename = "bsv")]
    Bitcoin,
}

impl Currency {
    /// All known currencies in id order.
    pub const ALL: [Currency; 2] = [Currency::Dollars, Currency::Bitcoin];

    /// Numeric id of the currency.
    pub fn id(self) -> u8 {
        match self {
            Currency::Dollars => 1,
            Currency::Bitcoin => 2,
        }
    }

    /// Display name of the currency.
    pub fn name(self) -> &'static str {
        match self {
            Currency::Dollars => "usd",
            Currency::Bitcoin => "bsv",
        }
    }

    /// Whether the currency is accepted by all providers.
    pub fn is_accepted(self) -> bool {
        matches!(self, Currency::Dollars)
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Currency {
    type Error = BsvRatesError;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        Currency::ALL
            .into_iter()
            .find(|c| c.id() == id)
            .ok_or_else(|| BsvRatesError::UnknownCurrency(id.to_string()))
    }
}

impl FromStr for Currency {
    type Err = BsvRatesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Currency::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| BsvRatesError::UnknownCurrency(s.to_string()))
    }
}
