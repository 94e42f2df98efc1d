//! Satoshi amounts and the units they are displayed in.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::conversion::bsv_float_to_satoshis;
use crate::currency::Currency;
use crate::error::Result;

/// Number of satoshis in one bitcoin.
pub const SATOSHIS_PER_BITCOIN: u64 = 100_000_000;

/// Display unit for a satoshi amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Unit {
    /// Whole bitcoin, eight decimal places.
    Bsv,
    /// Satoshis, no decimal places.
    Satoshi,
}

impl Unit {
    /// Unit label used when formatting with units.
    pub fn label(self) -> &'static str {
        match self {
            Unit::Bsv => Currency::Bitcoin.name(),
            Unit::Satoshi => "satoshi",
        }
    }

    /// Decimal places between satoshis and this unit.
    pub fn decimal_places(self) -> u32 {
        match self {
            Unit::Bsv => 8,
            Unit::Satoshi => 0,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An amount of bitcoin counted in satoshis.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Amount(u64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub fn from_satoshis(satoshis: u64) -> Self {
        Self(satoshis)
    }

    /// Create from a BSV value, rounding fractional satoshis up.
    pub fn from_bsv(bsv: f64) -> Result<Self> {
        bsv_float_to_satoshis(bsv).map(Self)
    }

    pub fn satoshis(self) -> u64 {
        self.0
    }

    /// Exact value of the amount in the given unit.
    pub fn to_decimal(self, unit: Unit) -> Decimal {
        Decimal::from_i128_with_scale(i128::from(self.0), unit.decimal_places())
    }

    /// Value of the amount in the given unit, for display.
    pub fn to_unit(self, unit: Unit) -> f64 {
        self.0 as f64 / 10f64.powi(unit.decimal_places() as i32)
    }

    /// Format in the given unit with trailing zeros trimmed.
    pub fn format(self, unit: Unit, show_units: bool) -> String {
        let value = self.to_decimal(unit).normalize();
        if show_units {
            format!("{value} {unit}")
        } else {
            value.to_string()
        }
    }

    /// Satoshi count as a plain string.
    pub fn to_satoshi_string(self) -> String {
        self.format(Unit::Satoshi, false)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(Unit::Bsv, true))
    }
}

impl From<u64> for Amount {
    fn from(satoshis: u64) -> Self {
        Self(satoshis)
    }
}
