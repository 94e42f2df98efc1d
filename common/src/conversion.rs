//! Fixed-point conversions between fiat, BSV and satoshi amounts.
//!
//! Every step that produces a satoshi or cent count runs on [`Decimal`].
//! Float inputs are lifted through their shortest round-trip decimal form, so
//! `0.1` enters the arithmetic as exactly `0.1`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::currency::Currency;
use crate::error::{BsvRatesError, Result};
use crate::monetary::SATOSHIS_PER_BITCOIN;

fn satoshis_per_bitcoin() -> Decimal {
    Decimal::from(SATOSHIS_PER_BITCOIN)
}

/// Lift a finite float into a decimal, `None` if it does not fit.
///
/// Non-zero values too small for the 28 digit scale parse as zero and are
/// rejected with the out of range ones.
pub fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    let decimal: Decimal = value.to_string().parse().ok()?;
    if decimal.is_zero() && value != 0.0 {
        return None;
    }
    Some(decimal)
}

fn ceil_to_satoshis(value: Decimal) -> Result<u64> {
    value.ceil().to_u64().ok_or_else(|| {
        BsvRatesError::InvalidAmount(format!("{value} does not fit in a satoshi count"))
    })
}

/// Check that a fiat amount can be converted: set, finite and positive.
pub fn validate_fiat_amount(amount: f64) -> Result<()> {
    if amount == 0.0 {
        return Err(BsvRatesError::InvalidAmount("an amount must be set".to_string()));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(BsvRatesError::InvalidAmount(format!(
            "amount must be a positive finite value, got {amount}"
        )));
    }
    Ok(())
}

/// Satoshis bought by `amount` of fiat at `rate` fiat per BSV.
///
/// Computes `ceil(amount * 100_000_000 / rate)`.
pub fn rate_and_amount_to_satoshis(rate: f64, amount: f64) -> Result<u64> {
    validate_fiat_amount(amount)?;
    if !rate.is_finite() || rate <= 0.0 {
        return Err(BsvRatesError::InvalidRate(format!(
            "current rate must be a positive value, got {rate}"
        )));
    }

    let amount = decimal_from_f64(amount)
        .ok_or_else(|| BsvRatesError::InvalidAmount(format!("{amount} is out of range")))?;
    let rate = decimal_from_f64(rate)
        .filter(|r| !r.is_zero())
        .ok_or_else(|| BsvRatesError::InvalidRate(format!("{rate} is out of range")))?;

    let satoshis = amount
        .checked_mul(satoshis_per_bitcoin())
        .and_then(|scaled| scaled.checked_div(rate))
        .ok_or_else(|| BsvRatesError::InvalidAmount("satoshi count overflowed".to_string()))?;

    ceil_to_satoshis(satoshis)
}

/// Convert a BSV value to satoshis, rounding fractional satoshis up.
pub fn bsv_float_to_satoshis(bsv: f64) -> Result<u64> {
    if !bsv.is_finite() || bsv < 0.0 {
        return Err(BsvRatesError::InvalidAmount(format!(
            "invalid bitcoin amount {bsv}"
        )));
    }

    let satoshis = decimal_from_f64(bsv)
        .and_then(|value| value.checked_mul(satoshis_per_bitcoin()))
        .ok_or_else(|| BsvRatesError::InvalidAmount(format!("{bsv} is out of range")))?;

    ceil_to_satoshis(satoshis)
}

/// Convert satoshis to BSV for display.
pub fn satoshis_to_bsv(satoshis: u64) -> f64 {
    satoshis as f64 * 0.000_000_01
}

/// Convert dollars to cents, rounding half a cent away from zero.
pub fn dollars_to_cents(dollars: f64) -> Result<i64> {
    let cents = decimal_from_f64(dollars)
        .and_then(|value| value.checked_mul(Decimal::ONE_HUNDRED))
        .map(|value| value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|value| value.to_i64());

    cents.ok_or_else(|| BsvRatesError::InvalidAmount(format!("invalid dollar amount {dollars}")))
}

/// Format cents as dollars with exactly two decimal places.
pub fn cents_to_dollars(cents: i64) -> String {
    Decimal::new(cents, 2).to_string()
}

/// Convert an integer cent price to dollars without float arithmetic.
pub fn convert_int_price_to_float(cents: u64) -> f64 {
    Decimal::from_i128_with_scale(i128::from(cents), 2)
        .to_string()
        .parse()
        .unwrap_or_default()
}

/// Group digits with thousands separators.
pub fn format_commas(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        formatted.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(ch);
    }
    formatted
}

/// Convert a decimal currency value to its integer unit (cents or satoshis).
pub fn transform_currency_to_int(value: f64, currency: Currency) -> Result<i64> {
    match currency {
        Currency::Dollars => dollars_to_cents(value),
        Currency::Bitcoin => {
            let satoshis = bsv_float_to_satoshis(value)?;
            i64::try_from(satoshis).map_err(|_| {
                BsvRatesError::InvalidAmount(format!("{satoshis} satoshis is out of range"))
            })
        }
    }
}

/// Format an integer unit (cents or satoshis) as a decimal currency string.
pub fn transform_int_to_currency(value: i64, currency: Currency) -> String {
    match currency {
        Currency::Dollars => cents_to_dollars(value),
        Currency::Bitcoin => Decimal::new(value, 8).to_string(),
    }
}
