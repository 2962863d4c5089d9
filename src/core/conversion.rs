//! Decimal currency conversion over a rates mapping.
//!
//! Rates are expressed against a single base currency. Conversions between two
//! non-base currencies cross through the base. No rounding happens here;
//! presentation code rounds for display.

use crate::core::rates::Rates;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConversionError {
    #[error("No exchange rate available for {0}")]
    MissingRate(String),

    #[error("Exchange rate for {0} is zero")]
    ZeroRate(String),

    #[error("Conversion from {from} to {to} overflowed")]
    Overflow { from: String, to: String },
}

fn rate_of(code: &str, rates: &Rates, base: &str) -> Result<Decimal, ConversionError> {
    match rates.get(code) {
        Some(rate) if rate.is_zero() => Err(ConversionError::ZeroRate(code.to_string())),
        Some(rate) => Ok(*rate),
        None if code == base => Ok(Decimal::ONE),
        None => Err(ConversionError::MissingRate(code.to_string())),
    }
}

pub fn convert(
    amount: Decimal,
    from: &str,
    to: &str,
    rates: &Rates,
    base: &str,
) -> Result<Decimal, ConversionError> {
    if from == to {
        return Ok(amount);
    }

    let overflow = || ConversionError::Overflow {
        from: from.to_string(),
        to: to.to_string(),
    };

    if from == base {
        let to_rate = rate_of(to, rates, base)?;
        return amount.checked_mul(to_rate).ok_or_else(overflow);
    }

    let from_rate = rate_of(from, rates, base)?;
    if to == base {
        return amount.checked_div(from_rate).ok_or_else(overflow);
    }

    let to_rate = rate_of(to, rates, base)?;
    amount
        .checked_mul(to_rate)
        .and_then(|v| v.checked_div(from_rate))
        .ok_or_else(overflow)
}
