//! Bundled approximate rates used when no provider or cache can answer.

use crate::core::rates::Rates;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const STATIC_TABLE_BASE: &str = "EUR";

const EUR_RATES: &[(&str, Decimal)] = &[
    ("EUR", dec!(1.0)),
    ("USD", dec!(1.09)),
    ("GBP", dec!(0.86)),
    ("CAD", dec!(1.48)),
    ("AUD", dec!(1.65)),
    ("JPY", dec!(157.0)),
    ("CHF", dec!(0.96)),
    ("CNY", dec!(7.85)),
    ("INR", dec!(91.0)),
    ("SEK", dec!(11.3)),
    ("NOK", dec!(11.8)),
    ("DKK", dec!(7.46)),
    ("PLN", dec!(4.35)),
    ("CZK", dec!(24.7)),
    ("HUF", dec!(390.0)),
    ("BGN", dec!(1.96)),
    ("RON", dec!(4.97)),
    ("HRK", dec!(7.53)),
    ("RUB", dec!(100.0)),
    ("TRY", dec!(32.0)),
    ("BRL", dec!(6.15)),
    ("MXN", dec!(18.5)),
    ("SGD", dec!(1.45)),
    ("HKD", dec!(8.5)),
    ("KRW", dec!(1450.0)),
    ("ZAR", dec!(19.8)),
    ("NZD", dec!(1.78)),
    ("THB", dec!(38.5)),
    ("MYR", dec!(5.0)),
    ("PHP", dec!(61.0)),
    ("IDR", dec!(16800.0)),
    ("VND", dec!(26500.0)),
];

/// Static rates expressed against `base`.
///
/// The table is EUR based; other bases are derived by dividing through the
/// base's EUR rate. A base missing from the table only knows itself.
pub fn static_rates(base: &str) -> Rates {
    let eur: Rates = EUR_RATES
        .iter()
        .map(|(code, rate)| (code.to_string(), *rate))
        .collect();

    if base == STATIC_TABLE_BASE {
        return eur;
    }

    match eur.get(base) {
        Some(base_rate) => eur
            .iter()
            .map(|(code, rate)| {
                let rebased = if code == base {
                    Decimal::ONE
                } else {
                    *rate / *base_rate
                };
                (code.clone(), rebased)
            })
            .collect(),
        None => Rates::from([(base.to_string(), Decimal::ONE)]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eur_table() {
        let rates = static_rates("EUR");
        assert_eq!(rates.len(), 32);
        assert_eq!(rates["EUR"], Decimal::ONE);
        assert_eq!(rates["USD"], dec!(1.09));
        assert_eq!(rates["VND"], dec!(26500));
    }

    #[test]
    fn test_rebased_table() {
        let rates = static_rates("GBP");
        assert_eq!(rates["GBP"], Decimal::ONE);
        assert_eq!(rates["JPY"], dec!(157) / dec!(0.86));
        assert!((rates["EUR"] - dec!(1.1627906976744186046511627907)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_unknown_base() {
        let rates = static_rates("XAU");
        assert_eq!(rates.len(), 1);
        assert_eq!(rates["XAU"], Decimal::ONE);
    }
}
