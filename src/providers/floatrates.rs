//! floatrates.com daily feed, keyed by lower-case currency code.

use crate::core::rates::Rates;
use crate::providers::FetchFailure;
use crate::providers::util::clean_rates;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct FloatRatesEntry {
    code: String,
    rate: Decimal,
}

pub fn endpoint(base_url: &str, base: &str) -> String {
    format!(
        "{}/daily/{}.json",
        base_url.trim_end_matches('/'),
        base.to_lowercase()
    )
}

pub fn parse(body: &str, _base: &str) -> Result<Rates, FetchFailure> {
    let entries: HashMap<String, FloatRatesEntry> = serde_json::from_str(body)
        .map_err(|e| FetchFailure::Payload(format!("floatrates response: {e}")))?;

    clean_rates(
        entries
            .into_values()
            .map(|entry| (entry.code, entry.rate))
            .collect(),
    )
}
