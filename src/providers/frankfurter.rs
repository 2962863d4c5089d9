//! frankfurter.app: ECB reference rates.

use crate::core::rates::Rates;
use crate::providers::FetchFailure;
use crate::providers::util::clean_rates;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct FrankfurterResponse {
    base: String,
    rates: HashMap<String, Decimal>,
}

pub fn endpoint(base_url: &str, base: &str) -> String {
    format!("{}/latest?from={}", base_url.trim_end_matches('/'), base)
}

pub fn parse(body: &str, base: &str) -> Result<Rates, FetchFailure> {
    let response: FrankfurterResponse = serde_json::from_str(body)
        .map_err(|e| FetchFailure::Payload(format!("frankfurter response: {e}")))?;

    if !response.base.eq_ignore_ascii_case(base) {
        return Err(FetchFailure::Payload(format!(
            "requested base {} but got {}",
            base, response.base
        )));
    }
    clean_rates(response.rates)
}
