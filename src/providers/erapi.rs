//! open.er-api.com, the keyless ExchangeRate-API endpoint.

use crate::core::rates::Rates;
use crate::providers::FetchFailure;
use crate::providers::util::clean_rates;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

#[derive(Debug, Deserialize)]
struct ErApiResponse {
    result: String,
    base_code: Option<String>,
    #[serde(default)]
    rates: HashMap<String, Decimal>,
    #[serde(rename = "error-type")]
    error_type: Option<String>,
}

pub fn endpoint(base_url: &str, base: &str) -> String {
    format!("{}/v6/latest/{}", base_url.trim_end_matches('/'), base)
}

pub fn parse(body: &str, base: &str) -> Result<Rates, FetchFailure> {
    let response: ErApiResponse = serde_json::from_str(body)
        .map_err(|e| FetchFailure::Payload(format!("erapi response: {e}")))?;

    if response.result != "success" {
        return Err(FetchFailure::Payload(format!(
            "erapi result '{}' ({})",
            response.result,
            response.error_type.as_deref().unwrap_or("no error type")
        )));
    }
    if let Some(code) = &response.base_code
        && !code.eq_ignore_ascii_case(base)
    {
        return Err(FetchFailure::Payload(format!(
            "requested base {base} but got {code}"
        )));
    }
    clean_rates(response.rates)
}
