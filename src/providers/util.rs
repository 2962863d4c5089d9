use crate::core::rates::Rates;
use crate::providers::FetchFailure;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Builds the shared HTTP client; every request is bounded by `timeout`.
pub fn http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("ratewise/", env!("CARGO_PKG_VERSION")))
        .timeout(timeout)
        .build()
}

fn transport_failure(err: reqwest::Error) -> FetchFailure {
    if err.is_timeout() {
        FetchFailure::Timeout
    } else {
        FetchFailure::Transport(err.to_string())
    }
}

/// Issues a single GET and returns the body of a successful response.
pub async fn get_body(client: &reqwest::Client, url: &str) -> Result<String, FetchFailure> {
    debug!("Requesting rates from {}", url);
    let response = client.get(url).send().await.map_err(transport_failure)?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchFailure::Status(status.as_u16()));
    }

    let body = response.text().await.map_err(transport_failure)?;
    if body.trim().is_empty() {
        return Err(FetchFailure::Payload("empty response".to_string()));
    }
    Ok(body)
}

/// Normalises parsed rates: upper-case 3-letter codes with positive values only.
pub fn clean_rates(raw: HashMap<String, Decimal>) -> Result<Rates, FetchFailure> {
    let rates: Rates = raw
        .into_iter()
        .filter_map(|(code, rate)| {
            let code = code.trim().to_uppercase();
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
                debug!("Dropping rate with malformed code '{}'", code);
                return None;
            }
            if rate <= Decimal::ZERO {
                debug!("Dropping non-positive rate for {}: {}", code, rate);
                return None;
            }
            Some((code, rate))
        })
        .collect();

    if rates.is_empty() {
        return Err(FetchFailure::Payload("no usable rates".to_string()));
    }
    Ok(rates)
}
