pub mod erapi;
pub mod floatrates;
pub mod frankfurter;
pub mod static_table;
pub mod util;

use crate::core::clock::Clock;
use crate::core::config::ProvidersConfig;
use crate::core::rates::{ProviderKind, RateSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

/// Why a single fetch did not produce rates.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("timeout")]
    Timeout,
    #[error("HTTP {0}")]
    Status(u16),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("unparseable payload: {0}")]
    Payload(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{provider} fetch failed: {failure}")]
pub struct FetchError {
    pub provider: ProviderKind,
    pub failure: FetchFailure,
}

impl FetchError {
    pub fn new(provider: ProviderKind, failure: FetchFailure) -> Self {
        Self { provider, failure }
    }
}

/// Uniform fetch contract over the fixed provider set.
#[async_trait]
pub trait RateFetcher: Send + Sync {
    async fn fetch(&self, provider: ProviderKind, base: &str) -> Result<RateSnapshot, FetchError>;
}

/// Live HTTP adapters for every [`ProviderKind`].
///
/// Each fetch is exactly one request bounded by the client timeout; there are
/// no retries. Snapshots are stamped with the clock's current day so that a
/// provider publishing yesterday's date still fills today's cache slot.
pub struct ProviderRegistry {
    client: reqwest::Client,
    endpoints: ProvidersConfig,
    clock: Arc<dyn Clock>,
}

impl ProviderRegistry {
    pub fn new(config: &ProvidersConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let client = util::http_client(Duration::from_secs(config.timeout_secs))?;
        Ok(Self {
            client,
            endpoints: config.clone(),
            clock,
        })
    }
}

#[async_trait]
impl RateFetcher for ProviderRegistry {
    #[instrument(name = "RateFetch", skip(self), fields(provider = %provider))]
    async fn fetch(&self, provider: ProviderKind, base: &str) -> Result<RateSnapshot, FetchError> {
        let base_url = self.endpoints.base_url(provider);
        let url = match provider {
            ProviderKind::Frankfurter => frankfurter::endpoint(base_url, base),
            ProviderKind::FloatRates => floatrates::endpoint(base_url, base),
            ProviderKind::ErApiOpen => erapi::endpoint(base_url, base),
        };

        let body = util::get_body(&self.client, &url)
            .await
            .map_err(|f| FetchError::new(provider, f))?;

        let rates = match provider {
            ProviderKind::Frankfurter => frankfurter::parse(&body, base),
            ProviderKind::FloatRates => floatrates::parse(&body, base),
            ProviderKind::ErApiOpen => erapi::parse(&body, base),
        }
        .map_err(|f| FetchError::new(provider, f))?;

        debug!("Fetched {} rates", rates.len());
        Ok(RateSnapshot::new(
            self.clock.today(),
            base,
            provider,
            rates,
            self.clock.now(),
        ))
    }
}
