//! Priority-ordered rate acquisition with breaker, cache and static fallback.
//!
//! For one request the orchestrator walks the priority list twice at most:
//! once looking for a fresh result (today's cache within the refresh window,
//! else a live fetch), then once for the most recent historical snapshot. If
//! both passes come up empty the bundled static table is returned.

use crate::core::breaker::{CircuitBreaker, ProviderState};
use crate::core::cache::RateStore;
use crate::core::clock::Clock;
use crate::core::conversion::{ConversionError, convert};
use crate::core::rates::{AttemptRecord, Outcome, ProviderKind, RateSnapshot, RateSource, Rates};
use crate::providers::RateFetcher;
use crate::providers::static_table::static_rates;
use anyhow::Result;
use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Rates for one request, plus how they were obtained.
#[derive(Debug, Clone)]
pub struct RateOutcome {
    pub rates: Rates,
    pub base_currency: String,
    pub attempts: Vec<AttemptRecord>,
    pub active: RateSource,
    /// Day the rates were fetched for; `None` for the static table.
    pub as_of: Option<NaiveDate>,
    /// Set when the rates are not today's fresh data.
    pub stale: bool,
}

impl RateOutcome {
    pub fn attempt_chain(&self) -> String {
        self.attempts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ")
    }

    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal, ConversionError> {
        convert(amount, from, to, &self.rates, &self.base_currency)
    }

    fn from_snapshot(snapshot: RateSnapshot, attempts: Vec<AttemptRecord>, stale: bool) -> Self {
        Self {
            rates: snapshot.rates,
            base_currency: snapshot.base_currency,
            attempts,
            active: RateSource::Provider(snapshot.provider),
            as_of: Some(snapshot.date),
            stale,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SampleConversion {
    pub amount: Decimal,
    pub from: String,
    pub to: String,
    pub result: Result<Decimal, ConversionError>,
}

#[derive(Debug, Clone)]
pub struct Diagnostics {
    pub priority: Vec<ProviderKind>,
    pub outcome: RateOutcome,
    pub breaker: Vec<(ProviderKind, ProviderState)>,
    /// Providers the next resolve would skip.
    pub open_circuits: Vec<ProviderKind>,
    pub sample: SampleConversion,
}

/// Preferred provider first, then the default order, without duplicates.
pub fn priority_list(
    preferred: Option<ProviderKind>,
    default_order: &[ProviderKind],
) -> Vec<ProviderKind> {
    let mut list = Vec::with_capacity(default_order.len() + 1);
    for provider in preferred.into_iter().chain(default_order.iter().copied()) {
        if !list.contains(&provider) {
            list.push(provider);
        }
    }
    list
}

pub struct FallbackOrchestrator {
    store: Arc<dyn RateStore>,
    breaker: Arc<CircuitBreaker>,
    fetcher: Arc<dyn RateFetcher>,
    clock: Arc<dyn Clock>,
    default_order: Vec<ProviderKind>,
    refresh_window: Duration,
    base_currency: String,
}

impl FallbackOrchestrator {
    pub fn new(
        store: Arc<dyn RateStore>,
        breaker: Arc<CircuitBreaker>,
        fetcher: Arc<dyn RateFetcher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            breaker,
            fetcher,
            clock,
            default_order: ProviderKind::ALL.to_vec(),
            refresh_window: Duration::hours(24),
            base_currency: "EUR".to_string(),
        }
    }

    pub fn with_default_order(mut self, order: Vec<ProviderKind>) -> Self {
        self.default_order = order;
        self
    }

    pub fn with_refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window = window;
        self
    }

    pub fn with_base_currency(mut self, base: &str) -> Self {
        self.base_currency = base.to_uppercase();
        self
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn priority(&self, preferred: Option<ProviderKind>) -> Vec<ProviderKind> {
        priority_list(preferred, &self.default_order)
    }

    /// Resolves rates for the clock's current day.
    pub async fn resolve(&self, preferred: Option<ProviderKind>) -> RateOutcome {
        self.resolve_for(self.clock.today(), preferred).await
    }

    pub async fn resolve_for(&self, today: NaiveDate, preferred: Option<ProviderKind>) -> RateOutcome {
        let priority = self.priority(preferred);
        let base = self.base_currency.as_str();
        let mut attempts = Vec::with_capacity(priority.len() + 1);

        for &provider in &priority {
            if self.breaker.is_open(provider) {
                debug!(%provider, "Circuit open, skipping provider");
                attempts.push(AttemptRecord::new(provider, Outcome::Failed).with_detail("circuit-open"));
                continue;
            }

            if let Some(snapshot) = self.fresh_cached(today, provider).await {
                info!(%provider, %today, "Using cached rates");
                attempts.push(
                    AttemptRecord::new(provider, Outcome::CacheHit).with_detail(today.to_string()),
                );
                return RateOutcome::from_snapshot(snapshot, attempts, false);
            }

            match self.fetcher.fetch(provider, base).await {
                Ok(snapshot) => {
                    self.breaker.record_success(provider);
                    if let Err(e) = self.store.put(snapshot.clone()).await {
                        warn!(%provider, "Failed to cache fetched rates: {:#}", e);
                    }
                    info!(%provider, count = snapshot.rates.len(), "Fetched fresh rates");
                    attempts.push(
                        AttemptRecord::new(provider, Outcome::Fetched)
                            .with_detail(format!("{} rates", snapshot.rates.len())),
                    );
                    return RateOutcome::from_snapshot(snapshot, attempts, false);
                }
                Err(e) => {
                    warn!(%provider, "{}", e);
                    self.breaker.record_failure(provider);
                    attempts.push(
                        AttemptRecord::new(provider, Outcome::Failed).with_detail(e.failure.to_string()),
                    );
                }
            }
        }

        for &provider in &priority {
            match self.store.get_most_recent(base, provider, today).await {
                Ok(Some(snapshot)) => {
                    warn!(%provider, date = %snapshot.date, "No fresh rates, using most recent cached rates");
                    attempts.push(
                        AttemptRecord::new(provider, Outcome::FallbackCached)
                            .with_detail(snapshot.date.to_string()),
                    );
                    return RateOutcome::from_snapshot(snapshot, attempts, true);
                }
                Ok(None) => {}
                Err(e) => warn!(%provider, "Historical cache lookup failed: {:#}", e),
            }
        }

        error!(%base, "All providers and caches exhausted, using static approximate rates");
        attempts.push(AttemptRecord::new(RateSource::Static, Outcome::Static).with_detail("approximate"));
        RateOutcome {
            rates: static_rates(base),
            base_currency: base.to_string(),
            attempts,
            active: RateSource::Static,
            as_of: None,
            stale: true,
        }
    }

    async fn fresh_cached(&self, today: NaiveDate, provider: ProviderKind) -> Option<RateSnapshot> {
        match self.store.get(today, &self.base_currency, provider).await {
            Ok(Some(snapshot)) => {
                let age = self.clock.now().signed_duration_since(snapshot.fetched_at);
                if age < self.refresh_window {
                    Some(snapshot)
                } else {
                    debug!(%provider, age_mins = age.num_minutes(), "Cached rates older than refresh window");
                    None
                }
            }
            Ok(None) => None,
            Err(e) => {
                warn!(%provider, "Cache read failed, treating as miss: {:#}", e);
                None
            }
        }
    }

    /// Drops today's cached rows for every provider, then resolves again.
    pub async fn force_refresh(&self, preferred: Option<ProviderKind>) -> Result<RateOutcome> {
        let today = self.clock.today();
        let removed = self.store.delete_for_date(today, &self.base_currency).await?;
        info!(%today, removed, "Cleared cached rates for manual refresh");
        Ok(self.resolve_for(today, preferred).await)
    }

    /// Resolves rates and reports them with breaker state and a sample conversion.
    pub async fn diagnose(
        &self,
        preferred: Option<ProviderKind>,
        amount: Decimal,
        from: &str,
        to: &str,
    ) -> Diagnostics {
        let outcome = self.resolve(preferred).await;
        let sample = SampleConversion {
            amount,
            from: from.to_string(),
            to: to.to_string(),
            result: outcome.convert(amount, from, to),
        };
        let priority = self.priority(preferred);
        let open_circuits = priority
            .iter()
            .copied()
            .filter(|p| self.breaker.is_open(*p))
            .collect();
        Diagnostics {
            priority,
            outcome,
            breaker: self.breaker.snapshot(),
            open_circuits,
            sample,
        }
    }
}
