//! Rate snapshots, provider identities and attempt records

use anyhow::anyhow;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

/// Currency code to rate relative to the snapshot's base currency.
pub type Rates = BTreeMap<String, Decimal>;

/// The fixed set of external rate sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "frankfurter")]
    Frankfurter,
    #[serde(rename = "floatrates")]
    FloatRates,
    #[serde(rename = "erapi_open")]
    ErApiOpen,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 3] = [
        ProviderKind::Frankfurter,
        ProviderKind::FloatRates,
        ProviderKind::ErApiOpen,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Frankfurter => "frankfurter",
            ProviderKind::FloatRates => "floatrates",
            ProviderKind::ErApiOpen => "erapi_open",
        }
    }
}

impl Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ProviderKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "frankfurter" => Ok(ProviderKind::Frankfurter),
            "floatrates" => Ok(ProviderKind::FloatRates),
            "erapi_open" | "erapi" => Ok(ProviderKind::ErApiOpen),
            _ => Err(anyhow!("Unknown rate provider: {}", s)),
        }
    }
}

/// Where a set of rates came from: a live provider or the bundled table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RateSource {
    Provider(ProviderKind),
    Static,
}

impl Display for RateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RateSource::Provider(kind) => Display::fmt(kind, f),
            RateSource::Static => f.write_str("static"),
        }
    }
}

impl From<ProviderKind> for RateSource {
    fn from(kind: ProviderKind) -> Self {
        RateSource::Provider(kind)
    }
}

/// One provider's rates for one day and one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    pub date: NaiveDate,
    pub base_currency: String,
    pub provider: ProviderKind,
    pub rates: Rates,
    pub fetched_at: DateTime<Utc>,
}

impl RateSnapshot {
    /// Builds a snapshot, forcing the base currency entry to exactly one.
    pub fn new(
        date: NaiveDate,
        base_currency: &str,
        provider: ProviderKind,
        mut rates: Rates,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let base_currency = base_currency.to_uppercase();
        rates.insert(base_currency.clone(), Decimal::ONE);
        Self {
            date,
            base_currency,
            provider,
            rates,
            fetched_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Fetched,
    CacheHit,
    FallbackCached,
    Failed,
    Static,
}

impl Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Outcome::Fetched => "fetched",
            Outcome::CacheHit => "cache-hit",
            Outcome::FallbackCached => "fallback-cached",
            Outcome::Failed => "failed",
            Outcome::Static => "static",
        })
    }
}

/// A single step of the attempt chain for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    pub source: RateSource,
    pub outcome: Outcome,
    pub detail: Option<String>,
}

impl AttemptRecord {
    pub fn new(source: impl Into<RateSource>, outcome: Outcome) -> Self {
        Self {
            source: source.into(),
            outcome,
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl Display for AttemptRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.outcome, &self.detail) {
            (Outcome::Failed, Some(detail)) => {
                write!(f, "{}:{}({})", self.source, self.outcome, detail)
            }
            _ => write!(f, "{}:{}", self.source, self.outcome),
        }
    }
}
