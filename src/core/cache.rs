//! Storage abstraction for fetched rate snapshots

use crate::core::rates::{ProviderKind, RateSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

/// Persistent snapshot store keyed by (date, base currency, provider).
#[async_trait]
pub trait RateStore: Send + Sync {
    async fn get(
        &self,
        date: NaiveDate,
        base: &str,
        provider: ProviderKind,
    ) -> Result<Option<RateSnapshot>>;

    /// Latest snapshot dated on or before `on_or_before`.
    async fn get_most_recent(
        &self,
        base: &str,
        provider: ProviderKind,
        on_or_before: NaiveDate,
    ) -> Result<Option<RateSnapshot>>;

    /// Upserts by key. An existing row is only replaced by a strictly newer
    /// `fetched_at`; returns whether the row was written.
    async fn put(&self, snapshot: RateSnapshot) -> Result<bool>;

    /// Removes every provider's row for one day and base. Returns the count.
    async fn delete_for_date(&self, date: NaiveDate, base: &str) -> Result<usize>;
}

/// Whether `incoming` should replace `existing` under the upsert rule.
pub fn supersedes(existing: Option<&RateSnapshot>, incoming: &RateSnapshot) -> bool {
    existing.is_none_or(|current| incoming.fetched_at > current.fetched_at)
}
