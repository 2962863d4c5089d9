use crate::core::cache::{RateStore, supersedes};
use crate::core::rates::{ProviderKind, RateSnapshot};
use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::RwLock;
use tracing::debug;

type SnapshotKey = (String, ProviderKind, NaiveDate);

/// In-memory rate store, used when the on-disk database is unavailable and in tests.
#[derive(Default)]
pub struct MemoryRateStore {
    inner: RwLock<BTreeMap<SnapshotKey, RateSnapshot>>,
}

impl MemoryRateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn key(base: &str, provider: ProviderKind, date: NaiveDate) -> SnapshotKey {
    (base.to_uppercase(), provider, date)
}

#[async_trait]
impl RateStore for MemoryRateStore {
    async fn get(
        &self,
        date: NaiveDate,
        base: &str,
        provider: ProviderKind,
    ) -> Result<Option<RateSnapshot>> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let value = map.get(&key(base, provider, date)).cloned();
        if value.is_some() {
            debug!(%date, %provider, "Cache HIT");
        } else {
            debug!(%date, %provider, "Cache MISS");
        }
        Ok(value)
    }

    async fn get_most_recent(
        &self,
        base: &str,
        provider: ProviderKind,
        on_or_before: NaiveDate,
    ) -> Result<Option<RateSnapshot>> {
        let map = self.inner.read().unwrap_or_else(|e| e.into_inner());
        let range = key(base, provider, NaiveDate::MIN)..=key(base, provider, on_or_before);
        Ok(map.range(range).next_back().map(|(_, v)| v.clone()))
    }

    async fn put(&self, snapshot: RateSnapshot) -> Result<bool> {
        let k = key(&snapshot.base_currency, snapshot.provider, snapshot.date);
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if !supersedes(map.get(&k), &snapshot) {
            debug!(date = %k.2, provider = %k.1, "Cache PUT skipped, stored row is as new");
            return Ok(false);
        }
        debug!(date = %k.2, provider = %k.1, "Cache PUT");
        map.insert(k, snapshot);
        Ok(true)
    }

    async fn delete_for_date(&self, date: NaiveDate, base: &str) -> Result<usize> {
        let mut map = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let removed = ProviderKind::ALL
            .iter()
            .filter(|p| map.remove(&key(base, **p, date)).is_some())
            .count();
        debug!(%date, removed, "Cache REMOVE for date");
        Ok(removed)
    }
}
