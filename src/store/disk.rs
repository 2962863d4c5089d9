use crate::core::cache::RateStore;
use crate::core::rates::{ProviderKind, RateSnapshot};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::{Connection, OptionalExtension, params};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;
use tracing::{debug, warn};

const DB_FILE: &str = "rates.sqlite3";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS rate_snapshots (
    base        TEXT    NOT NULL,
    provider    TEXT    NOT NULL,
    date        TEXT    NOT NULL,
    fetched_at  INTEGER NOT NULL,
    payload     TEXT    NOT NULL,
    PRIMARY KEY (base, provider, date)
);
";

/// Rate store backed by a SQLite database in WAL mode.
///
/// Every process opening the same directory shares the same rows; a committed
/// write is visible to other connections immediately. The primary key orders
/// rows by (base, provider, date), so "most recent on or before" is an index
/// walk backwards from the requested day.
pub struct DiskRateStore {
    conn: Mutex<Connection>,
}

impl DiskRateStore {
    pub fn open(path: &Path) -> Result<Self> {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create cache directory: {}", path.display()))?;
        let db_path = path.join(DB_FILE);
        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open rate cache at {}", db_path.display()))?;

        conn.busy_timeout(Duration::from_secs(30))?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        debug!("Rate cache journal mode: {}", mode);
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.execute_batch(SCHEMA)
            .context("Failed to create rate_snapshots table")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    // A panic mid-statement leaves SQLite consistent, so a poisoned lock is still usable.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn decode(payload: &str) -> Result<RateSnapshot> {
    serde_json::from_str(payload).context("Corrupt rate snapshot in cache")
}

#[async_trait]
impl RateStore for DiskRateStore {
    async fn get(
        &self,
        date: NaiveDate,
        base: &str,
        provider: ProviderKind,
    ) -> Result<Option<RateSnapshot>> {
        let payload: Option<String> = self
            .conn()
            .query_row(
                "SELECT payload FROM rate_snapshots WHERE base = ?1 AND provider = ?2 AND date = ?3",
                params![base.to_uppercase(), provider.name(), date_key(date)],
                |row| row.get(0),
            )
            .optional()?;

        match payload {
            Some(payload) => {
                debug!(%date, %provider, "Cache HIT");
                decode(&payload).map(Some)
            }
            None => {
                debug!(%date, %provider, "Cache MISS");
                Ok(None)
            }
        }
    }

    async fn get_most_recent(
        &self,
        base: &str,
        provider: ProviderKind,
        on_or_before: NaiveDate,
    ) -> Result<Option<RateSnapshot>> {
        let conn = self.conn();
        let mut stmt = conn.prepare_cached(
            "SELECT date, payload FROM rate_snapshots
             WHERE base = ?1 AND provider = ?2 AND date <= ?3
             ORDER BY date DESC",
        )?;
        let rows = stmt.query_map(
            params![base.to_uppercase(), provider.name(), date_key(on_or_before)],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )?;

        for row in rows {
            let (date, payload) = row?;
            match decode(&payload) {
                Ok(snapshot) => {
                    debug!(%provider, %date, "Most recent cache row");
                    return Ok(Some(snapshot));
                }
                Err(e) => warn!(%provider, %date, "Skipping unreadable cache row: {:#}", e),
            }
        }
        Ok(None)
    }

    async fn put(&self, snapshot: RateSnapshot) -> Result<bool> {
        let payload = serde_json::to_string(&snapshot)?;
        // Single-statement upsert; the WHERE clause keeps the newest fetch
        // even when several processes race on the same key.
        let changed = self.conn().execute(
            "INSERT INTO rate_snapshots (base, provider, date, fetched_at, payload)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT (base, provider, date) DO UPDATE
                SET fetched_at = excluded.fetched_at, payload = excluded.payload
                WHERE excluded.fetched_at > rate_snapshots.fetched_at",
            params![
                snapshot.base_currency.to_uppercase(),
                snapshot.provider.name(),
                date_key(snapshot.date),
                snapshot.fetched_at.timestamp_micros(),
                payload,
            ],
        )?;
        let written = changed > 0;
        debug!(
            date = %snapshot.date,
            provider = %snapshot.provider,
            written,
            "Cache PUT"
        );
        Ok(written)
    }

    async fn delete_for_date(&self, date: NaiveDate, base: &str) -> Result<usize> {
        let removed = self.conn().execute(
            "DELETE FROM rate_snapshots WHERE base = ?1 AND date = ?2",
            params![base.to_uppercase(), date_key(date)],
        )?;
        debug!(%date, removed, "Cache REMOVE for date");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rates::Rates;
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn snapshot(date: NaiveDate, provider: ProviderKind) -> RateSnapshot {
        let mut rates = Rates::new();
        rates.insert("USD".to_string(), dec!(1.0842));
        rates.insert("JPY".to_string(), dec!(168.31));
        RateSnapshot::new(
            date,
            "EUR",
            provider,
            rates,
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 15, 0).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_disk_store_get_put() {
        let dir = tempdir().unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();

        assert!(store.get(day(1), "EUR", ProviderKind::Frankfurter).await.unwrap().is_none());

        let s = snapshot(day(1), ProviderKind::Frankfurter);
        assert!(store.put(s.clone()).await.unwrap());
        assert_eq!(
            store.get(day(1), "EUR", ProviderKind::Frankfurter).await.unwrap(),
            Some(s)
        );
    }

    #[tokio::test]
    async fn test_disk_store_upsert_rule() {
        let dir = tempdir().unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();
        let s = snapshot(day(1), ProviderKind::FloatRates);

        assert!(store.put(s.clone()).await.unwrap());
        assert!(!store.put(s.clone()).await.unwrap());

        let mut older = s.clone();
        older.fetched_at = s.fetched_at - Duration::seconds(1);
        assert!(!store.put(older).await.unwrap());

        let mut newer = s.clone();
        newer.fetched_at = s.fetched_at + Duration::seconds(1);
        newer.rates.insert("USD".to_string(), dec!(1.1));
        assert!(store.put(newer).await.unwrap());

        let got = store.get(day(1), "EUR", ProviderKind::FloatRates).await.unwrap().unwrap();
        assert_eq!(got.rates["USD"], dec!(1.1));
    }

    #[tokio::test]
    async fn test_disk_store_most_recent() {
        let dir = tempdir().unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();
        for d in [2, 10, 20] {
            store.put(snapshot(day(d), ProviderKind::ErApiOpen)).await.unwrap();
        }
        store.put(snapshot(day(15), ProviderKind::Frankfurter)).await.unwrap();

        let got = store
            .get_most_recent("EUR", ProviderKind::ErApiOpen, day(19))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.date, day(10));

        let got = store
            .get_most_recent("EUR", ProviderKind::ErApiOpen, day(20))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.date, day(20));

        assert!(
            store
                .get_most_recent("EUR", ProviderKind::ErApiOpen, day(1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_most_recent_skips_unreadable_row() {
        let dir = tempdir().unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();
        store.put(snapshot(day(2), ProviderKind::FloatRates)).await.unwrap();
        store.put(snapshot(day(5), ProviderKind::FloatRates)).await.unwrap();

        store
            .conn()
            .execute(
                "UPDATE rate_snapshots SET payload = 'not json' WHERE date = '2024-05-05'",
                [],
            )
            .unwrap();

        let got = store
            .get_most_recent("EUR", ProviderKind::FloatRates, day(6))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.date, day(2));
    }

    #[tokio::test]
    async fn test_disk_store_delete_for_date() {
        let dir = tempdir().unwrap();
        let store = DiskRateStore::open(dir.path()).unwrap();
        store.put(snapshot(day(3), ProviderKind::Frankfurter)).await.unwrap();
        store.put(snapshot(day(3), ProviderKind::ErApiOpen)).await.unwrap();
        store.put(snapshot(day(2), ProviderKind::ErApiOpen)).await.unwrap();

        assert_eq!(store.delete_for_date(day(3), "EUR").await.unwrap(), 2);
        assert!(store.get(day(3), "EUR", ProviderKind::Frankfurter).await.unwrap().is_none());
        assert!(store.get(day(2), "EUR", ProviderKind::ErApiOpen).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_two_handles_share_rows() {
        // Separate connections on one directory behave like separate processes.
        let dir = tempdir().unwrap();
        let first = DiskRateStore::open(dir.path()).unwrap();
        let second = DiskRateStore::open(dir.path()).unwrap();

        let s = snapshot(day(7), ProviderKind::Frankfurter);
        assert!(first.put(s.clone()).await.unwrap());
        assert_eq!(
            second.get(day(7), "EUR", ProviderKind::Frankfurter).await.unwrap(),
            Some(s.clone())
        );

        // The upsert rule holds across handles too.
        assert!(!second.put(s.clone()).await.unwrap());
        assert_eq!(second.delete_for_date(day(7), "EUR").await.unwrap(), 1);
        assert!(first.get(day(7), "EUR", ProviderKind::Frankfurter).await.unwrap().is_none());
    }
}
