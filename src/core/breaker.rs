//! Per-provider failure tracking.
//!
//! A provider is skipped ("open") once it has failed `failure_threshold` times
//! in a row and its last failure is younger than `cooldown`. One success
//! clears the count. The state is process-local and may be lost on restart.

use crate::core::clock::Clock;
use crate::core::rates::ProviderKind;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

pub const DEFAULT_FAILURE_THRESHOLD: u32 = 3;
pub const DEFAULT_COOLDOWN_SECS: u64 = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderState {
    pub consecutive_failures: u32,
    pub last_failure_at: Option<DateTime<Utc>>,
}

pub struct CircuitBreaker {
    states: Mutex<HashMap<ProviderKind, ProviderState>>,
    clock: Arc<dyn Clock>,
    failure_threshold: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_limits(
            clock,
            DEFAULT_FAILURE_THRESHOLD,
            Duration::seconds(DEFAULT_COOLDOWN_SECS as i64),
        )
    }

    pub fn with_limits(clock: Arc<dyn Clock>, failure_threshold: u32, cooldown: Duration) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            clock,
            failure_threshold,
            cooldown,
        }
    }

    // Breaker state is advisory, so a poisoned lock is still usable.
    fn states(&self) -> MutexGuard<'_, HashMap<ProviderKind, ProviderState>> {
        self.states.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn record_failure(&self, provider: ProviderKind) {
        let now = self.clock.now();
        let mut states = self.states();
        let state = states.entry(provider).or_insert(ProviderState {
            consecutive_failures: 0,
            last_failure_at: None,
        });
        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.last_failure_at = Some(now);
        debug!(
            %provider,
            failures = state.consecutive_failures,
            "Recorded provider failure"
        );
    }

    pub fn record_success(&self, provider: ProviderKind) {
        if self.states().remove(&provider).is_some() {
            debug!(%provider, "Cleared provider failures");
        }
    }

    pub fn is_open(&self, provider: ProviderKind) -> bool {
        let now = self.clock.now();
        match self.states().get(&provider) {
            Some(ProviderState {
                consecutive_failures,
                last_failure_at: Some(last),
            }) => {
                *consecutive_failures >= self.failure_threshold
                    && now.signed_duration_since(*last) < self.cooldown
            }
            _ => false,
        }
    }

    pub fn state(&self, provider: ProviderKind) -> Option<ProviderState> {
        self.states().get(&provider).copied()
    }

    /// Current state of every provider that has recorded failures.
    pub fn snapshot(&self) -> Vec<(ProviderKind, ProviderState)> {
        let mut entries: Vec<_> = self.states().iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by_key(|(k, _)| *k);
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use chrono::TimeZone;

    fn breaker() -> (Arc<ManualClock>, CircuitBreaker) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
        ));
        let breaker = CircuitBreaker::new(clock.clone());
        (clock, breaker)
    }

    #[test]
    fn test_opens_after_three_failures() {
        let (_, breaker) = breaker();
        let p = ProviderKind::Frankfurter;

        breaker.record_failure(p);
        breaker.record_failure(p);
        assert!(!breaker.is_open(p));

        breaker.record_failure(p);
        assert!(breaker.is_open(p));
        assert!(!breaker.is_open(ProviderKind::FloatRates));
    }

    #[test]
    fn test_closes_after_cooldown() {
        let (clock, breaker) = breaker();
        let p = ProviderKind::ErApiOpen;
        for _ in 0..3 {
            breaker.record_failure(p);
        }

        clock.advance(Duration::seconds(299));
        assert!(breaker.is_open(p));

        clock.advance(Duration::seconds(1));
        assert!(!breaker.is_open(p));
    }

    #[test]
    fn test_failure_after_cooldown_reopens() {
        let (clock, breaker) = breaker();
        let p = ProviderKind::ErApiOpen;
        for _ in 0..3 {
            breaker.record_failure(p);
        }
        clock.advance(Duration::minutes(6));
        assert!(!breaker.is_open(p));

        breaker.record_failure(p);
        assert!(breaker.is_open(p));
        assert_eq!(breaker.state(p).unwrap().consecutive_failures, 4);
    }

    #[test]
    fn test_success_clears_state() {
        let (_, breaker) = breaker();
        let p = ProviderKind::FloatRates;
        for _ in 0..5 {
            breaker.record_failure(p);
        }
        assert!(breaker.is_open(p));

        breaker.record_success(p);
        assert!(!breaker.is_open(p));
        assert!(breaker.state(p).is_none());
        assert!(breaker.snapshot().is_empty());
    }

    #[test]
    fn test_custom_limits() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let breaker = CircuitBreaker::with_limits(clock.clone(), 1, Duration::seconds(10));
        breaker.record_failure(ProviderKind::Frankfurter);
        assert!(breaker.is_open(ProviderKind::Frankfurter));
        clock.advance(Duration::seconds(10));
        assert!(!breaker.is_open(ProviderKind::Frankfurter));
    }
}
