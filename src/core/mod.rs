//! Core business logic: rate model, breaker, caching contract, orchestration

pub mod billing;
pub mod breaker;
pub mod cache;
pub mod clock;
pub mod config;
pub mod conversion;
pub mod currency;
pub mod log;
pub mod orchestrator;
pub mod rates;
pub mod subscriptions;

// Re-export main types for cleaner imports
pub use breaker::CircuitBreaker;
pub use cache::RateStore;
pub use clock::{Clock, ManualClock, SystemClock};
pub use conversion::{ConversionError, convert};
pub use orchestrator::{Diagnostics, FallbackOrchestrator, RateOutcome};
pub use rates::{AttemptRecord, Outcome, ProviderKind, RateSnapshot, RateSource, Rates};
