pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use crate::core::clock::{Clock, SystemClock};
use crate::core::config::AppConfig;
use crate::core::{CircuitBreaker, FallbackOrchestrator, ProviderKind};
use anyhow::{Context, Result};
use chrono::Duration;
use providers::ProviderRegistry;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, info};

pub enum AppCommand {
    Rates,
    Refresh,
    Convert {
        amount: Decimal,
        from: String,
        to: Option<String>,
    },
    Diagnose,
    Summary,
}

/// Wires the store, breaker and provider adapters described by `config`.
pub fn build_orchestrator(config: &AppConfig, clock: Arc<dyn Clock>) -> Result<FallbackOrchestrator> {
    let cooldown = i64::try_from(config.breaker.cooldown_secs)
        .ok()
        .and_then(Duration::try_seconds)
        .context("breaker.cooldown_secs is out of range")?;
    let breaker = Arc::new(CircuitBreaker::with_limits(
        Arc::clone(&clock),
        config.breaker.failure_threshold,
        cooldown,
    ));
    let fetcher = Arc::new(ProviderRegistry::new(&config.providers, Arc::clone(&clock))?);
    let store = store::open_rate_store(config);

    Ok(FallbackOrchestrator::new(store, breaker, fetcher, clock)
        .with_default_order(config.providers.order.clone())
        .with_refresh_window(Duration::hours(i64::from(config.refresh_window_hours)))
        .with_base_currency(&config.base_currency))
}

pub async fn run_command(
    command: AppCommand,
    config_path: Option<&str>,
    provider: Option<ProviderKind>,
) -> Result<()> {
    info!("ratewise starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let orchestrator = build_orchestrator(&config, Arc::new(SystemClock))?;
    let preferred = provider.or(config.preferred_provider);
    let display_currency = config.currency.as_str();

    match command {
        AppCommand::Rates => cli::rates::run(&orchestrator, preferred, display_currency).await,
        AppCommand::Refresh => cli::refresh::run(&orchestrator, preferred, display_currency).await,
        AppCommand::Convert { amount, from, to } => {
            let to = to.as_deref().unwrap_or(display_currency);
            cli::convert::run(&orchestrator, preferred, amount, &from, to).await
        }
        AppCommand::Diagnose => cli::diagnose::run(&orchestrator, preferred, display_currency).await,
        AppCommand::Summary => {
            cli::summary::run(&orchestrator, preferred, &config.subscriptions, display_currency).await
        }
    }
}
