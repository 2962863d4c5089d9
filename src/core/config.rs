use crate::core::billing::BillingCycle;
use crate::core::breaker::{DEFAULT_COOLDOWN_SECS, DEFAULT_FAILURE_THRESHOLD};
use crate::core::currency;
use crate::core::rates::ProviderKind;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::{debug, warn};

pub const MAX_FETCH_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderEndpoint {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    #[serde(default = "default_order")]
    pub order: Vec<ProviderKind>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    pub frankfurter: Option<ProviderEndpoint>,
    pub floatrates: Option<ProviderEndpoint>,
    pub erapi_open: Option<ProviderEndpoint>,
}

fn default_order() -> Vec<ProviderKind> {
    ProviderKind::ALL.to_vec()
}

fn default_timeout_secs() -> u64 {
    MAX_FETCH_TIMEOUT_SECS
}

impl ProvidersConfig {
    pub fn default_base_url(provider: ProviderKind) -> &'static str {
        match provider {
            ProviderKind::Frankfurter => "https://api.frankfurter.app",
            ProviderKind::FloatRates => "https://www.floatrates.com",
            ProviderKind::ErApiOpen => "https://open.er-api.com",
        }
    }

    pub fn base_url(&self, provider: ProviderKind) -> &str {
        let endpoint = match provider {
            ProviderKind::Frankfurter => &self.frankfurter,
            ProviderKind::FloatRates => &self.floatrates,
            ProviderKind::ErApiOpen => &self.erapi_open,
        };
        endpoint
            .as_ref()
            .map_or(Self::default_base_url(provider), |e| e.base_url.as_str())
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        let endpoint = |p| {
            Some(ProviderEndpoint {
                base_url: Self::default_base_url(p).to_string(),
            })
        };
        ProvidersConfig {
            order: default_order(),
            timeout_secs: default_timeout_secs(),
            frankfurter: endpoint(ProviderKind::Frankfurter),
            floatrates: endpoint(ProviderKind::FloatRates),
            erapi_open: endpoint(ProviderKind::ErApiOpen),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BreakerConfig {
    pub failure_threshold: u32,
    pub cooldown_secs: u64,
}

impl Default for BreakerConfig {
    fn default() -> Self {
        BreakerConfig {
            failure_threshold: DEFAULT_FAILURE_THRESHOLD,
            cooldown_secs: DEFAULT_COOLDOWN_SECS,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Subscription {
    pub name: String,
    pub cost: Decimal,
    pub currency: String,
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub billing_cycle: BillingCycle,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Display currency
    pub currency: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    pub preferred_provider: Option<ProviderKind>,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default = "default_refresh_window_hours")]
    pub refresh_window_hours: u32,
    #[serde(default)]
    pub breaker: BreakerConfig,
    pub data_path: Option<String>,
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

fn default_base_currency() -> String {
    "EUR".to_string()
}

fn default_refresh_window_hours() -> u32 {
    24
}

fn is_currency_code(code: &str) -> bool {
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "ratewise", "ratewise")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "ratewise", "ratewise")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let mut config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.normalize();
        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn normalize(&mut self) {
        self.currency = self.currency.trim().to_uppercase();
        self.base_currency = self.base_currency.trim().to_uppercase();
        for sub in &mut self.subscriptions {
            sub.currency = sub.currency.trim().to_uppercase();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !is_currency_code(&self.currency) {
            bail!("Display currency must be a 3-letter code, got '{}'", self.currency);
        }
        if !currency::is_supported(&self.currency) {
            warn!("Display currency {} is not in the catalog; amounts show the code", self.currency);
        }
        if !is_currency_code(&self.base_currency) {
            bail!("Base currency must be a 3-letter code, got '{}'", self.base_currency);
        }
        if !(1..=MAX_FETCH_TIMEOUT_SECS).contains(&self.providers.timeout_secs) {
            bail!(
                "providers.timeout_secs must be between 1 and {}, got {}",
                MAX_FETCH_TIMEOUT_SECS,
                self.providers.timeout_secs
            );
        }
        if self.providers.order.is_empty() {
            bail!("providers.order must name at least one provider");
        }
        if self.refresh_window_hours == 0 {
            bail!("refresh_window_hours must be positive");
        }
        if self.breaker.failure_threshold == 0 {
            bail!("breaker.failure_threshold must be positive");
        }
        for sub in &self.subscriptions {
            if !is_currency_code(&sub.currency) {
                bail!(
                    "Subscription '{}' has an invalid currency '{}'",
                    sub.name,
                    sub.currency
                );
            }
            if let BillingCycle::Custom { days: 0 } = sub.billing_cycle {
                bail!("Subscription '{}' has a custom cycle of zero days", sub.name);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::NamedTempFile;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
currency: "usd"
preferred_provider: floatrates
providers:
  order: [erapi_open, frankfurter]
  timeout_secs: 3
  frankfurter:
    base_url: "http://example.com/frankfurter"
refresh_window_hours: 12
breaker:
  failure_threshold: 5
  cooldown_secs: 60
subscriptions:
  - name: "Music"
    cost: 9.99
    currency: "eur"
    billing_cycle: monthly
  - name: "Hosting"
    cost: 120
    currency: "USD"
    billing_cycle: yearly
  - name: "Backup"
    cost: 4.5
    currency: "GBP"
    billing_cycle:
      custom:
        days: 45
"#;

        let mut config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        config.normalize();
        config.validate().unwrap();

        assert_eq!(config.currency, "USD");
        assert_eq!(config.base_currency, "EUR");
        assert_eq!(config.preferred_provider, Some(ProviderKind::FloatRates));
        assert_eq!(
            config.providers.order,
            vec![ProviderKind::ErApiOpen, ProviderKind::Frankfurter]
        );
        assert_eq!(config.providers.timeout_secs, 3);
        assert_eq!(
            config.providers.base_url(ProviderKind::Frankfurter),
            "http://example.com/frankfurter"
        );
        assert_eq!(
            config.providers.base_url(ProviderKind::FloatRates),
            "https://www.floatrates.com"
        );
        assert_eq!(config.refresh_window_hours, 12);
        assert_eq!(config.breaker.failure_threshold, 5);

        assert_eq!(config.subscriptions.len(), 3);
        assert_eq!(config.subscriptions[0].cost, dec!(9.99));
        assert_eq!(config.subscriptions[0].currency, "EUR");
        assert_eq!(config.subscriptions[1].billing_cycle, BillingCycle::Yearly);
        assert_eq!(
            config.subscriptions[2].billing_cycle,
            BillingCycle::Custom { days: 45 }
        );
    }

    #[test]
    fn test_config_defaults() {
        let config: AppConfig = serde_yaml::from_str("currency: EUR").unwrap();
        config.validate().unwrap();

        assert_eq!(config.base_currency, "EUR");
        assert!(config.preferred_provider.is_none());
        assert_eq!(config.providers.order, ProviderKind::ALL.to_vec());
        assert_eq!(config.providers.timeout_secs, 5);
        assert_eq!(config.refresh_window_hours, 24);
        assert_eq!(config.breaker.failure_threshold, 3);
        assert_eq!(config.breaker.cooldown_secs, 300);
        assert!(config.subscriptions.is_empty());
    }

    #[test]
    fn test_validate_rejects_long_timeout() {
        let config: AppConfig = serde_yaml::from_str(
            r#"
currency: USD
providers:
  timeout_secs: 30
"#,
        )
        .unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }

    #[test]
    fn test_validate_rejects_bad_currency() {
        let config: AppConfig = serde_yaml::from_str("currency: DOLLARS").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_path_accepts_custom_cycle() {
        let file = NamedTempFile::new().unwrap();
        fs::write(
            file.path(),
            r#"
currency: EUR
subscriptions:
  - name: "Domain"
    cost: 15
    currency: USD
    billing_cycle:
      custom:
        days: 90
  - name: "VPN"
    cost: 5
    currency: USD
"#,
        )
        .unwrap();

        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(
            config.subscriptions[0].billing_cycle,
            BillingCycle::Custom { days: 90 }
        );
        assert_eq!(config.subscriptions[1].billing_cycle, BillingCycle::Monthly);
    }

    #[test]
    fn test_load_from_path_reports_file() {
        let file = NamedTempFile::new().unwrap();
        fs::write(file.path(), "currency: [not, a, string]").unwrap();

        let err = AppConfig::load_from_path(file.path()).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse config file"));
    }
}
