use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use tracing_subscriber::EnvFilter;
use validator::Validate;

const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_PORT: u16 = 8080;
const CONFIG_DIR: &str = "config";

/// Application configuration, layered from `config/default.toml`, an
/// environment-specific file, and `APP__*` environment variables.
#[derive(Clone, Debug, Deserialize, Validate)]
pub struct AppConfig {
    /// Database connection URL (Postgres in production, SQLite for local
    /// runs and tests).
    pub database_url: String,

    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_environment")]
    pub environment: String,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging).
    #[serde(default)]
    pub log_json: bool,

    /// ISO currency code for every charge; a single-currency deployment.
    #[serde(default = "default_currency")]
    pub currency: String,

    /// Processor minimum chargeable amount for the configured currency.
    /// Carts below it (or at zero) are rejected as pricing bugs.
    #[serde(default = "default_minimum_charge")]
    pub minimum_charge_minor_units: i64,

    /// Processor REST API base URL.
    #[serde(default = "default_payment_api_base")]
    pub payment_api_base: String,

    /// Processor secret API key.
    pub payment_secret_key: String,

    /// Shared secret for webhook signature verification.
    #[validate(length(min = 8))]
    pub webhook_secret: String,

    /// Acceptance window for webhook signature timestamps.
    #[serde(default = "default_webhook_tolerance")]
    pub webhook_tolerance_secs: i64,

    /// Timeout for outbound processor calls, in seconds.
    #[serde(default = "default_provider_timeout")]
    pub provider_timeout_secs: u64,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    #[serde(default = "default_db_min_connections")]
    pub db_min_connections: u32,

    /// Run migrations on startup.
    #[serde(default)]
    pub auto_migrate: bool,

    /// Seed a small demo catalog on startup when the catalog is empty.
    #[serde(default)]
    pub seed_demo_catalog: bool,

    /// Comma-separated list of allowed CORS origins; permissive when unset
    /// in development.
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}
fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
fn default_currency() -> String {
    "usd".to_string()
}
fn default_minimum_charge() -> i64 {
    50
}
fn default_payment_api_base() -> String {
    "https://api.stripe.com".to_string()
}
fn default_webhook_tolerance() -> i64 {
    crate::payments::signature::DEFAULT_TOLERANCE_SECS
}
fn default_provider_timeout() -> u64 {
    15
}
fn default_db_max_connections() -> u32 {
    10
}
fn default_db_min_connections() -> u32 {
    1
}

impl AppConfig {
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

/// Load configuration: defaults file, environment-specific file, then
/// `APP__*` environment overrides (e.g. `APP__DATABASE_URL`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let environment =
        std::env::var("APP_ENVIRONMENT").unwrap_or_else(|_| DEFAULT_ENV.to_string());

    let config: AppConfig = Config::builder()
        .add_source(File::with_name(&format!("{CONFIG_DIR}/default")).required(false))
        .add_source(File::with_name(&format!("{CONFIG_DIR}/{environment}")).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?
        .try_deserialize()?;

    config
        .validate()
        .map_err(|e| ConfigError::Message(format!("invalid configuration: {e}")))?;

    Ok(config)
}

/// Initialize the global tracing subscriber.
pub fn init_tracing(log_level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_string()));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> AppConfig {
        AppConfig {
            database_url: "sqlite::memory:".into(),
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            currency: default_currency(),
            minimum_charge_minor_units: default_minimum_charge(),
            payment_api_base: default_payment_api_base(),
            payment_secret_key: "sk_test_123".into(),
            webhook_secret: "whsec_test123".into(),
            webhook_tolerance_secs: default_webhook_tolerance(),
            provider_timeout_secs: default_provider_timeout(),
            db_max_connections: default_db_max_connections(),
            db_min_connections: default_db_min_connections(),
            auto_migrate: false,
            seed_demo_catalog: false,
            cors_allowed_origins: None,
        }
    }

    #[test]
    fn defaults_validate() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn short_webhook_secret_is_rejected() {
        let mut cfg = base();
        cfg.webhook_secret = "short".into();
        assert!(cfg.validate().is_err());
    }
}
