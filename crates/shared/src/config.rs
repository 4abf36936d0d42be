//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Reconciliation engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reconciliation engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Factor applied to unit cost to seed a sale price when the catalog has none.
    #[serde(default = "default_markup")]
    pub default_markup: Decimal,
    /// Whether an unregistered unit family falls back to `piece`.
    ///
    /// The fallback is always reported; when disabled the lookup fails instead.
    #[serde(default)]
    pub allow_unit_family_fallback: bool,
    /// Share of the grand total seeded as the paid amount on `partial`.
    #[serde(default = "default_partial_seed_ratio")]
    pub partial_seed_ratio: Decimal,
}

fn default_markup() -> Decimal {
    Decimal::new(12, 1)
}

fn default_partial_seed_ratio() -> Decimal {
    Decimal::new(5, 1)
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_markup: default_markup(),
            allow_unit_family_fallback: false,
            partial_seed_ratio: default_partial_seed_ratio(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing-subscriber` env-filter directive.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "procura=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("PROCURA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
