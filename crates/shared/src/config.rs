//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Ledger behaviour.
    #[serde(default)]
    pub ledger: LedgerConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Ledger configuration.
///
/// Account codes refer to the chart of accounts; they are resolved on every
/// petty-cash movement, so renaming an account never requires a restart.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// ISO 4217 code stamped on transactions that do not name one.
    #[serde(default = "default_currency")]
    pub currency: String,
    /// Code of the main-ledger asset account mirroring all petty cash.
    #[serde(default = "default_petty_cash_account_code")]
    pub petty_cash_account_code: String,
    /// Code of the expense account used when a petty-cash expense has no category.
    #[serde(default = "default_uncategorized_expense_code")]
    pub uncategorized_expense_code: String,
    /// Maximum day distance for an auto-match proposal.
    #[serde(default = "default_match_window_days")]
    pub match_window_days: i64,
}

fn default_currency() -> String {
    "IDR".to_string()
}

fn default_petty_cash_account_code() -> String {
    "1010".to_string()
}

fn default_uncategorized_expense_code() -> String {
    "5999".to_string()
}

fn default_match_window_days() -> i64 {
    3
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            petty_cash_account_code: default_petty_cash_account_code(),
            uncategorized_expense_code: default_uncategorized_expense_code(),
            match_window_days: default_match_window_days(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// Sources, later ones winning: `config/default`, `config/{RUN_MODE}`,
    /// then `LODGEBOOK__SECTION__KEY` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("LODGEBOOK").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
