//! # Server Configuration
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`SOFTMAX_*`, e.g. `SOFTMAX_SERVICE_URL`)
//! 2. Config file (`softmax.toml`, optional)
//! 3. Defaults (this file)
//!
//! ## Service Credentials
//! `service_url` (database URL) and `service_key` (token signing secret)
//! have no defaults. Without both, the server still starts and answers
//! `/health`, but every data endpoint replies `503 SERVICE_NOT_CONFIGURED`.

use chrono::{FixedOffset, Offset, Utc};
use config::{builder::DefaultState, ConfigBuilder};
use serde::Deserialize;
use smart_default::SmartDefault;

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "softmax";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "SOFTMAX";

/// Application configuration.
#[derive(Debug, Clone, Deserialize, SmartDefault)]
#[serde(default)]
pub struct AppConfig {
    /// Database connection URL, e.g. `sqlite://softmax.db?mode=rwc`.
    pub service_url: Option<String>,

    /// Secret used to sign session tokens.
    pub service_key: Option<String>,

    #[default("0.0.0.0".to_owned())]
    pub host: String,

    #[default(8080)]
    pub port: u16,

    /// Printed at the top of every receipt.
    #[default("SoftMax Sales".to_owned())]
    pub store_name: String,

    /// Prefix for amounts on receipts and in the UI.
    #[default("MZN".to_owned())]
    pub currency_symbol: String,

    /// Store's offset from UTC, in hours. Drives receipt timestamps and
    /// report day boundaries. Maputo is UTC+2 all year.
    #[default(2)]
    pub utc_offset_hours: i32,

    /// Lifetime of a session token.
    #[default(86_400)]
    pub token_lifetime_secs: i64,

    /// How often expired and revoked sessions are swept, with their carts.
    #[default(300)]
    pub session_sweep_secs: u64,

    /// Comma-separated allowed CORS origins, or `*`.
    #[default("*".to_owned())]
    pub cors_origins: String,
}

impl AppConfig {
    /// Loads the configuration by:
    /// - starting from the defaults;
    /// - merging the optional file `path` (any extension `config` knows);
    /// - merging `SOFTMAX_*` environment variables.
    pub fn load(path: impl AsRef<str>) -> Result<Self, ConfigError> {
        let config: AppConfig = ConfigBuilder::<DefaultState>::default()
            .add_source(config::File::with_name(path.as_ref()).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Checks value ranges the type system can't.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if FixedOffset::east_opt(self.utc_offset_hours.saturating_mul(3600)).is_none()
            || !(-12..=14).contains(&self.utc_offset_hours)
        {
            return Err(ConfigError::InvalidValue("utc_offset_hours".to_string()));
        }
        if self.token_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("token_lifetime_secs".to_string()));
        }
        if self.session_sweep_secs == 0 {
            return Err(ConfigError::InvalidValue("session_sweep_secs".to_string()));
        }
        Ok(())
    }

    /// The store's UTC offset.
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix())
    }

    /// Both service credentials, when present and non-blank.
    pub fn service_credentials(&self) -> Option<(&str, &str)> {
        let url = self.service_url.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let key = self.service_key.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((url, key))
    }

    /// Parsed CORS origins. `None` means any origin.
    pub fn cors_origin_list(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .cors_origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_owned)
            .collect();

        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),
}
