//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `FRIEND_CHAT` prefix and
//! `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use friend_chat::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod ai;
mod auth;
mod database;
mod error;
mod limits;
mod server;

pub use ai::AiConfig;
pub use auth::AuthConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use limits::LimitsConfig;
pub use server::{Environment, LogFormat, ServerConfig};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    /// PostgreSQL. Absent means the in-memory store.
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub ai: AiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub limits: LimitsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FRIEND_CHAT` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// - `FRIEND_CHAT__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `FRIEND_CHAT__AI__API_KEY=...` -> `ai.api_key = ...`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(None)
    }

    /// Load from a TOML/YAML/JSON file, with environment variables layered
    /// on top.
    pub fn load_from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_sources(Some(path))
    }

    fn from_sources(path: Option<&std::path::Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix("FRIEND_CHAT")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        if let Some(database) = &self.database {
            database.validate()?;
        }
        if self.is_production() && self.database.is_none() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        self.ai.validate()?;
        self.auth.validate(&self.server.environment)?;
        self.limits.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
