//! # Configuration
//!
//! Layered settings for the CLI, lowest priority first:
//!
//! ```text
//! built-in defaults
//!      ▼
//! stockroom.toml            (optional, path from --config)
//!      ▼
//! STOCKROOM__DATABASE__PATH, STOCKROOM__LOG__LEVEL, ...
//! ```
//!
//! ## Example File
//! ```toml
//! [database]
//! path = "/var/lib/stockroom/stockroom.db"
//! max_connections = 5
//! busy_timeout_secs = 5
//!
//! [log]
//! level = "info,stockroom=debug,sqlx=warn"
//! ```

use std::time::Duration;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use stockroom_db::DbConfig;

/// Environment variable prefix. Nested keys use `__`.
pub const ENV_PREFIX: &str = "STOCKROOM";

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub database: DatabaseSettings,
    pub log: LogSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, or `:memory:`
    pub path: String,
    pub max_connections: u32,
    pub busy_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub level: String,
}

impl AppConfig {
    /// Loads defaults, then `path` if it exists, then the environment.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Loads defaults overlaid with an inline TOML document.
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let settings = defaults()?
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.trim().is_empty() {
            return Err(ConfigError::MissingRequired("database.path".to_string()));
        }
        if self.database.max_connections == 0 {
            return Err(ConfigError::InvalidValue(
                "database.max_connections".to_string(),
            ));
        }
        Ok(())
    }

    /// Pool settings for [`stockroom_db::Database::new`].
    pub fn db_config(&self) -> DbConfig {
        let db_config = if self.database.path == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&self.database.path).max_connections(self.database.max_connections)
        };
        db_config.busy_timeout(Duration::from_secs(self.database.busy_timeout_secs))
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(config::Config::builder()
        .set_default("database.path", "stockroom.db")?
        .set_default("database.max_connections", 5)?
        .set_default("database.busy_timeout_secs", 5)?
        .set_default("log.level", "info,stockroom=debug,sqlx=warn")?)
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config.database.path, "stockroom.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout_secs, 5);
        assert!(config.log.level.starts_with("info"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [database]
            path = "/tmp/shop.db"
            busy_timeout_secs = 2

            [log]
            level = "debug"
            "#,
        )
        .unwrap();

        assert_eq!(config.database.path, "/tmp/shop.db");
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.database.busy_timeout_secs, 2);
        assert_eq!(config.log.level, "debug");
    }

    #[test]
    fn test_zero_connections_rejected() {
        let err = AppConfig::from_toml("[database]\nmax_connections = 0").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(_)));
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let path = std::env::temp_dir().join(format!("{}.toml", uuid::Uuid::new_v4()));
        let config = AppConfig::load(path.to_str().unwrap()).unwrap();
        assert!(!config.database.path.is_empty());
    }
}
