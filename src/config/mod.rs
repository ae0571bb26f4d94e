//! Application configuration.
//!
//! Aggregates storage and catalog settings into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod catalog;
mod storage;

pub use catalog::CatalogConfig;
pub use storage::{
    CanonicalStorageConfig, CanonicalStorageType, LegacyStorageConfig, LegacyStorageType,
    StorageConfig,
};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "GAMESTORE_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "GAMESTORE";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "GAMESTORE_LOG";

use serde::Deserialize;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Canonical and legacy store selection.
    pub storage: StorageConfig,
    /// Catalog listing defaults.
    pub catalog: CatalogConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, ::config::ConfigError> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    /// In-memory stores on both sides, for tests and local experiments.
    pub fn for_test() -> Self {
        Self {
            storage: StorageConfig::in_memory(),
            catalog: CatalogConfig::default(),
        }
    }
}
