//! Storage configuration types.

use serde::Deserialize;

/// Canonical store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanonicalStorageType {
    #[default]
    Sqlite,
    Memory,
}

/// Legacy store backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegacyStorageType {
    #[default]
    Mongodb,
    Memory,
}

/// Storage configuration for both sides of the federation.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub canonical: CanonicalStorageConfig,
    pub legacy: LegacyStorageConfig,
}

impl StorageConfig {
    /// Mock stores on both sides.
    pub fn in_memory() -> Self {
        Self {
            canonical: CanonicalStorageConfig {
                storage_type: CanonicalStorageType::Memory,
                ..CanonicalStorageConfig::default()
            },
            legacy: LegacyStorageConfig {
                storage_type: LegacyStorageType::Memory,
                ..LegacyStorageConfig::default()
            },
        }
    }
}

/// Canonical (system of record) store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CanonicalStorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: CanonicalStorageType,
    /// Path to the SQLite database file.
    pub path: String,
}

impl Default for CanonicalStorageConfig {
    fn default() -> Self {
        Self {
            storage_type: CanonicalStorageType::Sqlite,
            path: "./data/catalog.db".to_string(),
        }
    }
}

/// Legacy Northwind store configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LegacyStorageConfig {
    /// Storage type discriminator.
    #[serde(rename = "type")]
    pub storage_type: LegacyStorageType,
    /// MongoDB connection URI.
    pub uri: String,
    /// Database holding the Northwind collections.
    pub database: String,
}

impl Default for LegacyStorageConfig {
    fn default() -> Self {
        Self {
            storage_type: LegacyStorageType::Mongodb,
            uri: "mongodb://localhost:27017".to_string(),
            database: "northwind".to_string(),
        }
    }
}
