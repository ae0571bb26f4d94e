//! Storage implementations.

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::config::{CanonicalStorageType, LegacyStorageType, StorageConfig};
use crate::interfaces::{
    CategoryStore, CommentStore, GameStore, GenreStore, LegacyOrderStore, OrderStore,
    ProductStore, PublisherStore, SupplierStore,
};

pub mod mock;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "mongodb")]
pub mod mongodb;

pub use mock::{MockCatalogStore, MockLegacyStore};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteCatalogStore;

#[cfg(feature = "mongodb")]
pub use mongodb::MongoLegacyStore;

/// Result type for storage and repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Which backing store an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Canonical,
    Legacy,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Canonical => f.write_str("canonical"),
            DataSource::Legacy => f.write_str("legacy"),
        }
    }
}

/// Errors that can occur during storage and federation operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {key}")]
    Duplicate { entity: &'static str, key: String },

    #[error("Migration of {entity} {id} failed: {cause}")]
    MigrationFailed {
        entity: &'static str,
        id: String,
        #[source]
        cause: Box<StorageError>,
    },

    #[error("{store} store unavailable: {cause}")]
    SourceUnavailable {
        store: DataSource,
        #[source]
        cause: Box<StorageError>,
    },

    #[error("Cannot build canonical {entity} {id}: {reason}")]
    IncompleteProjection {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("Comment tree under {id} contains a cycle")]
    CommentCycle { id: uuid::Uuid },

    #[error("Invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid stored value: {0}")]
    InvalidValue(String),

    /// Injected by mock stores to simulate an outage.
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[cfg(feature = "mongodb")]
    #[error("MongoDB error: {0}")]
    Mongo(#[from] ::mongodb::error::Error),

    #[error("Unknown storage type: {0}")]
    UnknownStorageType(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StorageError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn unavailable(store: DataSource, cause: StorageError) -> Self {
        StorageError::SourceUnavailable {
            store,
            cause: Box::new(cause),
        }
    }

    pub fn migration_failed(entity: &'static str, id: impl ToString, cause: StorageError) -> Self {
        StorageError::MigrationFailed {
            entity,
            id: id.to_string(),
            cause: Box::new(cause),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, StorageError::Duplicate { .. })
    }
}

/// Canonical store handles, one per aggregate.
#[derive(Clone)]
pub struct CanonicalStores {
    pub games: Arc<dyn GameStore>,
    pub genres: Arc<dyn GenreStore>,
    pub publishers: Arc<dyn PublisherStore>,
    pub orders: Arc<dyn OrderStore>,
    pub comments: Arc<dyn CommentStore>,
}

impl CanonicalStores {
    /// Use one backend for every canonical aggregate.
    pub fn from_backend<C>(backend: Arc<C>) -> Self
    where
        C: GameStore + GenreStore + PublisherStore + OrderStore + CommentStore + 'static,
    {
        Self {
            games: backend.clone(),
            genres: backend.clone(),
            publishers: backend.clone(),
            orders: backend.clone(),
            comments: backend,
        }
    }
}

/// Legacy store handles, one per collection family.
#[derive(Clone)]
pub struct LegacyStores {
    pub products: Arc<dyn ProductStore>,
    pub categories: Arc<dyn CategoryStore>,
    pub suppliers: Arc<dyn SupplierStore>,
    pub orders: Arc<dyn LegacyOrderStore>,
}

impl LegacyStores {
    /// Use one backend for every legacy collection.
    pub fn from_backend<L>(backend: Arc<L>) -> Self
    where
        L: ProductStore + CategoryStore + SupplierStore + LegacyOrderStore + 'static,
    {
        Self {
            products: backend.clone(),
            categories: backend.clone(),
            suppliers: backend.clone(),
            orders: backend,
        }
    }
}

/// Both sides of the federation.
#[derive(Clone)]
pub struct CatalogStores {
    pub canonical: CanonicalStores,
    pub legacy: LegacyStores,
}

impl CatalogStores {
    pub fn new(canonical: CanonicalStores, legacy: LegacyStores) -> Self {
        Self { canonical, legacy }
    }
}

/// Initialize storage based on configuration.
pub async fn init_storage(config: &StorageConfig) -> Result<CatalogStores> {
    info!(
        canonical = ?config.canonical.storage_type,
        legacy = ?config.legacy.storage_type,
        "Initializing catalog storage"
    );

    let canonical = init_canonical(config).await?;
    let legacy = init_legacy(config).await?;
    Ok(CatalogStores::new(canonical, legacy))
}

async fn init_canonical(config: &StorageConfig) -> Result<CanonicalStores> {
    match config.canonical.storage_type {
        #[cfg(feature = "sqlite")]
        CanonicalStorageType::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.canonical.path).parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| StorageError::InvalidValue(e.to_string()))?;
            }
            let store = SqliteCatalogStore::connect(&config.canonical.path).await?;
            Ok(CanonicalStores::from_backend(Arc::new(store)))
        }
        #[cfg(not(feature = "sqlite"))]
        CanonicalStorageType::Sqlite => {
            tracing::error!("SQLite storage requested but 'sqlite' feature is not enabled");
            Err(StorageError::UnknownStorageType("sqlite".to_string()))
        }
        CanonicalStorageType::Memory => Ok(CanonicalStores::from_backend(Arc::new(
            MockCatalogStore::new(),
        ))),
    }
}

async fn init_legacy(config: &StorageConfig) -> Result<LegacyStores> {
    match config.legacy.storage_type {
        #[cfg(feature = "mongodb")]
        LegacyStorageType::Mongodb => {
            let store =
                MongoLegacyStore::connect(&config.legacy.uri, &config.legacy.database).await?;
            Ok(LegacyStores::from_backend(Arc::new(store)))
        }
        #[cfg(not(feature = "mongodb"))]
        LegacyStorageType::Mongodb => {
            tracing::error!("MongoDB storage requested but 'mongodb' feature is not enabled");
            Err(StorageError::UnknownStorageType("mongodb".to_string()))
        }
        LegacyStorageType::Memory => Ok(LegacyStores::from_backend(Arc::new(
            MockLegacyStore::new(),
        ))),
    }
}
