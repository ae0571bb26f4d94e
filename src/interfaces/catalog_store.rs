//! Canonical store interfaces.

use std::collections::HashSet;

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Comment, Game, GameList, Genre, Order, Publisher};
use crate::pipeline::GameQuery;
use crate::storage::Result;

/// Merge keys known to the canonical store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyIndex {
    /// Every key, live or soft-deleted.
    pub keys: HashSet<String>,
    /// Keys of soft-deleted rows (tombstones).
    pub deleted: HashSet<String>,
}

impl KeyIndex {
    pub fn insert(&mut self, key: impl Into<String>, is_deleted: bool) {
        let key = key.into();
        if is_deleted {
            self.deleted.insert(key.clone());
        }
        self.keys.insert(key);
    }
}

/// Canonical game persistence.
///
/// Lookups by id or key return soft-deleted games too; callers decide
/// visibility. `add` fails with `StorageError::Duplicate` when the id or key
/// already exists, which is what makes concurrent migration converge.
///
/// Implementations:
/// - `SqliteCatalogStore`: SQLite storage
/// - `MockCatalogStore`: In-memory mock for testing
#[async_trait]
pub trait GameStore: Send + Sync {
    /// Run a query: `count` covers every match, `games` only the window.
    async fn find(&self, query: &GameQuery) -> Result<GameList>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Game>>;

    async fn get_by_key(&self, key: &str) -> Result<Option<Game>>;

    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// All game keys, with tombstones marked.
    async fn key_index(&self) -> Result<KeyIndex>;

    /// Insert a game with its genre and platform links, atomically.
    async fn add(&self, game: &Game) -> Result<()>;

    /// Replace a game and its links, atomically.
    async fn update(&self, game: &Game) -> Result<()>;

    async fn soft_delete(&self, id: Uuid) -> Result<()>;

    async fn adjust_units_in_stock(&self, id: Uuid, delta: i32) -> Result<()>;

    async fn increment_views(&self, id: Uuid) -> Result<()>;

    /// Number of live games.
    async fn count(&self) -> Result<u64>;
}

/// Canonical genre persistence. Genre names are unique.
#[async_trait]
pub trait GenreStore: Send + Sync {
    async fn list(&self, include_deleted: bool) -> Result<Vec<Genre>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>>;

    async fn add(&self, genre: &Genre) -> Result<()>;

    async fn update(&self, genre: &Genre) -> Result<()>;

    async fn soft_delete(&self, id: Uuid) -> Result<()>;
}

/// Canonical publisher persistence. Company names are unique.
#[async_trait]
pub trait PublisherStore: Send + Sync {
    async fn list(&self, include_deleted: bool) -> Result<Vec<Publisher>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Publisher>>;

    async fn get_by_company_name(&self, company_name: &str) -> Result<Option<Publisher>>;

    async fn add(&self, publisher: &Publisher) -> Result<()>;

    async fn update(&self, publisher: &Publisher) -> Result<()>;

    async fn soft_delete(&self, id: Uuid) -> Result<()>;
}

/// Canonical order persistence.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Order>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>>;

    async fn exists(&self, id: Uuid) -> Result<bool>;

    /// Insert an order with its items, atomically.
    async fn add(&self, order: &Order) -> Result<()>;

    /// Replace an order's status and items, atomically.
    async fn update(&self, order: &Order) -> Result<()>;
}

/// Canonical comment persistence.
#[async_trait]
pub trait CommentStore: Send + Sync {
    async fn list_by_game(&self, game_id: Uuid) -> Result<Vec<Comment>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    async fn add(&self, comment: &Comment) -> Result<()>;

    async fn update(&self, comment: &Comment) -> Result<()>;

    /// Write several comments in one transaction.
    async fn update_many(&self, comments: &[Comment]) -> Result<()>;
}
