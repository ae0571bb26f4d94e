//! Repository interfaces exposed to catalog services.
//!
//! Services depend only on these traits and cannot tell whether they are
//! talking to the federated implementation or a single store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{Comment, Game, GameList, Genre, Order, OrderStatus, Publisher};
use crate::pipeline::GamePipeline;
use crate::storage::Result;

#[async_trait]
pub trait GameRepository: Send + Sync {
    /// One page of the catalog with the total match count.
    async fn list(&self, pipeline: &GamePipeline) -> Result<GameList>;

    async fn get_by_key(&self, key: &str, include_deleted: bool) -> Result<Option<Game>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Game>>;

    async fn exists(&self, id: Uuid) -> Result<bool>;

    async fn add(&self, game: Game) -> Result<()>;

    async fn update(&self, game: Game) -> Result<()>;

    /// Soft-delete a game. Returns whether a live game was removed; deleting
    /// a tombstone again is a no-op that returns false.
    async fn delete(&self, id: Uuid) -> Result<bool>;

    async fn adjust_units_in_stock(&self, id: Uuid, delta: i32) -> Result<()>;

    async fn increment_views(&self, key: &str) -> Result<()>;

    /// Number of live games across the catalog.
    async fn count(&self) -> Result<u64>;
}

#[async_trait]
pub trait GenreRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Genre>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>>;

    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>>;

    async fn add(&self, genre: Genre) -> Result<()>;

    async fn update(&self, genre: Genre) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait PublisherRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Publisher>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Publisher>>;

    async fn get_by_company_name(&self, company_name: &str) -> Result<Option<Publisher>>;

    async fn add(&self, publisher: Publisher) -> Result<()>;

    async fn update(&self, publisher: Publisher) -> Result<()>;

    async fn delete(&self, id: Uuid) -> Result<()>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Order history, newest first.
    async fn list(&self) -> Result<Vec<Order>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>>;

    async fn add(&self, order: Order) -> Result<()>;

    async fn update(&self, order: Order) -> Result<()>;

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<()>;
}

#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn list_by_game(&self, game_id: Uuid) -> Result<Vec<Comment>>;

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Comment>>;

    async fn add(&self, comment: Comment) -> Result<()>;

    async fn update(&self, comment: Comment) -> Result<()>;

    /// Mark a comment deleted and strip its quote from every descendant.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
