//! Game catalog service.
//!
//! Builds a request-scoped pipeline and hands it to whatever
//! [`GameRepository`] it was given; federation stays invisible here.

use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use super::counter::GameCounter;
use crate::interfaces::GameRepository;
use crate::model::{Game, GameList};
use crate::pipeline::{GameFilter, PipelineFactory};
use crate::storage::{Result, StorageError};

pub struct GameService {
    factory: Arc<dyn PipelineFactory>,
    games: Arc<dyn GameRepository>,
    counter: Arc<dyn GameCounter>,
}

impl GameService {
    pub fn new(
        factory: Arc<dyn PipelineFactory>,
        games: Arc<dyn GameRepository>,
        counter: Arc<dyn GameCounter>,
    ) -> Self {
        Self {
            factory,
            games,
            counter,
        }
    }

    /// One catalog page. `include_deleted` is the caller's permission to see
    /// soft-deleted games.
    pub async fn list(&self, filter: &GameFilter, include_deleted: bool) -> Result<GameList> {
        let pipeline = self.factory.create(filter, include_deleted);
        debug!(
            filters = pipeline.filter_count(),
            sort = ?pipeline.sort(),
            "Listing games"
        );
        self.games.list(&pipeline).await
    }

    pub async fn get_by_key(&self, key: &str, include_deleted: bool) -> Result<Game> {
        self.games
            .get_by_key(key, include_deleted)
            .await?
            .ok_or_else(|| StorageError::not_found("game", key))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Game> {
        self.games
            .get_by_id(id)
            .await?
            .ok_or_else(|| StorageError::not_found("game", id))
    }

    /// Record a view, then return the game.
    pub async fn view(&self, key: &str) -> Result<Game> {
        self.games.increment_views(key).await?;
        self.get_by_key(key, false).await
    }

    pub async fn add(&self, game: Game) -> Result<()> {
        self.games.add(game).await?;
        self.counter.increment();
        Ok(())
    }

    pub async fn update(&self, game: Game) -> Result<()> {
        self.games.update(game).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<()> {
        if self.games.delete(id).await? {
            self.counter.decrement();
        }
        Ok(())
    }

    pub async fn adjust_units_in_stock(&self, id: Uuid, delta: i32) -> Result<()> {
        self.games.adjust_units_in_stock(id, delta).await
    }

    /// Total live games, recomputed from the repository when the counter is unset.
    pub async fn total_games(&self) -> Result<u64> {
        if let Some(total) = self.counter.get() {
            return Ok(total);
        }
        let total = self.games.count().await?;
        self.counter.set(total);
        Ok(total)
    }
}
