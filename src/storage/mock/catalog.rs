//! In-memory canonical store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::interfaces::{CommentStore, GameStore, GenreStore, KeyIndex, OrderStore, PublisherStore};
use crate::model::{Comment, Game, GameList, Genre, Order, Publisher};
use crate::pipeline::GameQuery;
use crate::storage::{Result, StorageError};

/// Mock canonical store that keeps every aggregate in memory.
#[derive(Default)]
pub struct MockCatalogStore {
    games: RwLock<HashMap<Uuid, Game>>,
    genres: RwLock<HashMap<Uuid, Genre>>,
    publishers: RwLock<HashMap<Uuid, Publisher>>,
    orders: RwLock<HashMap<Uuid, Order>>,
    comments: RwLock<HashMap<Uuid, Comment>>,
    fail_on_read: RwLock<bool>,
    fail_on_write: RwLock<bool>,
}

impl MockCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    pub async fn set_fail_on_write(&self, fail: bool) {
        *self.fail_on_write.write().await = fail;
    }

    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }

    pub async fn genre_count(&self) -> usize {
        self.genres.read().await.len()
    }

    pub async fn publisher_count(&self) -> usize {
        self.publishers.read().await.len()
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("canonical read".to_string()));
        }
        Ok(())
    }

    async fn check_write(&self) -> Result<()> {
        if *self.fail_on_write.read().await {
            return Err(StorageError::Unavailable("canonical write".to_string()));
        }
        Ok(())
    }

    async fn with_comment_count(&self, mut game: Game) -> Game {
        let comments = self.comments.read().await;
        game.comment_count = comments.values().filter(|c| c.game_id == game.id).count() as u32;
        game
    }
}

#[async_trait]
impl GameStore for MockCatalogStore {
    async fn find(&self, query: &GameQuery) -> Result<GameList> {
        self.check_read().await?;
        let snapshot: Vec<Game> = self.games.read().await.values().cloned().collect();
        let mut games = Vec::with_capacity(snapshot.len());
        for game in snapshot {
            games.push(self.with_comment_count(game).await);
        }
        Ok(query.evaluate(games))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Game>> {
        self.check_read().await?;
        let game = self.games.read().await.get(&id).cloned();
        match game {
            Some(game) => Ok(Some(self.with_comment_count(game).await)),
            None => Ok(None),
        }
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<Game>> {
        self.check_read().await?;
        let game = self.games.read().await.values().find(|g| g.key == key).cloned();
        match game {
            Some(game) => Ok(Some(self.with_comment_count(game).await)),
            None => Ok(None),
        }
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        self.check_read().await?;
        Ok(self.games.read().await.contains_key(&id))
    }

    async fn key_index(&self) -> Result<KeyIndex> {
        self.check_read().await?;
        let mut index = KeyIndex::default();
        for game in self.games.read().await.values() {
            index.insert(game.key.clone(), game.is_deleted);
        }
        Ok(index)
    }

    async fn add(&self, game: &Game) -> Result<()> {
        self.check_write().await?;
        let mut games = self.games.write().await;
        if games.contains_key(&game.id) || games.values().any(|g| g.key == game.key) {
            return Err(StorageError::Duplicate {
                entity: "game",
                key: game.key.clone(),
            });
        }
        games.insert(game.id, game.clone());
        Ok(())
    }

    async fn update(&self, game: &Game) -> Result<()> {
        self.check_write().await?;
        let mut games = self.games.write().await;
        if games.values().any(|g| g.key == game.key && g.id != game.id) {
            return Err(StorageError::Duplicate {
                entity: "game",
                key: game.key.clone(),
            });
        }
        match games.get_mut(&game.id) {
            Some(stored) => {
                *stored = game.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("game", game.id)),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        self.check_write().await?;
        match self.games.write().await.get_mut(&id) {
            Some(game) => {
                game.is_deleted = true;
                Ok(())
            }
            None => Err(StorageError::not_found("game", id)),
        }
    }

    async fn adjust_units_in_stock(&self, id: Uuid, delta: i32) -> Result<()> {
        self.check_write().await?;
        match self.games.write().await.get_mut(&id) {
            Some(game) => {
                game.units_in_stock += delta;
                Ok(())
            }
            None => Err(StorageError::not_found("game", id)),
        }
    }

    async fn increment_views(&self, id: Uuid) -> Result<()> {
        self.check_write().await?;
        match self.games.write().await.get_mut(&id) {
            Some(game) => {
                game.views += 1;
                Ok(())
            }
            None => Err(StorageError::not_found("game", id)),
        }
    }

    async fn count(&self) -> Result<u64> {
        self.check_read().await?;
        Ok(self.games.read().await.values().filter(|g| !g.is_deleted).count() as u64)
    }
}

#[async_trait]
impl GenreStore for MockCatalogStore {
    async fn list(&self, include_deleted: bool) -> Result<Vec<Genre>> {
        self.check_read().await?;
        let mut genres: Vec<Genre> = self
            .genres
            .read()
            .await
            .values()
            .filter(|g| include_deleted || !g.is_deleted)
            .cloned()
            .collect();
        genres.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(genres)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Genre>> {
        self.check_read().await?;
        Ok(self.genres.read().await.get(&id).cloned())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Genre>> {
        self.check_read().await?;
        Ok(self.genres.read().await.values().find(|g| g.name == name).cloned())
    }

    async fn add(&self, genre: &Genre) -> Result<()> {
        self.check_write().await?;
        let mut genres = self.genres.write().await;
        if genres.contains_key(&genre.id) || genres.values().any(|g| g.name == genre.name) {
            return Err(StorageError::Duplicate {
                entity: "genre",
                key: genre.name.clone(),
            });
        }
        genres.insert(genre.id, genre.clone());
        Ok(())
    }

    async fn update(&self, genre: &Genre) -> Result<()> {
        self.check_write().await?;
        match self.genres.write().await.get_mut(&genre.id) {
            Some(stored) => {
                *stored = genre.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("genre", genre.id)),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        self.check_write().await?;
        match self.genres.write().await.get_mut(&id) {
            Some(genre) => {
                genre.is_deleted = true;
                Ok(())
            }
            None => Err(StorageError::not_found("genre", id)),
        }
    }
}

#[async_trait]
impl PublisherStore for MockCatalogStore {
    async fn list(&self, include_deleted: bool) -> Result<Vec<Publisher>> {
        self.check_read().await?;
        let mut publishers: Vec<Publisher> = self
            .publishers
            .read()
            .await
            .values()
            .filter(|p| include_deleted || !p.is_deleted)
            .cloned()
            .collect();
        publishers.sort_by(|a, b| a.company_name.cmp(&b.company_name));
        Ok(publishers)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Publisher>> {
        self.check_read().await?;
        Ok(self.publishers.read().await.get(&id).cloned())
    }

    async fn get_by_company_name(&self, company_name: &str) -> Result<Option<Publisher>> {
        self.check_read().await?;
        Ok(self
            .publishers
            .read()
            .await
            .values()
            .find(|p| p.company_name == company_name)
            .cloned())
    }

    async fn add(&self, publisher: &Publisher) -> Result<()> {
        self.check_write().await?;
        let mut publishers = self.publishers.write().await;
        if publishers.contains_key(&publisher.id)
            || publishers
                .values()
                .any(|p| p.company_name == publisher.company_name)
        {
            return Err(StorageError::Duplicate {
                entity: "publisher",
                key: publisher.company_name.clone(),
            });
        }
        publishers.insert(publisher.id, publisher.clone());
        Ok(())
    }

    async fn update(&self, publisher: &Publisher) -> Result<()> {
        self.check_write().await?;
        match self.publishers.write().await.get_mut(&publisher.id) {
            Some(stored) => {
                *stored = publisher.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("publisher", publisher.id)),
        }
    }

    async fn soft_delete(&self, id: Uuid) -> Result<()> {
        self.check_write().await?;
        match self.publishers.write().await.get_mut(&id) {
            Some(publisher) => {
                publisher.is_deleted = true;
                Ok(())
            }
            None => Err(StorageError::not_found("publisher", id)),
        }
    }
}

#[async_trait]
impl OrderStore for MockCatalogStore {
    async fn list(&self) -> Result<Vec<Order>> {
        self.check_read().await?;
        Ok(self.orders.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Order>> {
        self.check_read().await?;
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        self.check_read().await?;
        Ok(self.orders.read().await.contains_key(&id))
    }

    async fn add(&self, order: &Order) -> Result<()> {
        self.check_write().await?;
        let mut orders = self.orders.write().await;
        if orders.contains_key(&order.id) {
            return Err(StorageError::Duplicate {
                entity: "order",
                key: order.id.to_string(),
            });
        }
        orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<()> {
        self.check_write().await?;
        match self.orders.write().await.get_mut(&order.id) {
            Some(stored) => {
                *stored = order.clone();
                Ok(())
            }
            None => Err(StorageError::not_found("order", order.id)),
        }
    }
}

#[async_trait]
impl CommentStore for MockCatalogStore {
    async fn list_by_game(&self, game_id: Uuid) -> Result<Vec<Comment>> {
        self.check_read().await?;
        let mut comments: Vec<Comment> = self
            .comments
            .read()
            .await
            .values()
            .filter(|c| c.game_id == game_id)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.id);
        Ok(comments)
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Comment>> {
        self.check_read().await?;
        Ok(self.comments.read().await.get(&id).cloned())
    }

    async fn add(&self, comment: &Comment) -> Result<()> {
        self.check_write().await?;
        let mut comments = self.comments.write().await;
        if comments.contains_key(&comment.id) {
            return Err(StorageError::Duplicate {
                entity: "comment",
                key: comment.id.to_string(),
            });
        }
        comments.insert(comment.id, comment.clone());
        Ok(())
    }

    async fn update(&self, comment: &Comment) -> Result<()> {
        self.update_many(std::slice::from_ref(comment)).await
    }

    async fn update_many(&self, updated: &[Comment]) -> Result<()> {
        self.check_write().await?;
        let mut comments = self.comments.write().await;
        if let Some(missing) = updated.iter().find(|c| !comments.contains_key(&c.id)) {
            return Err(StorageError::not_found("comment", missing.id));
        }
        for comment in updated {
            comments.insert(comment.id, comment.clone());
        }
        Ok(())
    }
}
