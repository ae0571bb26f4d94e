//! Federated game repository.
//!
//! Listing fetches, from each source, the sorted prefix that ends at the
//! requested page, with the legacy query excluding every key the canonical
//! store already holds (live or tombstone). The two prefixes are merged and
//! the pipeline re-sorts and re-pages the union, which yields the globally
//! correct page and an exact total.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{canonical_unavailable, legacy_unavailable};
use crate::identity::to_legacy_id;
use crate::interfaces::{GameRepository, GameStore, ProductStore};
use crate::mapper::map_games_by_key;
use crate::migration::Migrator;
use crate::model::{Game, GameList};
use crate::pipeline::{GamePipeline, GameQuery, PageWindow, ProductQuery};
use crate::storage::{Result, StorageError};

/// Game repository spanning the canonical store and legacy products.
pub struct FederatedGameRepository {
    canonical: Arc<dyn GameStore>,
    products: Arc<dyn ProductStore>,
    migrator: Migrator,
}

impl FederatedGameRepository {
    pub fn new(
        canonical: Arc<dyn GameStore>,
        products: Arc<dyn ProductStore>,
        migrator: Migrator,
    ) -> Self {
        Self {
            canonical,
            products,
            migrator,
        }
    }

    /// Tombstone a canonical game; false when it already was one.
    async fn soft_delete_live(&self, game: &Game) -> Result<bool> {
        if game.is_deleted {
            debug!(key = %game.key, "Game already deleted");
            return Ok(false);
        }
        self.canonical.soft_delete(game.id).await?;
        Ok(true)
    }

    /// Legacy projection for `id`, unless the canonical store already owns its key.
    async fn legacy_game(&self, id: Uuid) -> Result<Option<Game>> {
        let Some(product_id) = to_legacy_id(id) else {
            return Ok(None);
        };
        let product = self
            .products
            .get_by_id(product_id)
            .await
            .map_err(legacy_unavailable)?;
        match product {
            Some(product) => {
                let projected = Game::from(&product);
                if let Some(canonical) = self.canonical.get_by_key(&projected.key).await? {
                    return Ok(Some(canonical));
                }
                Ok(Some(projected))
            }
            None => Ok(None),
        }
    }

    /// Migrate legacy genres and publisher the game links to, and point the
    /// links at their canonical ids.
    async fn resolve_links(&self, game: &mut Game) -> Result<()> {
        for genre_id in game.genre_ids.iter_mut() {
            if to_legacy_id(*genre_id).is_some() {
                *genre_id = self.migrator.ensure_genre(*genre_id).await?.id;
            }
        }
        if let Some(publisher_id) = game.publisher_id {
            if to_legacy_id(publisher_id).is_some() {
                game.publisher_id = Some(self.migrator.ensure_publisher(publisher_id).await?.id);
            }
        }
        Ok(())
    }
}

#[async_trait]
impl GameRepository for FederatedGameRepository {
    async fn list(&self, pipeline: &GamePipeline) -> Result<GameList> {
        let index = self
            .canonical
            .key_index()
            .await
            .map_err(canonical_unavailable)?;

        let canonical_query =
            pipeline.apply_prefix_pagination(pipeline.apply_filters_and_sorting(GameQuery::new()));
        let legacy_query = pipeline.apply_prefix_pagination(
            pipeline
                .apply_filters_and_sorting(ProductQuery::new())
                .excluding_keys(index.keys.iter().cloned()),
        );

        let (canonical, legacy) = tokio::try_join!(
            async {
                self.canonical
                    .find(&canonical_query)
                    .await
                    .map_err(canonical_unavailable)
            },
            async {
                self.products
                    .find(&legacy_query)
                    .await
                    .map_err(legacy_unavailable)
            },
        )?;

        let projected: Vec<Game> = legacy.products.iter().map(Game::from).collect();
        let fetched = canonical.games.len() + projected.len();
        let merged = map_games_by_key(canonical.games, projected, &index.deleted);
        // Rows the legacy query could not exclude itself are dropped by the merge.
        let dropped = (fetched - merged.len()) as u64;
        let count = (canonical.count + legacy.count).saturating_sub(dropped);

        debug!(
            canonical = canonical.count,
            legacy = legacy.count,
            dropped,
            "Merged catalog page"
        );
        Ok(GameList::new(pipeline.resort_and_repaginate(merged), count))
    }

    async fn get_by_key(&self, key: &str, include_deleted: bool) -> Result<Option<Game>> {
        if let Some(game) = self.canonical.get_by_key(key).await? {
            // A tombstone hides the legacy copy as well.
            return Ok((include_deleted || !game.is_deleted).then_some(game));
        }
        let product = self
            .products
            .get_by_key(key)
            .await
            .map_err(legacy_unavailable)?;
        Ok(product.as_ref().map(Game::from))
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Option<Game>> {
        if let Some(game) = self.canonical.get_by_id(id).await? {
            return Ok(Some(game));
        }
        self.legacy_game(id).await
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        if self.canonical.exists(id).await? {
            return Ok(true);
        }
        Ok(self.legacy_game(id).await?.is_some())
    }

    async fn add(&self, mut game: Game) -> Result<()> {
        self.resolve_links(&mut game).await?;
        self.canonical.add(&game).await
    }

    async fn update(&self, mut game: Game) -> Result<()> {
        let target = self.migrator.ensure_game(game.id).await?;
        game.id = target.id;
        self.resolve_links(&mut game).await?;
        self.canonical.update(&game).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        if let Some(game) = self.canonical.get_by_id(id).await? {
            return self.soft_delete_live(&game).await;
        }
        let product = match to_legacy_id(id) {
            Some(product_id) => self
                .products
                .get_by_id(product_id)
                .await
                .map_err(legacy_unavailable)?,
            None => None,
        };
        let Some(product) = product else {
            return Err(StorageError::not_found("game", id));
        };

        let mut tombstone = Game::from(&product);
        if let Some(owner) = self.canonical.get_by_key(&tombstone.key).await? {
            return self.soft_delete_live(&owner).await;
        }
        tombstone.is_deleted = true;
        let stored = self.migrator.migrate_game(tombstone, &product).await?;
        if !stored.is_deleted {
            // Someone else migrated a live copy first.
            self.canonical.soft_delete(stored.id).await?;
        }
        Ok(true)
    }

    async fn adjust_units_in_stock(&self, id: Uuid, delta: i32) -> Result<()> {
        let game = self.migrator.ensure_game(id).await?;
        self.canonical.adjust_units_in_stock(game.id, delta).await?;

        if let Some(product_id) = to_legacy_id(game.id) {
            if let Err(e) = self.products.adjust_units_in_stock(product_id, delta).await {
                warn!(
                    product_id,
                    delta,
                    error = %e,
                    "Failed to mirror stock change to legacy store"
                );
            }
        }
        Ok(())
    }

    async fn increment_views(&self, key: &str) -> Result<()> {
        if let Some(game) = self.canonical.get_by_key(key).await? {
            return self.canonical.increment_views(game.id).await;
        }
        let product = self
            .products
            .get_by_key(key)
            .await
            .map_err(legacy_unavailable)?;
        match product {
            // Views are a read-path counter, not a migration trigger.
            Some(product) => self
                .products
                .increment_view_count(product.product_id)
                .await
                .map_err(legacy_unavailable),
            None => Err(StorageError::not_found("game", key)),
        }
    }

    async fn count(&self) -> Result<u64> {
        let index = self
            .canonical
            .key_index()
            .await
            .map_err(canonical_unavailable)?;
        let legacy_query = ProductQuery {
            window: PageWindow::new(0, Some(0)),
            ..ProductQuery::new().excluding_keys(index.keys.iter().cloned())
        };

        let (canonical, legacy) = tokio::try_join!(
            async { self.canonical.count().await.map_err(canonical_unavailable) },
            async {
                self.products
                    .find(&legacy_query)
                    .await
                    .map_err(legacy_unavailable)
            },
        )?;
        Ok(canonical + legacy.count)
    }
}
