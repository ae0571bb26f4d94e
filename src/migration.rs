//! Lazy migration of legacy records into the canonical store.
//!
//! A legacy record is copied into the canonical store the first time a
//! write touches it. Every migration runs in two phases: all legacy reads
//! and projection checks first, then the canonical writes in dependency
//! order (genres, publisher, game). A projection that cannot be completed
//! fails before anything is written.
//!
//! Two writers may race to migrate the same record. The canonical store's
//! uniqueness constraints reject the second insert with `Duplicate`, which
//! the migrator treats as "already migrated" and resolves to the stored row.

use std::collections::HashMap;

use tracing::{debug, info};
use uuid::Uuid;

use crate::identity::{to_guid, to_legacy_id};
use crate::model::legacy::{LegacyCategory, LegacyProduct, LegacySupplier};
use crate::model::{Game, Genre, Order, Publisher};
use crate::storage::{CanonicalStores, DataSource, LegacyStores, Result, StorageError};

/// Copies legacy records into the canonical store on demand.
#[derive(Clone)]
pub struct Migrator {
    canonical: CanonicalStores,
    legacy: LegacyStores,
}

fn legacy_err(err: StorageError) -> StorageError {
    StorageError::unavailable(DataSource::Legacy, err)
}

impl Migrator {
    pub fn new(canonical: CanonicalStores, legacy: LegacyStores) -> Self {
        Self { canonical, legacy }
    }

    /// Return the canonical game for `id`, migrating it from the legacy
    /// store when only a legacy copy exists.
    pub async fn ensure_game(&self, id: Uuid) -> Result<Game> {
        if let Some(game) = self.canonical.games.get_by_id(id).await? {
            return Ok(game);
        }
        let product = match to_legacy_id(id) {
            Some(product_id) => self
                .legacy
                .products
                .get_by_id(product_id)
                .await
                .map_err(legacy_err)?,
            None => None,
        };
        match product {
            Some(product) => self.migrate_game(Game::from(&product), &product).await,
            None => Err(StorageError::not_found("game", id)),
        }
    }

    /// Materialize `candidate`, the canonical-shaped form of `product`.
    ///
    /// The candidate may differ from the plain projection (a tombstone, an
    /// edited copy); its genre and publisher links are rewritten to the
    /// canonical ids of the product's category and supplier. Returns the
    /// stored game, which is the existing one when the key is already
    /// canonical.
    pub async fn migrate_game(&self, mut candidate: Game, product: &LegacyProduct) -> Result<Game> {
        if let Some(existing) = self.existing_game(candidate.id, &candidate.key).await? {
            debug!(key = %existing.key, "Game already canonical, skipping migration");
            return Ok(existing);
        }

        // Phase one: every legacy read the copy depends on.
        let category = match product.category_id {
            Some(category_id) => Some(
                self.legacy
                    .categories
                    .get_by_id(category_id)
                    .await
                    .map_err(legacy_err)?
                    .ok_or_else(|| missing_dependency(product, "category", category_id))?,
            ),
            None => None,
        };
        let supplier = match product.supplier_id {
            Some(supplier_id) => Some(
                self.legacy
                    .suppliers
                    .get_by_id(supplier_id)
                    .await
                    .map_err(legacy_err)?
                    .ok_or_else(|| missing_dependency(product, "supplier", supplier_id))?,
            ),
            None => None,
        };

        // Phase two: dependencies, then the game itself.
        let genre_ids = self.migrate_genres(category.as_slice()).await?;
        let remap: HashMap<Uuid, Uuid> = category
            .iter()
            .map(|c| to_guid(c.category_id))
            .zip(genre_ids)
            .collect();
        for genre_id in candidate.genre_ids.iter_mut() {
            if let Some(canonical) = remap.get(genre_id) {
                *genre_id = *canonical;
            }
        }
        if let Some(supplier) = &supplier {
            candidate.publisher_id = Some(self.migrate_publisher(supplier).await?);
        }

        match self.canonical.games.add(&candidate).await {
            Ok(()) => {
                info!(
                    key = %candidate.key,
                    product_id = product.product_id,
                    deleted = candidate.is_deleted,
                    "Migrated legacy game"
                );
                Ok(candidate)
            }
            Err(e) if e.is_duplicate() => {
                debug!(key = %candidate.key, "Concurrent migration won the race");
                self.existing_game(candidate.id, &candidate.key)
                    .await?
                    .ok_or_else(|| StorageError::migration_failed("game", &candidate.key, e))
            }
            Err(e) => Err(StorageError::migration_failed("game", &candidate.key, e)),
        }
    }

    /// Materialize legacy categories as genres, returning the canonical
    /// genre id for each, in input order.
    ///
    /// A category whose name is already a canonical genre resolves to that
    /// genre instead of creating a second one.
    pub async fn migrate_genres(&self, categories: &[LegacyCategory]) -> Result<Vec<Uuid>> {
        let mut ids = Vec::with_capacity(categories.len());
        for category in categories {
            let genre = Genre::from(category);
            if let Some(existing) = self.existing_genre(genre.id, &genre.name).await? {
                ids.push(existing.id);
                continue;
            }
            match self.canonical.genres.add(&genre).await {
                Ok(()) => {
                    info!(name = %genre.name, category_id = category.category_id, "Migrated legacy genre");
                    ids.push(genre.id);
                }
                Err(e) if e.is_duplicate() => {
                    let existing = self
                        .existing_genre(genre.id, &genre.name)
                        .await?
                        .ok_or_else(|| StorageError::migration_failed("genre", &genre.name, e))?;
                    ids.push(existing.id);
                }
                Err(e) => return Err(StorageError::migration_failed("genre", &genre.name, e)),
            }
        }
        Ok(ids)
    }

    /// Materialize a legacy supplier as a publisher, returning its canonical id.
    pub async fn migrate_publisher(&self, supplier: &LegacySupplier) -> Result<Uuid> {
        let publisher = Publisher::from(supplier);
        if let Some(existing) = self
            .existing_publisher(publisher.id, &publisher.company_name)
            .await?
        {
            return Ok(existing.id);
        }
        match self.canonical.publishers.add(&publisher).await {
            Ok(()) => {
                info!(
                    company_name = %publisher.company_name,
                    supplier_id = supplier.supplier_id,
                    "Migrated legacy publisher"
                );
                Ok(publisher.id)
            }
            Err(e) if e.is_duplicate() => self
                .existing_publisher(publisher.id, &publisher.company_name)
                .await?
                .map(|p| p.id)
                .ok_or_else(|| StorageError::migration_failed("publisher", &publisher.company_name, e)),
            Err(e) => Err(StorageError::migration_failed(
                "publisher",
                &publisher.company_name,
                e,
            )),
        }
    }

    /// Return the canonical genre for `id`, migrating its legacy category if needed.
    pub async fn ensure_genre(&self, id: Uuid) -> Result<Genre> {
        if let Some(genre) = self.canonical.genres.get_by_id(id).await? {
            return Ok(genre);
        }
        let category = match to_legacy_id(id) {
            Some(category_id) => self
                .legacy
                .categories
                .get_by_id(category_id)
                .await
                .map_err(legacy_err)?,
            None => None,
        };
        let Some(category) = category else {
            return Err(StorageError::not_found("genre", id));
        };
        let ids = self.migrate_genres(std::slice::from_ref(&category)).await?;
        let genre_id = ids.first().copied().unwrap_or(id);
        self.canonical
            .genres
            .get_by_id(genre_id)
            .await?
            .ok_or_else(|| StorageError::not_found("genre", genre_id))
    }

    /// Return the canonical publisher for `id`, migrating its legacy supplier if needed.
    pub async fn ensure_publisher(&self, id: Uuid) -> Result<Publisher> {
        if let Some(publisher) = self.canonical.publishers.get_by_id(id).await? {
            return Ok(publisher);
        }
        let supplier = match to_legacy_id(id) {
            Some(supplier_id) => self
                .legacy
                .suppliers
                .get_by_id(supplier_id)
                .await
                .map_err(legacy_err)?,
            None => None,
        };
        let Some(supplier) = supplier else {
            return Err(StorageError::not_found("publisher", id));
        };
        let publisher_id = self.migrate_publisher(&supplier).await?;
        self.canonical
            .publishers
            .get_by_id(publisher_id)
            .await?
            .ok_or_else(|| StorageError::not_found("publisher", publisher_id))
    }

    /// Materialize an order, migrating every game its lines reference.
    ///
    /// Line game ids are rewritten to the canonical ids of the migrated games.
    pub async fn migrate_order(&self, mut candidate: Order) -> Result<Order> {
        if let Some(existing) = self.canonical.orders.get_by_id(candidate.id).await? {
            return Ok(existing);
        }
        self.ensure_order_games(&mut candidate).await?;

        let order_id = candidate.id;
        match self.canonical.orders.add(&candidate).await {
            Ok(()) => {
                info!(order_id = %order_id, lines = candidate.items.len(), "Migrated legacy order");
                Ok(candidate)
            }
            Err(e) if e.is_duplicate() => self
                .canonical
                .orders
                .get_by_id(order_id)
                .await?
                .ok_or_else(|| StorageError::migration_failed("order", order_id, e)),
            Err(e) => Err(StorageError::migration_failed("order", order_id, e)),
        }
    }

    /// Migrate every legacy game an order references and point its lines
    /// at the canonical copies.
    pub async fn ensure_order_games(&self, order: &mut Order) -> Result<()> {
        for item in order.items.iter_mut() {
            let game = self.ensure_game(item.game_id).await?;
            item.game_id = game.id;
        }
        Ok(())
    }

    async fn existing_game(&self, id: Uuid, key: &str) -> Result<Option<Game>> {
        if let Some(game) = self.canonical.games.get_by_id(id).await? {
            return Ok(Some(game));
        }
        self.canonical.games.get_by_key(key).await
    }

    async fn existing_genre(&self, id: Uuid, name: &str) -> Result<Option<Genre>> {
        if let Some(genre) = self.canonical.genres.get_by_id(id).await? {
            return Ok(Some(genre));
        }
        self.canonical.genres.get_by_name(name).await
    }

    async fn existing_publisher(&self, id: Uuid, company_name: &str) -> Result<Option<Publisher>> {
        if let Some(publisher) = self.canonical.publishers.get_by_id(id).await? {
            return Ok(Some(publisher));
        }
        self.canonical
            .publishers
            .get_by_company_name(company_name)
            .await
    }
}

fn missing_dependency(product: &LegacyProduct, entity: &str, id: i32) -> StorageError {
    StorageError::IncompleteProjection {
        entity: "game",
        id: product.product_id.to_string(),
        reason: format!("{entity} {id} not found in legacy store"),
    }
}
