//! Federated repositories.
//!
//! Each repository fans reads out to the canonical and legacy stores, merges
//! the results by key, and routes writes through the [`Migrator`] before
//! delegating to the canonical store. They implement the same traits a
//! single-store repository would, so services cannot tell the difference.

mod comments;
mod games;
mod genres;
mod orders;
mod publishers;

use std::sync::Arc;

pub use comments::FederatedCommentRepository;
pub use games::FederatedGameRepository;
pub use genres::FederatedGenreRepository;
pub use orders::FederatedOrderRepository;
pub use publishers::FederatedPublisherRepository;

use crate::interfaces::{
    CommentRepository, GameRepository, GenreRepository, OrderRepository, PublisherRepository,
};
use crate::migration::Migrator;
use crate::storage::{CatalogStores, DataSource, StorageError};

/// Every federated repository, sharing one migrator.
#[derive(Clone)]
pub struct FederatedRepositories {
    pub games: Arc<dyn GameRepository>,
    pub genres: Arc<dyn GenreRepository>,
    pub publishers: Arc<dyn PublisherRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub comments: Arc<dyn CommentRepository>,
}

impl FederatedRepositories {
    pub fn new(stores: CatalogStores) -> Self {
        let CatalogStores { canonical, legacy } = stores;
        let migrator = Migrator::new(canonical.clone(), legacy.clone());

        Self {
            games: Arc::new(FederatedGameRepository::new(
                canonical.games.clone(),
                legacy.products.clone(),
                migrator.clone(),
            )),
            genres: Arc::new(FederatedGenreRepository::new(
                canonical.genres.clone(),
                legacy.categories.clone(),
                migrator.clone(),
            )),
            publishers: Arc::new(FederatedPublisherRepository::new(
                canonical.publishers.clone(),
                legacy.suppliers.clone(),
                migrator.clone(),
            )),
            orders: Arc::new(FederatedOrderRepository::new(
                canonical.orders.clone(),
                legacy.orders.clone(),
                migrator.clone(),
            )),
            comments: Arc::new(FederatedCommentRepository::new(
                canonical.comments,
                migrator,
            )),
        }
    }
}

fn canonical_unavailable(err: StorageError) -> StorageError {
    StorageError::unavailable(DataSource::Canonical, err)
}

fn legacy_unavailable(err: StorageError) -> StorageError {
    StorageError::unavailable(DataSource::Legacy, err)
}
