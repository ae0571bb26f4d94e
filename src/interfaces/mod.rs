//! Abstract interfaces for the catalog.
//!
//! These traits define the contracts for:
//! - Canonical single-store persistence (system of record)
//! - Legacy single-store access (Northwind documents, read-mostly)
//! - Federated repositories consumed by catalog services

pub mod catalog_store;
pub mod legacy_store;
pub mod repository;

pub use catalog_store::{CommentStore, GameStore, GenreStore, KeyIndex, OrderStore, PublisherStore};
pub use legacy_store::{CategoryStore, LegacyOrderStore, ProductPage, ProductStore, SupplierStore};
pub use repository::{
    CommentRepository, GameRepository, GenreRepository, OrderRepository, PublisherRepository,
};
