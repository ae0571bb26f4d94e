//! Legacy store interfaces.
//!
//! The legacy store is read-mostly: the only writes kept are the narrow
//! stock and view counters that older readers still consume.

use async_trait::async_trait;

use crate::model::legacy::{
    LegacyCategory, LegacyOrder, LegacyOrderDetail, LegacyProduct, LegacySupplier,
};
use crate::pipeline::ProductQuery;
use crate::storage::Result;

/// A window of products with the total match count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub products: Vec<LegacyProduct>,
    pub count: u64,
}

/// Legacy product access (`products` collection).
///
/// Implementations:
/// - `MongoLegacyStore`: MongoDB storage
/// - `MockLegacyStore`: In-memory mock for testing
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Run a query. A suppressed query returns an empty page without I/O.
    async fn find(&self, query: &ProductQuery) -> Result<ProductPage>;

    async fn get_by_id(&self, product_id: i32) -> Result<Option<LegacyProduct>>;

    async fn get_by_key(&self, key: &str) -> Result<Option<LegacyProduct>>;

    async fn adjust_units_in_stock(&self, product_id: i32, delta: i32) -> Result<()>;

    async fn increment_view_count(&self, product_id: i32) -> Result<()>;
}

/// Legacy category access (`categories` collection).
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn list(&self) -> Result<Vec<LegacyCategory>>;

    async fn get_by_id(&self, category_id: i32) -> Result<Option<LegacyCategory>>;
}

/// Legacy supplier access (`suppliers` collection).
#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn list(&self) -> Result<Vec<LegacySupplier>>;

    async fn get_by_id(&self, supplier_id: i32) -> Result<Option<LegacySupplier>>;
}

/// Legacy order access (`orders` and `order-details` collections).
#[async_trait]
pub trait LegacyOrderStore: Send + Sync {
    async fn list(&self) -> Result<Vec<LegacyOrder>>;

    async fn get_by_id(&self, order_id: i32) -> Result<Option<LegacyOrder>>;

    /// Order lines for the given orders.
    async fn details_for(&self, order_ids: &[i32]) -> Result<Vec<LegacyOrderDetail>>;
}
