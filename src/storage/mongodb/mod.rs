//! MongoDB implementation of the legacy store.
//!
//! The legacy database holds the imported Northwind collections. The store
//! never creates indexes or documents there; the only writes are `$inc`
//! updates to product counters.

mod orders;
mod products;

use mongodb::bson::doc;
use mongodb::{Client, Collection};
use tracing::info;

use crate::model::legacy::{
    LegacyCategory, LegacyOrder, LegacyOrderDetail, LegacyProduct, LegacySupplier,
};
use crate::storage::Result;

/// Collection names.
pub(crate) const PRODUCTS_COLLECTION: &str = "products";
pub(crate) const CATEGORIES_COLLECTION: &str = "categories";
pub(crate) const SUPPLIERS_COLLECTION: &str = "suppliers";
pub(crate) const ORDERS_COLLECTION: &str = "orders";
pub(crate) const ORDER_DETAILS_COLLECTION: &str = "order-details";

/// MongoDB implementation of the legacy stores.
pub struct MongoLegacyStore {
    products: Collection<LegacyProduct>,
    categories: Collection<LegacyCategory>,
    suppliers: Collection<LegacySupplier>,
    orders: Collection<LegacyOrder>,
    order_details: Collection<LegacyOrderDetail>,
}

impl MongoLegacyStore {
    /// Create a store over an existing client.
    pub fn new(client: &Client, database_name: &str) -> Self {
        let database = client.database(database_name);
        Self {
            products: database.collection(PRODUCTS_COLLECTION),
            categories: database.collection(CATEGORIES_COLLECTION),
            suppliers: database.collection(SUPPLIERS_COLLECTION),
            orders: database.collection(ORDERS_COLLECTION),
            order_details: database.collection(ORDER_DETAILS_COLLECTION),
        }
    }

    /// Connect and verify the server answers.
    pub async fn connect(uri: &str, database_name: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri).await?;
        client
            .database(database_name)
            .run_command(doc! { "ping": 1 })
            .await?;
        info!(database = %database_name, "Connected to legacy MongoDB store");
        Ok(Self::new(&client, database_name))
    }
}
