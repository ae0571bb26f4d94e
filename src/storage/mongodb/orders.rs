//! MongoDB CategoryStore, SupplierStore and LegacyOrderStore implementations.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;

use super::MongoLegacyStore;
use crate::interfaces::{CategoryStore, LegacyOrderStore, SupplierStore};
use crate::model::legacy::{LegacyCategory, LegacyOrder, LegacyOrderDetail, LegacySupplier};
use crate::storage::Result;

#[async_trait]
impl CategoryStore for MongoLegacyStore {
    async fn list(&self) -> Result<Vec<LegacyCategory>> {
        let cursor = self
            .categories
            .find(doc! {})
            .sort(doc! { "CategoryID": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_by_id(&self, category_id: i32) -> Result<Option<LegacyCategory>> {
        Ok(self
            .categories
            .find_one(doc! { "CategoryID": category_id })
            .await?)
    }
}

#[async_trait]
impl SupplierStore for MongoLegacyStore {
    async fn list(&self) -> Result<Vec<LegacySupplier>> {
        let cursor = self
            .suppliers
            .find(doc! {})
            .sort(doc! { "SupplierID": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_by_id(&self, supplier_id: i32) -> Result<Option<LegacySupplier>> {
        Ok(self
            .suppliers
            .find_one(doc! { "SupplierID": supplier_id })
            .await?)
    }
}

#[async_trait]
impl LegacyOrderStore for MongoLegacyStore {
    async fn list(&self) -> Result<Vec<LegacyOrder>> {
        let cursor = self
            .orders
            .find(doc! {})
            .sort(doc! { "OrderID": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    async fn get_by_id(&self, order_id: i32) -> Result<Option<LegacyOrder>> {
        Ok(self.orders.find_one(doc! { "OrderID": order_id }).await?)
    }

    async fn details_for(&self, order_ids: &[i32]) -> Result<Vec<LegacyOrderDetail>> {
        if order_ids.is_empty() {
            return Ok(Vec::new());
        }
        let cursor = self
            .order_details
            .find(doc! { "OrderID": { "$in": order_ids.to_vec() } })
            .sort(doc! { "OrderID": 1, "ProductID": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
