//! In-memory legacy store.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::{CategoryStore, LegacyOrderStore, ProductPage, ProductStore, SupplierStore};
use crate::model::legacy::{
    LegacyCategory, LegacyOrder, LegacyOrderDetail, LegacyProduct, LegacySupplier,
};
use crate::pipeline::ProductQuery;
use crate::storage::{Result, StorageError};

/// Mock legacy store seeded directly with Northwind-shaped documents.
#[derive(Default)]
pub struct MockLegacyStore {
    products: RwLock<BTreeMap<i32, LegacyProduct>>,
    categories: RwLock<BTreeMap<i32, LegacyCategory>>,
    suppliers: RwLock<BTreeMap<i32, LegacySupplier>>,
    orders: RwLock<BTreeMap<i32, LegacyOrder>>,
    order_details: RwLock<Vec<LegacyOrderDetail>>,
    fail_on_read: RwLock<bool>,
    find_calls: RwLock<u32>,
}

impl MockLegacyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_product(&self, product: LegacyProduct) {
        self.products
            .write()
            .await
            .insert(product.product_id, product);
    }

    pub async fn insert_category(&self, category: LegacyCategory) {
        self.categories
            .write()
            .await
            .insert(category.category_id, category);
    }

    pub async fn insert_supplier(&self, supplier: LegacySupplier) {
        self.suppliers
            .write()
            .await
            .insert(supplier.supplier_id, supplier);
    }

    pub async fn insert_order(&self, order: LegacyOrder, details: Vec<LegacyOrderDetail>) {
        self.orders.write().await.insert(order.order_id, order);
        self.order_details.write().await.extend(details);
    }

    /// Direct read of a product, bypassing failure injection.
    pub async fn product(&self, product_id: i32) -> Option<LegacyProduct> {
        self.products.read().await.get(&product_id).cloned()
    }

    pub async fn set_fail_on_read(&self, fail: bool) {
        *self.fail_on_read.write().await = fail;
    }

    /// Number of product queries that reached the store.
    pub async fn find_calls(&self) -> u32 {
        *self.find_calls.read().await
    }

    async fn check_read(&self) -> Result<()> {
        if *self.fail_on_read.read().await {
            return Err(StorageError::Unavailable("legacy read".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ProductStore for MockLegacyStore {
    async fn find(&self, query: &ProductQuery) -> Result<ProductPage> {
        if query.suppressed {
            return Ok(ProductPage::default());
        }
        self.check_read().await?;
        *self.find_calls.write().await += 1;
        let products: Vec<LegacyProduct> = self.products.read().await.values().cloned().collect();
        let (products, count) = query.evaluate(products);
        Ok(ProductPage { products, count })
    }

    async fn get_by_id(&self, product_id: i32) -> Result<Option<LegacyProduct>> {
        self.check_read().await?;
        Ok(self.products.read().await.get(&product_id).cloned())
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<LegacyProduct>> {
        self.check_read().await?;
        Ok(self
            .products
            .read()
            .await
            .values()
            .find(|p| p.catalog_key() == key)
            .cloned())
    }

    async fn adjust_units_in_stock(&self, product_id: i32, delta: i32) -> Result<()> {
        match self.products.write().await.get_mut(&product_id) {
            Some(product) => {
                product.units_in_stock += delta;
                Ok(())
            }
            None => Err(StorageError::not_found("product", product_id)),
        }
    }

    async fn increment_view_count(&self, product_id: i32) -> Result<()> {
        match self.products.write().await.get_mut(&product_id) {
            Some(product) => {
                product.view_count += 1;
                Ok(())
            }
            None => Err(StorageError::not_found("product", product_id)),
        }
    }
}

#[async_trait]
impl CategoryStore for MockLegacyStore {
    async fn list(&self) -> Result<Vec<LegacyCategory>> {
        self.check_read().await?;
        Ok(self.categories.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, category_id: i32) -> Result<Option<LegacyCategory>> {
        self.check_read().await?;
        Ok(self.categories.read().await.get(&category_id).cloned())
    }
}

#[async_trait]
impl SupplierStore for MockLegacyStore {
    async fn list(&self) -> Result<Vec<LegacySupplier>> {
        self.check_read().await?;
        Ok(self.suppliers.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, supplier_id: i32) -> Result<Option<LegacySupplier>> {
        self.check_read().await?;
        Ok(self.suppliers.read().await.get(&supplier_id).cloned())
    }
}

#[async_trait]
impl LegacyOrderStore for MockLegacyStore {
    async fn list(&self) -> Result<Vec<LegacyOrder>> {
        self.check_read().await?;
        Ok(self.orders.read().await.values().cloned().collect())
    }

    async fn get_by_id(&self, order_id: i32) -> Result<Option<LegacyOrder>> {
        self.check_read().await?;
        Ok(self.orders.read().await.get(&order_id).cloned())
    }

    async fn details_for(&self, order_ids: &[i32]) -> Result<Vec<LegacyOrderDetail>> {
        self.check_read().await?;
        Ok(self
            .order_details
            .read()
            .await
            .iter()
            .filter(|d| order_ids.contains(&d.order_id))
            .cloned()
            .collect())
    }
}
