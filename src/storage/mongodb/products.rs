//! MongoDB ProductStore implementation.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, Bson, Document};
use tracing::debug;

use super::MongoLegacyStore;
use crate::interfaces::{ProductPage, ProductStore};
use crate::model::legacy::LegacyProduct;
use crate::pipeline::{GameSort, ProductPredicate, ProductQuery};
use crate::storage::{Result, StorageError};

/// Escape regex metacharacters so user text matches literally.
fn regex_literal(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if "\\^$.|?*+()[]{}".contains(ch) {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Translate predicates into a query document.
///
/// Key exclusion runs against the stored `GameKey`, so products imported
/// without one always pass it; [`ProductQuery::evaluate`] applies the exact
/// exclusion to those.
pub(crate) fn product_filter(predicates: &[ProductPredicate]) -> Document {
    let clauses: Vec<Document> = predicates
        .iter()
        .map(|predicate| match predicate {
            ProductPredicate::NameContains(needle) => doc! {
                "ProductName": { "$regex": regex_literal(needle), "$options": "i" }
            },
            ProductPredicate::CategoryIn(ids) => doc! { "CategoryID": { "$in": ids.clone() } },
            ProductPredicate::UnitPriceBetween { min, max } => {
                let mut range = Document::new();
                if let Some(min) = min {
                    range.insert("$gte", *min);
                }
                if let Some(max) = max {
                    range.insert("$lte", *max);
                }
                if range.is_empty() {
                    Document::new()
                } else {
                    doc! { "UnitPrice": range }
                }
            }
            ProductPredicate::SupplierIs(id) => doc! { "SupplierID": *id },
            ProductPredicate::KeyNotIn(keys) => {
                let keys: Vec<Bson> = keys
                    .iter()
                    .filter(|key| !key.is_empty())
                    .cloned()
                    .map(Bson::String)
                    .collect();
                doc! { "GameKey": { "$nin": keys } }
            }
        })
        .filter(|clause| !clause.is_empty())
        .collect();

    match clauses.len() {
        0 => Document::new(),
        1 => clauses.into_iter().next().unwrap_or_default(),
        _ => doc! { "$and": clauses },
    }
}

/// Products whose catalog key is derived from their name or id.
fn unkeyed() -> Document {
    doc! { "$or": [{ "GameKey": { "$exists": false } }, { "GameKey": "" }] }
}

/// `filter` narrowed to unkeyed products.
pub(crate) fn unkeyed_filter(filter: &Document) -> Document {
    if filter.is_empty() {
        unkeyed()
    } else {
        doc! { "$and": [filter.clone(), unkeyed()] }
    }
}

/// Sort document matching the in-memory product ordering when every
/// matching product carries a stored `GameKey`.
pub(crate) fn product_sort(order: Option<GameSort>) -> Document {
    let mut sort = match order {
        Some(GameSort::MostPopular) => doc! { "ViewCount": -1 },
        Some(GameSort::PriceAsc) => doc! { "UnitPrice": 1 },
        Some(GameSort::PriceDesc) => doc! { "UnitPrice": -1 },
        Some(GameSort::MostCommented) | Some(GameSort::New) | None => Document::new(),
    };
    sort.insert("GameKey", 1);
    sort.insert("ProductID", 1);
    sort
}

/// Parse the `product-{id}` fallback key.
fn fallback_product_id(key: &str) -> Option<i32> {
    key.strip_prefix("product-")?.parse().ok()
}

#[async_trait]
impl ProductStore for MongoLegacyStore {
    async fn find(&self, query: &ProductQuery) -> Result<ProductPage> {
        if query.suppressed {
            return Ok(ProductPage::default());
        }

        let filter = product_filter(&query.predicates);
        // Derived keys exist only client-side, so any unkeyed match moves
        // exclusion, ordering and windowing into memory.
        let unkeyed_matches = self
            .products
            .count_documents(unkeyed_filter(&filter))
            .await?;
        if unkeyed_matches > 0 {
            debug!(unkeyed_matches, "Evaluating product query in memory");
            let candidates: Vec<LegacyProduct> =
                self.products.find(filter).await?.try_collect().await?;
            let (products, count) = query.evaluate(candidates);
            return Ok(ProductPage { products, count });
        }

        let count = self.products.count_documents(filter.clone()).await?;
        // Mongo reads a zero limit as "no limit".
        if query.window.take == Some(0) {
            return Ok(ProductPage {
                products: Vec::new(),
                count,
            });
        }

        let mut find = self
            .products
            .find(filter)
            .sort(product_sort(query.order))
            .skip(query.window.skip);
        if let Some(take) = query.window.take {
            let limit = i64::try_from(take)
                .map_err(|_| StorageError::InvalidValue(format!("page size {take}")))?;
            find = find.limit(limit);
        }
        let products: Vec<LegacyProduct> = find.await?.try_collect().await?;

        Ok(ProductPage { products, count })
    }

    async fn get_by_id(&self, product_id: i32) -> Result<Option<LegacyProduct>> {
        Ok(self
            .products
            .find_one(doc! { "ProductID": product_id })
            .await?)
    }

    async fn get_by_key(&self, key: &str) -> Result<Option<LegacyProduct>> {
        if let Some(product) = self.products.find_one(doc! { "GameKey": key }).await? {
            return Ok(Some(product));
        }
        if let Some(product_id) = fallback_product_id(key) {
            let product = ProductStore::get_by_id(self, product_id).await?;
            return Ok(product.filter(|p| p.catalog_key() == key));
        }
        // Slugged keys are only derivable client-side.
        let unkeyed: Vec<LegacyProduct> = self
            .products
            .find(unkeyed())
            .await?
            .try_collect()
            .await?;
        Ok(unkeyed.into_iter().find(|p| p.catalog_key() == key))
    }

    async fn adjust_units_in_stock(&self, product_id: i32, delta: i32) -> Result<()> {
        let result = self
            .products
            .update_one(
                doc! { "ProductID": product_id },
                doc! { "$inc": { "UnitsInStock": delta } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(StorageError::not_found("product", product_id));
        }
        Ok(())
    }

    async fn increment_view_count(&self, product_id: i32) -> Result<()> {
        let result = self
            .products
            .update_one(
                doc! { "ProductID": product_id },
                doc! { "$inc": { "ViewCount": 1_i64 } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(StorageError::not_found("product", product_id));
        }
        Ok(())
    }
}
