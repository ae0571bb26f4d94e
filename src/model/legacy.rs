//! Legacy Northwind document shapes.
//!
//! Field names follow the imported Northwind collections exactly. Documents
//! carry a Mongo `_id` as well, which is ignored; records are addressed by
//! their integer Northwind id.

use serde::{Deserialize, Serialize};

/// A product document (`products` collection); projects onto a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyProduct {
    #[serde(rename = "ProductID")]
    pub product_id: i32,
    #[serde(rename = "ProductName")]
    pub product_name: String,
    /// Catalog key assigned when the collection was imported into the store.
    #[serde(rename = "GameKey", default)]
    pub game_key: String,
    #[serde(rename = "SupplierID", default)]
    pub supplier_id: Option<i32>,
    #[serde(rename = "CategoryID", default)]
    pub category_id: Option<i32>,
    #[serde(rename = "QuantityPerUnit", default)]
    pub quantity_per_unit: Option<String>,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "UnitsInStock", default)]
    pub units_in_stock: i32,
    #[serde(rename = "UnitsOnOrder", default)]
    pub units_on_order: i32,
    #[serde(rename = "Discontinued", default)]
    pub discontinued: i32,
    #[serde(rename = "ViewCount", default)]
    pub view_count: i64,
}

impl LegacyProduct {
    pub fn new(product_id: i32, game_key: impl Into<String>, product_name: impl Into<String>) -> Self {
        Self {
            product_id,
            product_name: product_name.into(),
            game_key: game_key.into(),
            supplier_id: None,
            category_id: None,
            quantity_per_unit: None,
            unit_price: 0.0,
            units_in_stock: 0,
            units_on_order: 0,
            discontinued: 0,
            view_count: 0,
        }
    }

    /// The catalog key this product is addressed by.
    ///
    /// Products imported without a `GameKey` fall back to a slug of the name,
    /// and nameless products to their numeric id.
    pub fn catalog_key(&self) -> String {
        if !self.game_key.is_empty() {
            return self.game_key.clone();
        }
        let slug = slugify(&self.product_name);
        if slug.is_empty() {
            format!("product-{}", self.product_id)
        } else {
            slug
        }
    }
}

/// A category document (`categories` collection); projects onto a genre.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCategory {
    #[serde(rename = "CategoryID")]
    pub category_id: i32,
    #[serde(rename = "CategoryName")]
    pub category_name: String,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
}

/// A supplier document (`suppliers` collection); projects onto a publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacySupplier {
    #[serde(rename = "SupplierID")]
    pub supplier_id: i32,
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "ContactName", default)]
    pub contact_name: Option<String>,
    #[serde(rename = "Country", default)]
    pub country: Option<String>,
    #[serde(rename = "HomePage", default)]
    pub home_page: Option<String>,
}

/// An order document (`orders` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyOrder {
    #[serde(rename = "OrderID")]
    pub order_id: i32,
    #[serde(rename = "CustomerID")]
    pub customer_id: String,
    /// Northwind stores dates as `"1996-07-04 00:00:00.000"` strings.
    #[serde(rename = "OrderDate", default)]
    pub order_date: Option<String>,
    #[serde(rename = "ShippedDate", default)]
    pub shipped_date: Option<String>,
    #[serde(rename = "ShipVia", default)]
    pub ship_via: Option<i32>,
    #[serde(rename = "Freight", default)]
    pub freight: Option<f64>,
}

/// An order line document (`order-details` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyOrderDetail {
    #[serde(rename = "OrderID")]
    pub order_id: i32,
    #[serde(rename = "ProductID")]
    pub product_id: i32,
    #[serde(rename = "UnitPrice")]
    pub unit_price: f64,
    #[serde(rename = "Quantity")]
    pub quantity: i32,
    /// Fractional discount, 0.0 to 1.0.
    #[serde(rename = "Discount", default)]
    pub discount: f64,
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
        } else if !slug.ends_with('-') && !slug.is_empty() {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
