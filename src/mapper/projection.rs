//! Legacy document to canonical record projections.
//!
//! Projections are pure. Games, genres and publishers always project; an
//! order fails with `IncompleteProjection` when its date cannot be read, so
//! the migrator never writes a partial copy.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::identity::to_guid;
use crate::model::legacy::{
    LegacyCategory, LegacyOrder, LegacyOrderDetail, LegacyProduct, LegacySupplier,
};
use crate::model::{Game, Genre, Order, OrderItem, OrderStatus, Publisher};
use crate::storage::{Result, StorageError};

/// Northwind date text, e.g. `1996-07-04 00:00:00.000`.
const LEGACY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

impl From<&LegacyProduct> for Game {
    fn from(product: &LegacyProduct) -> Self {
        Game {
            id: to_guid(product.product_id),
            key: product.catalog_key(),
            name: product.product_name.clone(),
            description: product.quantity_per_unit.clone(),
            price: product.unit_price,
            units_in_stock: product.units_in_stock,
            discount: 0,
            views: product.view_count,
            published_at: None,
            publisher_id: product.supplier_id.map(to_guid),
            genre_ids: product.category_id.map(to_guid).into_iter().collect(),
            platform_ids: Vec::new(),
            comment_count: 0,
            is_deleted: false,
        }
    }
}

impl From<&LegacyCategory> for Genre {
    fn from(category: &LegacyCategory) -> Self {
        Genre {
            id: to_guid(category.category_id),
            name: category.category_name.clone(),
            parent_id: None,
            description: category.description.clone(),
            is_deleted: false,
        }
    }
}

impl From<&LegacySupplier> for Publisher {
    fn from(supplier: &LegacySupplier) -> Self {
        Publisher {
            id: to_guid(supplier.supplier_id),
            company_name: supplier.company_name.clone(),
            description: supplier.contact_name.clone(),
            home_page: supplier.home_page.clone(),
            is_deleted: false,
        }
    }
}

/// Parse a Northwind date string as UTC. Bare dates are accepted too.
pub fn parse_legacy_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, LEGACY_DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// Project a legacy order with its lines.
///
/// Lines belonging to other orders are ignored. Historical orders are
/// either shipped or paid.
pub fn project_order(order: &LegacyOrder, details: &[LegacyOrderDetail]) -> Result<Order> {
    let ordered_at = match order.order_date.as_deref() {
        Some(text) => Some(parse_legacy_date(text).ok_or_else(|| {
            StorageError::IncompleteProjection {
                entity: "order",
                id: order.order_id.to_string(),
                reason: format!("unreadable order date {text:?}"),
            }
        })?),
        None => None,
    };

    let items = details
        .iter()
        .filter(|detail| detail.order_id == order.order_id)
        .map(|detail| OrderItem {
            game_id: to_guid(detail.product_id),
            price: detail.unit_price,
            quantity: detail.quantity,
            discount: (detail.discount * 100.0).round() as i32,
        })
        .collect();

    let status = if order.shipped_date.is_some() {
        OrderStatus::Shipped
    } else {
        OrderStatus::Paid
    };

    Ok(Order {
        id: to_guid(order.order_id),
        customer: order.customer_id.clone(),
        ordered_at,
        status,
        items,
    })
}
