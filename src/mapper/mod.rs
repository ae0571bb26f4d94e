//! Entity mapping between the two stores.
//!
//! [`projection`] turns legacy Northwind documents into canonical-shaped
//! records; [`merge`] reconciles already-fetched canonical and projected
//! collections by key.

pub mod merge;
pub mod projection;

pub use merge::{map_games_by_key, map_genres_by_name, map_orders_by_id, map_publishers_by_company_name};
pub use projection::{parse_legacy_date, project_order};
