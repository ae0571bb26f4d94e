//! Catalog data model.
//!
//! Canonical records are the unified shape used above the federation
//! boundary. Legacy records mirror the Northwind document collections
//! field-for-field and only exist below it.

mod comment;
mod game;
mod genre;
pub mod legacy;
mod order;
mod publisher;

pub use comment::{Comment, DELETED_COMMENT_BODY};
pub use game::{Game, GameList};
pub use genre::Genre;
pub use order::{Order, OrderItem, OrderStatus};
pub use publisher::Publisher;
