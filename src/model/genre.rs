//! Canonical genre record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A game genre. Legacy categories project onto this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: Uuid,
    /// Unique display name; the merge key between stores.
    pub name: String,
    pub parent_id: Option<Uuid>,
    pub description: Option<String>,
    pub is_deleted: bool,
}

impl Genre {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            parent_id: None,
            description: None,
            is_deleted: false,
        }
    }
}
