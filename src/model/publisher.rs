//! Canonical publisher record.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A game publisher. Legacy suppliers project onto this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publisher {
    pub id: Uuid,
    /// Unique company name; the merge key between stores.
    pub company_name: String,
    pub description: Option<String>,
    pub home_page: Option<String>,
    pub is_deleted: bool,
}

impl Publisher {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            company_name: company_name.into(),
            description: None,
            home_page: None,
            is_deleted: false,
        }
    }
}
