//! Catalog listing configuration.

use serde::Deserialize;

use crate::pipeline::{FilterError, PageSize};

/// Catalog listing defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Page size token used when a request names none ("10", "20", "all", ...).
    pub default_page_size: String,
}

impl CatalogConfig {
    pub fn page_size(&self) -> Result<PageSize, FilterError> {
        self.default_page_size.parse()
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            default_page_size: "10".to_string(),
        }
    }
}
