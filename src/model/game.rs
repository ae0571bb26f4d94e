//! Canonical game record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity;

/// A game in the unified catalog.
///
/// Navigation collections are carried as identifier lists; the referenced
/// genres, platforms and publisher are loaded through their own repositories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    /// Human-readable unique key, used for merge and URL addressing.
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub units_in_stock: i32,
    pub discount: i32,
    pub views: i64,
    /// Absent for legacy-origin games; the legacy source has no creation date.
    pub published_at: Option<DateTime<Utc>>,
    pub publisher_id: Option<Uuid>,
    pub genre_ids: Vec<Uuid>,
    pub platform_ids: Vec<Uuid>,
    /// Read-side projection of the comment count, used for sorting.
    #[serde(default)]
    pub comment_count: u32,
    pub is_deleted: bool,
}

impl Game {
    /// Create a new canonical game with a fresh random identifier.
    pub fn new(key: impl Into<String>, name: impl Into<String>, price: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            key: key.into(),
            name: name.into(),
            description: None,
            price,
            units_in_stock: 0,
            discount: 0,
            views: 0,
            published_at: None,
            publisher_id: None,
            genre_ids: Vec::new(),
            platform_ids: Vec::new(),
            comment_count: 0,
            is_deleted: false,
        }
    }

    /// Whether this game's identifier was derived from a legacy product id.
    pub fn is_legacy_derived(&self) -> bool {
        identity::is_legacy_derived(self.id)
    }
}

/// A page of games paired with the total match count across all sources.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameList {
    pub games: Vec<Game>,
    pub count: u64,
}

impl GameList {
    pub fn new(games: Vec<Game>, count: u64) -> Self {
        Self { games, count }
    }

    pub fn keys(&self) -> Vec<&str> {
        self.games.iter().map(|g| g.key.as_str()).collect()
    }
}
