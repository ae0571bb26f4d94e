//! Source-shaped query descriptions.
//!
//! A [`GameQuery`] describes a query over canonical games, a
//! [`ProductQuery`] one over legacy products. Pipeline steps build them;
//! storage backends translate them (SQL, BSON) or evaluate them in memory.
//! Both shapes share the same ordering rules so every backend and the
//! post-merge resort agree on sequence.

use std::cmp::Ordering;
use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::filter::GameSort;
use crate::model::legacy::LegacyProduct;
use crate::model::{Game, GameList};

/// Skip/take window over a sorted sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    /// `None` means no truncation.
    pub take: Option<u64>,
}

impl PageWindow {
    pub fn new(skip: u64, take: Option<u64>) -> Self {
        Self { skip, take }
    }

    /// Apply the window to an already-sorted vector.
    pub fn slice<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let iter = items.into_iter().skip(skip);
        match self.take {
            Some(take) => iter.take(usize::try_from(take).unwrap_or(usize::MAX)).collect(),
            None => iter.collect(),
        }
    }
}

/// Predicate over canonical games.
#[derive(Debug, Clone, PartialEq)]
pub enum GamePredicate {
    /// Case-insensitive substring of the name.
    NameContains(String),
    /// Genre set intersects the given ids.
    GenreIn(Vec<Uuid>),
    /// Platform set intersects the given ids.
    PlatformIn(Vec<Uuid>),
    /// Inclusive price bounds.
    PriceBetween { min: Option<f64>, max: Option<f64> },
    PublisherIs(Uuid),
    /// Published at or after the instant.
    PublishedSince(DateTime<Utc>),
    NotDeleted,
    KeyNotIn(BTreeSet<String>),
}

impl GamePredicate {
    pub fn matches(&self, game: &Game) -> bool {
        match self {
            GamePredicate::NameContains(needle) => contains_ignore_case(&game.name, needle),
            GamePredicate::GenreIn(ids) => game.genre_ids.iter().any(|g| ids.contains(g)),
            GamePredicate::PlatformIn(ids) => game.platform_ids.iter().any(|p| ids.contains(p)),
            GamePredicate::PriceBetween { min, max } => in_range(game.price, *min, *max),
            GamePredicate::PublisherIs(id) => game.publisher_id == Some(*id),
            GamePredicate::PublishedSince(since) => {
                game.published_at.is_some_and(|at| at >= *since)
            }
            GamePredicate::NotDeleted => !game.is_deleted,
            GamePredicate::KeyNotIn(keys) => !keys.contains(&game.key),
        }
    }
}

/// Predicate over legacy products.
#[derive(Debug, Clone, PartialEq)]
pub enum ProductPredicate {
    NameContains(String),
    CategoryIn(Vec<i32>),
    UnitPriceBetween { min: Option<f64>, max: Option<f64> },
    SupplierIs(i32),
    KeyNotIn(BTreeSet<String>),
}

impl ProductPredicate {
    pub fn matches(&self, product: &LegacyProduct) -> bool {
        match self {
            ProductPredicate::NameContains(needle) => {
                contains_ignore_case(&product.product_name, needle)
            }
            ProductPredicate::CategoryIn(ids) => {
                product.category_id.is_some_and(|c| ids.contains(&c))
            }
            ProductPredicate::UnitPriceBetween { min, max } => {
                in_range(product.unit_price, *min, *max)
            }
            ProductPredicate::SupplierIs(id) => product.supplier_id == Some(*id),
            ProductPredicate::KeyNotIn(keys) => !keys.contains(&product.catalog_key()),
        }
    }
}

/// Query over the canonical game source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameQuery {
    pub predicates: Vec<GamePredicate>,
    pub order: Option<GameSort>,
    pub window: PageWindow,
}

impl GameQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: GamePredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn matches(&self, game: &Game) -> bool {
        self.predicates.iter().all(|p| p.matches(game))
    }

    /// Evaluate in memory: filter, count, sort, then window.
    pub fn evaluate(&self, games: impl IntoIterator<Item = Game>) -> GameList {
        let mut matched: Vec<Game> = games.into_iter().filter(|g| self.matches(g)).collect();
        let count = matched.len() as u64;
        sort_games(&mut matched, self.order);
        GameList::new(self.window.slice(matched), count)
    }
}

/// Query over the legacy product source.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub predicates: Vec<ProductPredicate>,
    pub order: Option<GameSort>,
    pub window: PageWindow,
    /// Set when a filter cannot be satisfied by the legacy source.
    pub suppressed: bool,
}

impl ProductQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, predicate: ProductPredicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Mark the query as matching nothing.
    pub fn suppress(mut self) -> Self {
        self.suppressed = true;
        self
    }

    /// Exclude products whose catalog key is in `keys`.
    pub fn excluding_keys(self, keys: impl IntoIterator<Item = String>) -> Self {
        let keys: BTreeSet<String> = keys.into_iter().collect();
        if keys.is_empty() {
            return self;
        }
        self.filter(ProductPredicate::KeyNotIn(keys))
    }

    pub fn matches(&self, product: &LegacyProduct) -> bool {
        !self.suppressed && self.predicates.iter().all(|p| p.matches(product))
    }

    /// Evaluate in memory: filter, count, sort, then window.
    pub fn evaluate(
        &self,
        products: impl IntoIterator<Item = LegacyProduct>,
    ) -> (Vec<LegacyProduct>, u64) {
        let mut matched: Vec<LegacyProduct> =
            products.into_iter().filter(|p| self.matches(p)).collect();
        let count = matched.len() as u64;
        sort_products(&mut matched, self.order);
        (self.window.slice(matched), count)
    }
}

/// Sort canonical games; ties (and no requested sort) fall back to key order.
pub fn sort_games(games: &mut [Game], order: Option<GameSort>) {
    games.sort_by(|a, b| compare_games(a, b, order));
}

pub fn compare_games(a: &Game, b: &Game, order: Option<GameSort>) -> Ordering {
    let primary = match order {
        Some(GameSort::MostPopular) => b.views.cmp(&a.views),
        Some(GameSort::MostCommented) => b.comment_count.cmp(&a.comment_count),
        Some(GameSort::PriceAsc) => a.price.total_cmp(&b.price),
        Some(GameSort::PriceDesc) => b.price.total_cmp(&a.price),
        // Undated games sort after every dated one.
        Some(GameSort::New) => match (a.published_at, b.published_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        None => Ordering::Equal,
    };
    primary.then_with(|| a.key.cmp(&b.key))
}

/// Sort legacy products with the same rules as [`sort_games`].
pub fn sort_products(products: &mut [LegacyProduct], order: Option<GameSort>) {
    products.sort_by(|a, b| {
        let primary = match order {
            Some(GameSort::MostPopular) => b.view_count.cmp(&a.view_count),
            Some(GameSort::PriceAsc) => a.unit_price.total_cmp(&b.unit_price),
            Some(GameSort::PriceDesc) => b.unit_price.total_cmp(&a.unit_price),
            // No comments and no publishing date on legacy products.
            Some(GameSort::MostCommented) | Some(GameSort::New) | None => Ordering::Equal,
        };
        primary.then_with(|| a.catalog_key().cmp(&b.catalog_key()))
    });
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn in_range(value: f64, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |m| value >= m) && max.map_or(true, |m| value <= m)
}
