//! Pipeline steps.
//!
//! Each step knows how to apply itself to both source shapes. A step that
//! has no meaning for a source either passes it through unchanged or, when
//! the filter cannot be satisfied there, suppresses all of that source's
//! rows. An absent or empty filter value is always a pass-through.

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::filter::GameSort;
use super::query::{GamePredicate, GameQuery, PageWindow, ProductPredicate, ProductQuery};
use crate::identity;

/// A filter, sort or pagination unit applicable to either source.
pub trait PipelineStep: Debug + Send + Sync {
    /// Apply to a canonical-store query.
    fn apply_to_games(&self, query: GameQuery) -> GameQuery;

    /// Apply to a legacy-store query.
    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery;
}

/// A source query shape that pipeline steps can act on.
pub trait Queryable: Sized {
    fn apply(self, step: &dyn PipelineStep) -> Self;
}

impl Queryable for GameQuery {
    fn apply(self, step: &dyn PipelineStep) -> Self {
        step.apply_to_games(self)
    }
}

impl Queryable for ProductQuery {
    fn apply(self, step: &dyn PipelineStep) -> Self {
        step.apply_to_products(self)
    }
}

/// Drops soft-deleted canonical rows. Legacy rows carry no delete flag.
#[derive(Debug, Clone, Default)]
pub struct ExcludeDeletedStep;

impl PipelineStep for ExcludeDeletedStep {
    fn apply_to_games(&self, query: GameQuery) -> GameQuery {
        query.filter(GamePredicate::NotDeleted)
    }

    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery {
        query
    }
}

/// Case-insensitive substring match on the name.
#[derive(Debug, Clone)]
pub struct NameFilterStep {
    name: Option<String>,
}

impl NameFilterStep {
    pub fn new(name: Option<String>) -> Self {
        let name = name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Self { name }
    }
}

impl PipelineStep for NameFilterStep {
    fn apply_to_games(&self, query: GameQuery) -> GameQuery {
        match &self.name {
            Some(name) => query.filter(GamePredicate::NameContains(name.clone())),
            None => query,
        }
    }

    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery {
        match &self.name {
            Some(name) => query.filter(ProductPredicate::NameContains(name.clone())),
            None => query,
        }
    }
}

/// Keeps games in any of the requested genres.
///
/// On the legacy source each id is mapped back to its category id; ids that
/// were not derived from a legacy category cannot match a legacy product.
#[derive(Debug, Clone)]
pub struct GenreFilterStep {
    genres: Vec<Uuid>,
}

impl GenreFilterStep {
    pub fn new(genres: Vec<Uuid>) -> Self {
        Self { genres }
    }
}

impl PipelineStep for GenreFilterStep {
    fn apply_to_games(&self, query: GameQuery) -> GameQuery {
        if self.genres.is_empty() {
            return query;
        }
        query.filter(GamePredicate::GenreIn(self.genres.clone()))
    }

    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery {
        if self.genres.is_empty() {
            return query;
        }
        let categories: Vec<i32> = self
            .genres
            .iter()
            .filter_map(|id| identity::to_legacy_id(*id))
            .collect();
        if categories.is_empty() {
            return query.suppress();
        }
        query.filter(ProductPredicate::CategoryIn(categories))
    }
}

/// Keeps games on any of the requested platforms.
///
/// The legacy source has no platform concept, so a non-empty filter
/// suppresses every legacy row.
#[derive(Debug, Clone)]
pub struct PlatformFilterStep {
    platforms: Vec<Uuid>,
}

impl PlatformFilterStep {
    pub fn new(platforms: Vec<Uuid>) -> Self {
        Self { platforms }
    }
}

impl PipelineStep for PlatformFilterStep {
    fn apply_to_games(&self, query: GameQuery) -> GameQuery {
        if self.platforms.is_empty() {
            return query;
        }
        query.filter(GamePredicate::PlatformIn(self.platforms.clone()))
    }

    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery {
        if self.platforms.is_empty() {
            return query;
        }
        query.suppress()
    }
}

/// Inclusive price bounds.
#[derive(Debug, Clone)]
pub struct PriceRangeStep {
    min: Option<f64>,
    max: Option<f64>,
}

impl PriceRangeStep {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

impl PipelineStep for PriceRangeStep {
    fn apply_to_games(&self, query: GameQuery) -> GameQuery {
        if self.is_empty() {
            return query;
        }
        query.filter(GamePredicate::PriceBetween {
            min: self.min,
            max: self.max,
        })
    }

    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery {
        if self.is_empty() {
            return query;
        }
        query.filter(ProductPredicate::UnitPriceBetween {
            min: self.min,
            max: self.max,
        })
    }
}

/// Exact publisher match; on the legacy source, the mapped supplier id.
#[derive(Debug, Clone)]
pub struct PublisherFilterStep {
    publisher: Option<Uuid>,
}

impl PublisherFilterStep {
    pub fn new(publisher: Option<Uuid>) -> Self {
        Self { publisher }
    }
}

impl PipelineStep for PublisherFilterStep {
    fn apply_to_games(&self, query: GameQuery) -> GameQuery {
        match self.publisher {
            Some(id) => query.filter(GamePredicate::PublisherIs(id)),
            None => query,
        }
    }

    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery {
        match self.publisher {
            Some(id) => match identity::to_legacy_id(id) {
                Some(supplier) => query.filter(ProductPredicate::SupplierIs(supplier)),
                None => query.suppress(),
            },
            None => query,
        }
    }
}

/// Lower bound on the publishing date.
///
/// Legacy products have no creation date, so any bound suppresses them.
#[derive(Debug, Clone)]
pub struct PublishingDateStep {
    since: Option<DateTime<Utc>>,
}

impl PublishingDateStep {
    pub fn new(since: Option<DateTime<Utc>>) -> Self {
        Self { since }
    }
}

impl PipelineStep for PublishingDateStep {
    fn apply_to_games(&self, query: GameQuery) -> GameQuery {
        match self.since {
            Some(since) => query.filter(GamePredicate::PublishedSince(since)),
            None => query,
        }
    }

    fn apply_to_products(&self, query: ProductQuery) -> ProductQuery {
        match self.since {
            Some(_) => query.suppress(),
            None => query,
        }
    }
}

/// Requested ordering. Field names are mapped per source by the backends.
#[derive(Debug, Clone, Default)]
pub struct SortStep {
    sort: Option<GameSort>,
}

impl SortStep {
    pub fn new(sort: Option<GameSort>) -> Self {
        Self { sort }
    }

    pub fn sort(&self) -> Option<GameSort> {
        self.sort
    }
}

impl PipelineStep for SortStep {
    fn apply_to_games(&self, mut query: GameQuery) -> GameQuery {
        if self.sort.is_some() {
            query.order = self.sort;
        }
        query
    }

    fn apply_to_products(&self, mut query: ProductQuery) -> ProductQuery {
        if self.sort.is_some() {
            query.order = self.sort;
        }
        query
    }
}

/// Skip/take by page number and page size.
#[derive(Debug, Clone, Default)]
pub struct PaginationStep {
    window: PageWindow,
}

impl PaginationStep {
    /// `page` is one-based; `page_size` of `None` means no truncation.
    pub fn new(page: u32, page_size: Option<u32>) -> Self {
        let window = match page_size {
            Some(size) => {
                let page = u64::from(page.max(1));
                let size = u64::from(size);
                PageWindow::new((page - 1) * size, Some(size))
            }
            None => PageWindow::default(),
        };
        Self { window }
    }

    pub fn from_window(window: PageWindow) -> Self {
        Self { window }
    }

    pub fn window(&self) -> PageWindow {
        self.window
    }

    /// Window covering everything from the first row to the end of this page.
    pub fn prefix(&self) -> PageWindow {
        PageWindow::new(0, self.window.take.map(|take| self.window.skip + take))
    }
}

impl PipelineStep for PaginationStep {
    fn apply_to_games(&self, mut query: GameQuery) -> GameQuery {
        query.window = self.window;
        query
    }

    fn apply_to_products(&self, mut query: ProductQuery) -> ProductQuery {
        query.window = self.window;
        query
    }
}
