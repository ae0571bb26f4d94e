//! Federated query pipeline.
//!
//! A [`GamePipeline`] is an ordered composition of [`PipelineStep`]s built
//! from a [`GameFilter`] by a [`PipelineFactory`]. It runs against either
//! source shape and can re-run its sort and pagination over a merged,
//! in-memory result.

mod factory;
mod filter;
mod query;
mod steps;

pub use factory::{DefaultPipelineFactory, PipelineFactory};
pub use filter::{FilterError, GameFilter, GameSort, PageSize, PublishingWindow};
pub use query::{
    compare_games, sort_games, sort_products, GamePredicate, GameQuery, PageWindow,
    ProductPredicate, ProductQuery,
};
pub use steps::{
    ExcludeDeletedStep, GenreFilterStep, NameFilterStep, PaginationStep, PipelineStep,
    PlatformFilterStep, PriceRangeStep, PublisherFilterStep, PublishingDateStep, Queryable,
    SortStep,
};

use crate::model::Game;

/// Filter, sort and pagination steps for one catalog request.
#[derive(Debug)]
pub struct GamePipeline {
    filters: Vec<Box<dyn PipelineStep>>,
    sort: SortStep,
    pagination: PaginationStep,
}

impl GamePipeline {
    pub fn new(
        filters: Vec<Box<dyn PipelineStep>>,
        sort: SortStep,
        pagination: PaginationStep,
    ) -> Self {
        Self {
            filters,
            sort,
            pagination,
        }
    }

    /// A pipeline that filters nothing, keeps key order and does not page.
    pub fn unfiltered() -> Self {
        Self::new(Vec::new(), SortStep::default(), PaginationStep::default())
    }

    /// Apply filters and sort, but not pagination, so the caller can still
    /// count all matches.
    pub fn apply_filters_and_sorting<Q: Queryable>(&self, query: Q) -> Q {
        let filtered = self
            .filters
            .iter()
            .fold(query, |q, step| q.apply(step.as_ref()));
        filtered.apply(&self.sort)
    }

    /// Apply skip/take alone.
    pub fn apply_pagination<Q: Queryable>(&self, query: Q) -> Q {
        query.apply(&self.pagination)
    }

    /// Limit a source to every row up to the end of the requested page.
    ///
    /// A source page K is not a slice of the merged page K; only the sorted
    /// prefix of each source is guaranteed to contain it.
    pub fn apply_prefix_pagination<Q: Queryable>(&self, query: Q) -> Q {
        query.apply(&PaginationStep::from_window(self.pagination.prefix()))
    }

    /// Re-apply sort and pagination to an already-merged collection.
    pub fn resort_and_repaginate(&self, mut games: Vec<Game>) -> Vec<Game> {
        sort_games(&mut games, self.sort.sort());
        self.pagination.window().slice(games)
    }

    pub fn sort(&self) -> Option<GameSort> {
        self.sort.sort()
    }

    pub fn window(&self) -> PageWindow {
        self.pagination.window()
    }

    pub fn filter_count(&self) -> usize {
        self.filters.len()
    }
}
