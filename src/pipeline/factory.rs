//! Pipeline construction from a filter request.

use chrono::{DateTime, Utc};

use super::filter::GameFilter;
use super::steps::{
    ExcludeDeletedStep, GenreFilterStep, NameFilterStep, PaginationStep, PipelineStep,
    PlatformFilterStep, PriceRangeStep, PublisherFilterStep, PublishingDateStep, SortStep,
};
use super::GamePipeline;

/// Builds request-scoped pipelines.
pub trait PipelineFactory: Send + Sync {
    /// `include_deleted` is the caller's permission to see soft-deleted games.
    fn create(&self, filter: &GameFilter, include_deleted: bool) -> GamePipeline;
}

/// Factory assembling the standard step order: exclude-deleted, the
/// optional filters in request order, then sort, then pagination.
#[derive(Debug, Clone, Default)]
pub struct DefaultPipelineFactory {
    /// Fixed clock for publishing windows; wall clock when unset.
    now: Option<DateTime<Utc>>,
}

impl DefaultPipelineFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Factory whose publishing windows are computed from `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now: Some(now) }
    }
}

impl PipelineFactory for DefaultPipelineFactory {
    fn create(&self, filter: &GameFilter, include_deleted: bool) -> GamePipeline {
        let now = self.now.unwrap_or_else(Utc::now);

        let mut filters: Vec<Box<dyn PipelineStep>> = Vec::new();
        if !include_deleted {
            filters.push(Box::new(ExcludeDeletedStep));
        }
        filters.push(Box::new(NameFilterStep::new(filter.name.clone())));
        filters.push(Box::new(GenreFilterStep::new(filter.genres.clone())));
        filters.push(Box::new(PlatformFilterStep::new(filter.platforms.clone())));
        filters.push(Box::new(PriceRangeStep::new(filter.min_price, filter.max_price)));
        filters.push(Box::new(PublisherFilterStep::new(filter.publisher)));
        filters.push(Box::new(PublishingDateStep::new(
            filter.published_within.map(|w| w.since(now)),
        )));

        GamePipeline::new(
            filters,
            SortStep::new(filter.sort),
            PaginationStep::new(filter.page, filter.page_size.limit()),
        )
    }
}
