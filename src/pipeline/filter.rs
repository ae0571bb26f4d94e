//! Game filter request and its token parsing.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Months, Utc};
use uuid::Uuid;

/// Errors parsing filter request tokens.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("Invalid page size: {0:?}")]
    InvalidPageSize(String),

    #[error("Unknown sort option: {0:?}")]
    UnknownSort(String),

    #[error("Unknown publishing window: {0:?}")]
    UnknownPublishingWindow(String),
}

/// Requested ordering of the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameSort {
    MostPopular,
    MostCommented,
    PriceAsc,
    PriceDesc,
    New,
}

impl GameSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameSort::MostPopular => "Most popular",
            GameSort::MostCommented => "Most commented",
            GameSort::PriceAsc => "Price ASC",
            GameSort::PriceDesc => "Price DESC",
            GameSort::New => "New",
        }
    }
}

impl fmt::Display for GameSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameSort {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "most popular" => Ok(GameSort::MostPopular),
            "most commented" => Ok(GameSort::MostCommented),
            "price asc" => Ok(GameSort::PriceAsc),
            "price desc" => Ok(GameSort::PriceDesc),
            "new" => Ok(GameSort::New),
            _ => Err(FilterError::UnknownSort(s.to_string())),
        }
    }
}

/// Named recency window for the publishing-date filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishingWindow {
    LastWeek,
    LastMonth,
    LastYear,
    TwoYears,
    ThreeYears,
}

impl PublishingWindow {
    /// Inclusive lower bound of the window ending at `now`.
    pub fn since(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let bound = match self {
            PublishingWindow::LastWeek => now.checked_sub_days(Days::new(7)),
            PublishingWindow::LastMonth => now.checked_sub_months(Months::new(1)),
            PublishingWindow::LastYear => now.checked_sub_months(Months::new(12)),
            PublishingWindow::TwoYears => now.checked_sub_months(Months::new(24)),
            PublishingWindow::ThreeYears => now.checked_sub_months(Months::new(36)),
        };
        bound.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

impl FromStr for PublishingWindow {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last week" => Ok(PublishingWindow::LastWeek),
            "last month" => Ok(PublishingWindow::LastMonth),
            "last year" => Ok(PublishingWindow::LastYear),
            "2 years" => Ok(PublishingWindow::TwoYears),
            "3 years" => Ok(PublishingWindow::ThreeYears),
            _ => Err(FilterError::UnknownPublishingWindow(s.to_string())),
        }
    }
}

/// Number of games per page.
///
/// The `"all"` and empty tokens map to [`PageSize::All`]: no truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSize {
    Limited(u32),
    All,
}

impl PageSize {
    pub const DEFAULT: PageSize = PageSize::Limited(10);

    pub fn limit(&self) -> Option<u32> {
        match self {
            PageSize::Limited(n) => Some(*n),
            PageSize::All => None,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl FromStr for PageSize {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() || token.eq_ignore_ascii_case("all") {
            return Ok(PageSize::All);
        }
        match token.parse::<u32>() {
            Ok(n) if n > 0 => Ok(PageSize::Limited(n)),
            _ => Err(FilterError::InvalidPageSize(s.to_string())),
        }
    }
}

/// Catalog filter request. Absent or empty fields do not filter.
#[derive(Debug, Clone, PartialEq)]
pub struct GameFilter {
    pub name: Option<String>,
    pub genres: Vec<Uuid>,
    pub platforms: Vec<Uuid>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub publisher: Option<Uuid>,
    pub published_within: Option<PublishingWindow>,
    pub sort: Option<GameSort>,
    /// One-based page number; zero is treated as the first page.
    pub page: u32,
    pub page_size: PageSize,
}

impl Default for GameFilter {
    fn default() -> Self {
        Self {
            name: None,
            genres: Vec::new(),
            platforms: Vec::new(),
            min_price: None,
            max_price: None,
            publisher: None,
            published_within: None,
            sort: None,
            page: 1,
            page_size: PageSize::DEFAULT,
        }
    }
}

impl GameFilter {
    pub fn with_page(mut self, page: u32, page_size: PageSize) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn with_sort(mut self, sort: GameSort) -> Self {
        self.sort = Some(sort);
        self
    }
}
