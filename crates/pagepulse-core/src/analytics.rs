//! Analytics backend abstraction and query/result types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::QueryError;
use crate::event::Event;

/// The event type the summary covers when the caller does not name one.
pub const DEFAULT_EVENT_TYPE: &str = "pageview";

/// Maximum rows returned for the top-pages and top-referrers rankings.
pub const TOP_LIMIT: usize = 10;

/// A validated inclusive time range plus the event type to aggregate.
///
/// Constructing through [`QueryRange::new`] is the only way to get one, so
/// every range the engine sees already satisfies `start <= end` — the
/// invalid-range rejection happens before any storage access.
#[derive(Debug, Clone)]
pub struct QueryRange {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    event_type: String,
}

impl QueryRange {
    pub fn new(
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        event_type: Option<&str>,
    ) -> Result<Self, QueryError> {
        if start > end {
            return Err(QueryError::InvalidRange { start, end });
        }
        Ok(Self {
            start,
            end,
            event_type: event_type.unwrap_or(DEFAULT_EVENT_TYPE).to_string(),
        })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageCount {
    pub page: String,
    pub views: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferrerCount {
    pub referrer: String,
    pub views: i64,
}

/// One calendar date (UTC, `YYYY-MM-DD`) with its event count. Dates with
/// zero events are omitted from the trend, not zero-filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub date: String,
    pub views: i64,
}

/// The five summary statistics for one website over one time range.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryResult {
    pub total_views: i64,
    pub unique_visitors: i64,
    pub top_pages: Vec<PageCount>,
    pub top_referrers: Vec<ReferrerCount>,
    pub page_views_trend: Vec<TrendPoint>,
}

/// Storage seam for event ingestion and aggregation.
///
/// Writes are independent appends with no cross-event ordering; reads never
/// require a consistent snapshot and may observe a mix of before/after
/// states of concurrently committed writes.
#[async_trait::async_trait]
pub trait AnalyticsBackend: Send + Sync + 'static {
    async fn insert_events(&self, events: &[Event]) -> anyhow::Result<()>;

    /// Compute the five summary statistics over events matching
    /// `website_id`, the range's event type, and `created_at` within the
    /// inclusive bounds. Ownership of the website is the caller's concern
    /// (see [`crate::website::AccessGuard`]); the engine only aggregates.
    async fn summary(
        &self,
        website_id: &str,
        range: &QueryRange,
    ) -> Result<SummaryResult, QueryError>;
}
