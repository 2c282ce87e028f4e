use chrono::{DateTime, Utc};
use thiserror::Error;

/// Failure modes of the aggregation query engine.
#[derive(Debug, Error)]
pub enum QueryError {
    /// `start > end`. Raised before any storage access.
    #[error("invalid range: start {start} is after end {end}")]
    InvalidRange {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    /// The website id does not exist, or the caller does not own it. The
    /// two cases are never distinguished, so non-owners cannot probe for
    /// existence.
    #[error("website not found")]
    WebsiteNotFound,

    /// The underlying store is unreachable. Fatal for the request; the
    /// engine itself never retries.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(anyhow::Error),
}
