use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use pagepulse_core::analytics::QueryRange;
use pagepulse_core::error::QueryError;
use pagepulse_core::website::AccessGuard;

use crate::{auth::CallerContext, error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsQuery {
    pub website_id: String,
    /// Inclusive ISO-8601 range bounds.
    pub start: String,
    pub end: String,
    /// Event type to aggregate; defaults to "pageview".
    pub event: Option<String>,
}

/// `GET /api/analytics` — the five summary statistics for one website.
///
/// Ownership is resolved before the engine runs; a website that does not
/// exist and a website owned by someone else both come back as 404.
#[tracing::instrument(skip(state, caller, query))]
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let start = parse_timestamp(&query.start, "start")?;
    let end = parse_timestamp(&query.end, "end")?;

    // An inverted range is rejected before any storage access.
    let range = QueryRange::new(start, end, query.event.as_deref())?;

    let website = state
        .db
        .resolve_owned_website(&caller.caller_id, &query.website_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(QueryError::WebsiteNotFound)?;

    let result = state.db.summary(&website.id, &range).await?;

    Ok(Json(result))
}

fn parse_timestamp(raw: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| AppError::BadRequest(format!("{field} must be an ISO-8601 timestamp")))
}
