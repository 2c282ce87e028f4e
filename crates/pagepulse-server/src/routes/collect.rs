use std::sync::Arc;

use axum::{body::Bytes, extract::State, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;

use pagepulse_core::event::{CollectPayload, Event};

use crate::{error::AppError, state::AppState};

/// `POST /api/collect` — ingest a single event.
///
/// No auth: the tracker runs on third-party pages and posts here via
/// `navigator.sendBeacon`. The caller treats the request as
/// fire-and-forget; a validation failure is logged server-side and never
/// breaks the tracked page.
///
/// The body is parsed from raw bytes rather than through the `Json`
/// extractor: `sendBeacon` delivers string payloads as `text/plain`, and
/// whatever bytes arrive get processed regardless of content type.
///
/// `created_at` is stamped at receipt — a client-supplied timestamp is
/// never trusted. Accepted events go to the in-memory buffer; the
/// background flush task persists them.
///
/// ## Response
/// `202 Accepted` with `{ "ok": true }`.
#[tracing::instrument(skip(state, body))]
pub async fn collect(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, AppError> {
    let payload: CollectPayload = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "Rejected malformed collect payload");
        AppError::BadRequest(format!("invalid event payload: {e}"))
    })?;

    if !is_site_id_shape(&payload.website_id) {
        tracing::warn!(website_id = %payload.website_id, "Rejected event: bad websiteId shape");
        return Err(AppError::BadRequest(format!(
            "websiteId has invalid shape: {}",
            payload.website_id
        )));
    }
    if payload.session_id.is_empty() {
        tracing::warn!(website_id = %payload.website_id, "Rejected event: empty sessionId");
        return Err(AppError::BadRequest("sessionId must not be empty".to_string()));
    }
    if payload.event_name.is_empty() {
        tracing::warn!(website_id = %payload.website_id, "Rejected event: empty eventName");
        return Err(AppError::BadRequest("eventName must not be empty".to_string()));
    }

    if !state.is_valid_website(&payload.website_id).await {
        return Err(AppError::NotFound(format!(
            "Unknown websiteId: {}",
            payload.website_id
        )));
    }

    let event = Event::from_payload(payload, uuid::Uuid::new_v4().to_string(), Utc::now());
    state.push_events(vec![event]).await;

    Ok((
        axum::http::StatusCode::ACCEPTED,
        Json(json!({ "ok": true })),
    ))
}

/// Website ids are "site_" followed by exactly 10 base-36 characters.
///
/// Checked before the existence lookup so garbage ids never hit the cache
/// or the database.
fn is_site_id_shape(id: &str) -> bool {
    match id.strip_prefix("site_") {
        Some(rest) => {
            rest.len() == 10
                && rest
                    .chars()
                    .all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
        }
        None => false,
    }
}
