use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use pagepulse_core::website::AccessGuard;
use pagepulse_duckdb::website::CreateWebsiteParams;

use crate::{auth::CallerContext, error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct CreateWebsiteRequest {
    pub name: String,
    pub domain: String,
}

/// `POST /api/websites` — register a website owned by the caller.
pub async fn create_website(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Json(req): Json<CreateWebsiteRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.name.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    if req.domain.is_empty() {
        return Err(AppError::BadRequest("domain is required".to_string()));
    }

    let website = state
        .db
        .create_website(
            &caller.caller_id,
            CreateWebsiteParams {
                name: req.name,
                domain: req.domain,
            },
        )
        .await
        .map_err(AppError::Internal)?;

    // New sites are valid collect targets immediately.
    {
        let mut cache = state.website_cache.write().await;
        cache.insert(website.id.clone());
    }

    let tracking_snippet = format!(
        r#"<script defer src="/tracker.js" data-website-id="{}"></script>"#,
        website.id
    );

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "data": {
                "id": website.id,
                "name": website.name,
                "domain": website.domain,
                "tracking_snippet": tracking_snippet,
                "created_at": website.created_at,
            }
        })),
    ))
}

/// `GET /api/websites` — list the caller's websites.
pub async fn list_websites(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
) -> Result<impl IntoResponse, AppError> {
    let websites = state
        .db
        .list_websites(&caller.caller_id)
        .await
        .map_err(AppError::Internal)?;

    Ok(Json(json!({ "data": websites })))
}

/// `GET /api/websites/:id` — fetch one website the caller owns.
pub async fn get_website(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<CallerContext>,
    Path(website_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let website = state
        .db
        .resolve_owned_website(&caller.caller_id, &website_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::NotFound("Website not found".to_string()))?;

    Ok(Json(json!({ "data": website })))
}
