//! Caller-identity plumbing.
//!
//! Token issuance, registration, and session management all live in the
//! external auth system. This module only validates the HS256 signature of
//! an inbound bearer token and hands the caller id to route handlers; the
//! analytics engine itself never authenticates anyone.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Caller id assigned by the external auth system.
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

/// Identity injected into request extensions after successful validation.
#[derive(Debug, Clone)]
pub struct CallerContext {
    pub caller_id: String,
}

/// Decode and validate a bearer token.
pub fn decode_token(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| anyhow!("decode_token: {}", e))?;

    Ok(data.claims)
}

/// Require a valid `Authorization: Bearer <token>` header on the request.
///
/// On success a [`CallerContext`] is inserted into request extensions for
/// downstream handlers; otherwise the request is rejected with 401.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    let Some(token) = token else {
        return AppError::Unauthorized.into_response();
    };

    match decode_token(token, &state.config.auth_secret) {
        Ok(claims) => {
            request.extensions_mut().insert(CallerContext {
                caller_id: claims.sub,
            });
            next.run(request).await
        }
        Err(e) => {
            tracing::warn!(error = %e, "Rejected bearer token");
            AppError::Unauthorized.into_response()
        }
    }
}
