use std::sync::Arc;

use axum::{
    http::HeaderValue,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{auth, routes, state::AppState};

/// Construct the Axum [`Router`] with all routes and middleware attached.
///
/// Middleware is applied in outer-to-inner order (outermost runs first on
/// request, last on response):
///
/// 1. `TraceLayer` — structured request/response logging via `tracing`.
/// 2. `CorsLayer` — the tracker script is embedded on third-party sites, so
///    browsers need CORS headers on the collect endpoint. Permissive unless
///    `PAGEPULSE_CORS_ORIGINS` narrows it.
///
/// Dashboard routes (analytics, websites) sit behind the bearer-token
/// middleware; collect, the tracker script, and health stay open.
pub fn build_app(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/api/analytics", get(routes::analytics::get_analytics))
        .route(
            "/api/websites",
            post(routes::websites::create_website).get(routes::websites::list_websites),
        )
        .route("/api/websites/{id}", get(routes::websites::get_website))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            auth::require_auth,
        ));

    Router::new()
        .route("/health", get(routes::health::health))
        .route("/tracker.js", get(routes::tracker::tracker))
        .route("/api/collect", post(routes::collect::collect))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(parsed))
        .allow_methods(Any)
        .allow_headers(Any)
}
