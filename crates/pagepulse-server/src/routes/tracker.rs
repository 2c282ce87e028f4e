use axum::{http::header, response::IntoResponse};

/// The embedded client tracker, served as-is.
const TRACKER_JS: &str = include_str!("../../assets/tracker.js");

/// `GET /tracker.js` — the script site owners embed via
/// `<script defer src=".../tracker.js" data-website-id="site_...">`.
pub async fn tracker() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            // The script is immutable per release; let browsers cache it.
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        TRACKER_JS,
    )
}
