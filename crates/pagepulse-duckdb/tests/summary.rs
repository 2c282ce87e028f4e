use chrono::{DateTime, TimeZone, Utc};

use pagepulse_core::analytics::{AnalyticsBackend, QueryRange};
use pagepulse_core::error::QueryError;
use pagepulse_core::event::Event;
use pagepulse_duckdb::DuckDbBackend;

fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, mi, s).single().expect("valid timestamp")
}

fn event(
    website_id: &str,
    session_id: &str,
    event_type: &str,
    pathname: &str,
    referrer: &str,
    created_at: DateTime<Utc>,
) -> Event {
    Event {
        id: uuid::Uuid::new_v4().to_string(),
        website_id: website_id.to_string(),
        session_id: session_id.to_string(),
        event_type: event_type.to_string(),
        pathname: pathname.to_string(),
        referrer: referrer.to_string(),
        created_at,
    }
}

fn pageview(
    website_id: &str,
    session_id: &str,
    pathname: &str,
    created_at: DateTime<Utc>,
) -> Event {
    event(website_id, session_id, "pageview", pathname, "", created_at)
}

async fn setup() -> DuckDbBackend {
    let db = DuckDbBackend::open_in_memory().expect("in-memory DuckDB");
    db.seed_website("site_test000001", "owner_1", "example.com")
        .await
        .expect("seed website");
    db
}

fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> QueryRange {
    QueryRange::new(start, end, None).expect("valid range")
}

// ============================================================
// The worked example from the contract.
// ============================================================

#[tokio::test]
async fn summary_worked_example() {
    let db = setup().await;
    db.insert_events(&[
        pageview("site_test000001", "s1", "/a", at(2024, 1, 1, 10, 0, 0)),
        pageview("site_test000001", "s2", "/a", at(2024, 1, 1, 11, 0, 0)),
        pageview("site_test000001", "s1", "/b", at(2024, 1, 2, 9, 0, 0)),
    ])
    .await
    .expect("insert");

    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 2, 23, 59, 59)),
        )
        .await
        .expect("summary");

    assert_eq!(result.total_views, 3);
    assert_eq!(result.unique_visitors, 2);
    assert_eq!(result.top_pages.len(), 2);
    assert_eq!(result.top_pages[0].page, "/a");
    assert_eq!(result.top_pages[0].views, 2);
    assert_eq!(result.top_pages[1].page, "/b");
    assert_eq!(result.top_pages[1].views, 1);
    assert_eq!(result.page_views_trend.len(), 2);
    assert_eq!(result.page_views_trend[0].date, "2024-01-01");
    assert_eq!(result.page_views_trend[0].views, 2);
    assert_eq!(result.page_views_trend[1].date, "2024-01-02");
    assert_eq!(result.page_views_trend[1].views, 1);
}

#[tokio::test]
async fn empty_summary_is_all_zeroes() {
    let db = setup().await;
    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 31, 0, 0, 0)),
        )
        .await
        .expect("summary");

    assert_eq!(result.total_views, 0);
    assert_eq!(result.unique_visitors, 0);
    assert!(result.top_pages.is_empty());
    assert!(result.top_referrers.is_empty());
    assert!(result.page_views_trend.is_empty());
}

// ============================================================
// Filtering: range bounds and event types.
// ============================================================

#[tokio::test]
async fn range_bounds_are_inclusive() {
    let db = setup().await;
    let start = at(2024, 3, 1, 0, 0, 0);
    let end = at(2024, 3, 2, 0, 0, 0);
    db.insert_events(&[
        pageview("site_test000001", "s1", "/exact-start", start),
        pageview("site_test000001", "s1", "/exact-end", end),
        pageview(
            "site_test000001",
            "s1",
            "/before",
            start - chrono::Duration::milliseconds(1),
        ),
        pageview(
            "site_test000001",
            "s1",
            "/after",
            end + chrono::Duration::milliseconds(1),
        ),
    ])
    .await
    .expect("insert");

    let result = db
        .summary("site_test000001", &range(start, end))
        .await
        .expect("summary");

    assert_eq!(result.total_views, 2);
    let pages: Vec<&str> = result.top_pages.iter().map(|p| p.page.as_str()).collect();
    assert!(pages.contains(&"/exact-start"));
    assert!(pages.contains(&"/exact-end"));
}

#[tokio::test]
async fn other_event_types_never_contribute() {
    let db = setup().await;
    db.insert_events(&[
        pageview("site_test000001", "s1", "/a", at(2024, 1, 1, 10, 0, 0)),
        event(
            "site_test000001",
            "s2",
            "signup",
            "/a",
            "",
            at(2024, 1, 1, 10, 5, 0),
        ),
    ])
    .await
    .expect("insert");

    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 1, 23, 0, 0)),
        )
        .await
        .expect("summary");

    assert_eq!(result.total_views, 1);
    assert_eq!(result.unique_visitors, 1);
}

#[tokio::test]
async fn summary_generalizes_to_custom_event_names() {
    let db = setup().await;
    db.insert_events(&[
        pageview("site_test000001", "s1", "/pricing", at(2024, 1, 1, 10, 0, 0)),
        event(
            "site_test000001",
            "s1",
            "signup",
            "/pricing",
            "",
            at(2024, 1, 1, 10, 5, 0),
        ),
        event(
            "site_test000001",
            "s2",
            "signup",
            "/pricing",
            "",
            at(2024, 1, 1, 11, 0, 0),
        ),
    ])
    .await
    .expect("insert");

    let signup_range = QueryRange::new(
        at(2024, 1, 1, 0, 0, 0),
        at(2024, 1, 1, 23, 0, 0),
        Some("signup"),
    )
    .expect("valid range");
    let result = db
        .summary("site_test000001", &signup_range)
        .await
        .expect("summary");

    assert_eq!(result.total_views, 2);
    assert_eq!(result.unique_visitors, 2);
    assert_eq!(result.top_pages[0].page, "/pricing");
}

#[tokio::test]
async fn events_are_scoped_per_website() {
    let db = setup().await;
    db.seed_website("site_test000002", "owner_2", "other.com")
        .await
        .expect("seed second website");
    db.insert_events(&[
        pageview("site_test000001", "s1", "/a", at(2024, 1, 1, 10, 0, 0)),
        pageview("site_test000002", "s1", "/a", at(2024, 1, 1, 10, 0, 0)),
    ])
    .await
    .expect("insert");

    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 1, 23, 0, 0)),
        )
        .await
        .expect("summary");

    assert_eq!(result.total_views, 1);
}

// ============================================================
// Rankings: referrer sentinel, limits, tie-breaks.
// ============================================================

#[tokio::test]
async fn empty_referrer_counts_toward_totals_but_not_ranking() {
    let db = setup().await;
    db.insert_events(&[
        event(
            "site_test000001",
            "s1",
            "pageview",
            "/a",
            "https://news.ycombinator.com/",
            at(2024, 1, 1, 10, 0, 0),
        ),
        pageview("site_test000001", "s1", "/a", at(2024, 1, 1, 10, 1, 0)),
        pageview("site_test000001", "s2", "/b", at(2024, 1, 1, 10, 2, 0)),
    ])
    .await
    .expect("insert");

    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 1, 23, 0, 0)),
        )
        .await
        .expect("summary");

    assert_eq!(result.total_views, 3);
    assert_eq!(result.top_referrers.len(), 1);
    assert_eq!(result.top_referrers[0].referrer, "https://news.ycombinator.com/");
    assert_eq!(result.top_referrers[0].views, 1);
}

#[tokio::test]
async fn rankings_cap_at_ten_rows_sorted_descending() {
    let db = setup().await;
    // 12 distinct pages: /p00 seen 12 times, /p01 11 times, ... /p11 once.
    let mut events = Vec::new();
    for page in 0..12 {
        for copy in 0..(12 - page) {
            events.push(pageview(
                "site_test000001",
                &format!("s{copy}"),
                &format!("/p{page:02}"),
                at(2024, 1, 1, 8, 0, 0) + chrono::Duration::seconds((page * 20 + copy) as i64),
            ));
        }
    }
    db.insert_events(&events).await.expect("insert");

    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 1, 23, 0, 0)),
        )
        .await
        .expect("summary");

    assert_eq!(result.top_pages.len(), 10);
    assert_eq!(result.top_pages[0].page, "/p00");
    assert_eq!(result.top_pages[0].views, 12);
    for pair in result.top_pages.windows(2) {
        assert!(pair[0].views >= pair[1].views, "rows must sort by count desc");
    }
    let ranked_sum: i64 = result.top_pages.iter().map(|p| p.views).sum();
    assert!(ranked_sum <= result.total_views);
}

#[tokio::test]
async fn tied_counts_break_deterministically() {
    let db = setup().await;
    db.insert_events(&[
        pageview("site_test000001", "s1", "/zebra", at(2024, 1, 1, 10, 0, 0)),
        pageview("site_test000001", "s1", "/alpha", at(2024, 1, 1, 10, 1, 0)),
    ])
    .await
    .expect("insert");

    let query_range = range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 1, 23, 0, 0));
    let first = db
        .summary("site_test000001", &query_range)
        .await
        .expect("summary");

    // Both pages have one view; the tie must break the same way every time.
    assert_eq!(first.top_pages[0].page, "/alpha");
    assert_eq!(first.top_pages[1].page, "/zebra");

    let second = db
        .summary("site_test000001", &query_range)
        .await
        .expect("summary");
    assert_eq!(first.top_pages, second.top_pages);
}

// ============================================================
// Trend and cross-statistic properties.
// ============================================================

#[tokio::test]
async fn trend_is_sparse_ascending_and_sums_to_total() {
    let db = setup().await;
    // Events on Jan 1 and Jan 5; Jan 2–4 have no events and must be absent.
    db.insert_events(&[
        pageview("site_test000001", "s1", "/a", at(2024, 1, 1, 10, 0, 0)),
        pageview("site_test000001", "s2", "/a", at(2024, 1, 1, 18, 0, 0)),
        pageview("site_test000001", "s1", "/b", at(2024, 1, 5, 9, 0, 0)),
    ])
    .await
    .expect("insert");

    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 7, 0, 0, 0)),
        )
        .await
        .expect("summary");

    let dates: Vec<&str> = result
        .page_views_trend
        .iter()
        .map(|p| p.date.as_str())
        .collect();
    assert_eq!(dates, vec!["2024-01-01", "2024-01-05"]);

    let trend_sum: i64 = result.page_views_trend.iter().map(|p| p.views).sum();
    assert_eq!(trend_sum, result.total_views);

    for pair in result.page_views_trend.windows(2) {
        assert!(pair[0].date < pair[1].date, "dates must strictly ascend");
    }
}

#[tokio::test]
async fn unique_visitors_never_exceed_total_views() {
    let db = setup().await;
    db.insert_events(&[
        pageview("site_test000001", "s1", "/a", at(2024, 1, 1, 10, 0, 0)),
        pageview("site_test000001", "s1", "/b", at(2024, 1, 1, 10, 1, 0)),
        pageview("site_test000001", "s2", "/a", at(2024, 1, 1, 10, 2, 0)),
    ])
    .await
    .expect("insert");

    let result = db
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 1, 23, 0, 0)),
        )
        .await
        .expect("summary");

    assert_eq!(result.unique_visitors, 2);
    assert!(result.unique_visitors <= result.total_views);
}

#[tokio::test]
async fn repeated_query_with_no_writes_is_identical() {
    let db = setup().await;
    db.insert_events(&[
        pageview("site_test000001", "s1", "/a", at(2024, 1, 1, 10, 0, 0)),
        pageview("site_test000001", "s2", "/b", at(2024, 1, 2, 10, 0, 0)),
    ])
    .await
    .expect("insert");

    let query_range = range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 3, 0, 0, 0));
    let first = db
        .summary("site_test000001", &query_range)
        .await
        .expect("first summary");
    let second = db
        .summary("site_test000001", &query_range)
        .await
        .expect("second summary");

    assert_eq!(first.total_views, second.total_views);
    assert_eq!(first.unique_visitors, second.unique_visitors);
    assert_eq!(first.top_pages, second.top_pages);
    assert_eq!(first.top_referrers, second.top_referrers);
    assert_eq!(first.page_views_trend, second.page_views_trend);
}

// ============================================================
// Range validation and trait dispatch.
// ============================================================

#[tokio::test]
async fn inverted_range_is_rejected_before_storage() {
    let result = QueryRange::new(at(2024, 1, 2, 0, 0, 0), at(2024, 1, 1, 0, 0, 0), None);
    assert!(matches!(result, Err(QueryError::InvalidRange { .. })));
}

#[tokio::test]
async fn summary_via_dyn_backend() {
    let db = std::sync::Arc::new(setup().await);
    let backend: std::sync::Arc<dyn AnalyticsBackend> = db.clone();

    backend
        .insert_events(&[pageview(
            "site_test000001",
            "s1",
            "/a",
            at(2024, 1, 1, 10, 0, 0),
        )])
        .await
        .expect("insert via trait");

    let result = backend
        .summary(
            "site_test000001",
            &range(at(2024, 1, 1, 0, 0, 0), at(2024, 1, 1, 23, 0, 0)),
        )
        .await
        .expect("summary via trait");
    assert_eq!(result.total_views, 1);
}
