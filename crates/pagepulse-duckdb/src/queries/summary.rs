//! The aggregation query engine.
//!
//! All five summary statistics are computed over the same filtered base set
//! (website, event type, inclusive created_at range). The totals pair is one
//! row; the three row-producing statistics share a single generic
//! grouped-count routine so tie-break and limit behavior cannot drift
//! between them. Every statement runs under one connection acquisition.

use anyhow::Result;
use chrono::{DateTime, Utc};

use pagepulse_core::analytics::{
    PageCount, QueryRange, ReferrerCount, SummaryResult, TrendPoint, TOP_LIMIT,
};
use pagepulse_core::error::QueryError;

use crate::DuckDbBackend;

/// Row ordering for a grouped-count query.
#[derive(Debug, Clone, Copy)]
enum GroupOrder {
    /// Count descending, group value ascending as the deterministic
    /// tie-break (top pages, top referrers).
    CountDesc,
    /// Group value ascending (the date trend).
    ValueAsc,
}

/// One "group and count" aggregation over the filtered base set,
/// parameterized by the grouping expression.
#[derive(Debug, Clone, Copy)]
struct GroupSpec {
    /// SQL expression producing the group value for each event row.
    column_expr: &'static str,
    /// Skip events whose group value is the empty string (the no-referrer
    /// sentinel).
    exclude_empty: bool,
    order: GroupOrder,
    limit: Option<usize>,
}

/// Format a bound for DuckDB's VARCHAR → TIMESTAMP comparison cast.
fn ts(bound: DateTime<Utc>) -> String {
    bound.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

fn grouped_counts(
    conn: &duckdb::Connection,
    website_id: &str,
    range: &QueryRange,
    spec: GroupSpec,
) -> Result<Vec<(String, i64)>> {
    let GroupSpec {
        column_expr,
        exclude_empty,
        order,
        limit,
    } = spec;

    let empty_clause = if exclude_empty {
        format!(" AND {column_expr} <> ''")
    } else {
        String::new()
    };
    let order_clause = match order {
        GroupOrder::CountDesc => "views DESC, dim_value ASC",
        GroupOrder::ValueAsc => "dim_value ASC",
    };
    let limit_clause = limit
        .map(|n| format!(" LIMIT {n}"))
        .unwrap_or_default();

    let sql = format!(
        "SELECT {column_expr} AS dim_value, COUNT(*) AS views \
         FROM events \
         WHERE website_id = ?1 AND event_type = ?2 \
           AND created_at >= ?3 AND created_at <= ?4{empty_clause} \
         GROUP BY dim_value \
         ORDER BY {order_clause}{limit_clause}"
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        duckdb::params![
            website_id,
            range.event_type(),
            ts(range.start()),
            ts(range.end()),
        ],
        |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)),
    )?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn totals(
    conn: &duckdb::Connection,
    website_id: &str,
    range: &QueryRange,
) -> Result<(i64, i64)> {
    let mut stmt = conn.prepare(
        "SELECT COUNT(*), COUNT(DISTINCT session_id) \
         FROM events \
         WHERE website_id = ?1 AND event_type = ?2 \
           AND created_at >= ?3 AND created_at <= ?4",
    )?;
    let row = stmt.query_row(
        duckdb::params![
            website_id,
            range.event_type(),
            ts(range.start()),
            ts(range.end()),
        ],
        |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
    )?;
    Ok(row)
}

pub(crate) async fn summary_inner(
    db: &DuckDbBackend,
    website_id: &str,
    range: &QueryRange,
) -> Result<SummaryResult, QueryError> {
    let conn = db.conn.lock().await;

    let run = || -> Result<SummaryResult> {
        let (total_views, unique_visitors) = totals(&conn, website_id, range)?;

        let top_pages = grouped_counts(
            &conn,
            website_id,
            range,
            GroupSpec {
                column_expr: "pathname",
                exclude_empty: false,
                order: GroupOrder::CountDesc,
                limit: Some(TOP_LIMIT),
            },
        )?
        .into_iter()
        .map(|(page, views)| PageCount { page, views })
        .collect();

        // Events with an empty referrer count toward totals but are
        // excluded from this ranking entirely.
        let top_referrers = grouped_counts(
            &conn,
            website_id,
            range,
            GroupSpec {
                column_expr: "referrer",
                exclude_empty: true,
                order: GroupOrder::CountDesc,
                limit: Some(TOP_LIMIT),
            },
        )?
        .into_iter()
        .map(|(referrer, views)| ReferrerCount { referrer, views })
        .collect();

        // Sparse by contract: dates with zero events are omitted, never
        // zero-filled; callers needing a dense series fill gaps themselves.
        let page_views_trend = grouped_counts(
            &conn,
            website_id,
            range,
            GroupSpec {
                column_expr: "strftime(created_at, '%Y-%m-%d')",
                exclude_empty: false,
                order: GroupOrder::ValueAsc,
                limit: None,
            },
        )?
        .into_iter()
        .map(|(date, views)| TrendPoint { date, views })
        .collect();

        Ok(SummaryResult {
            total_views,
            unique_visitors,
            top_pages,
            top_referrers,
            page_views_trend,
        })
    };

    run().map_err(QueryError::StorageUnavailable)
}

impl DuckDbBackend {
    /// Compute the five summary statistics for one website over `range`.
    pub async fn summary(
        &self,
        website_id: &str,
        range: &QueryRange,
    ) -> Result<SummaryResult, QueryError> {
        summary_inner(self, website_id, range).await
    }
}
