/// DuckDB initialization SQL.
///
/// Executed once at database open time via `Connection::execute_batch`.
/// All statements use `IF NOT EXISTS` so they are safe to re-run on every
/// startup (idempotent).
///
/// `memory_limit` is passed at runtime from `Config.duckdb_memory_limit`
/// (env `PAGEPULSE_DUCKDB_MEMORY`, default `"1GB"`). DuckDB accepts any
/// size string it supports — e.g. `"512MB"`, `"1GB"`, `"4GB"`. The DuckDB
/// default (80% of system RAM) is not acceptable for a server process, so
/// an explicit limit is always set. `SET threads = 2` bounds the background
/// thread pool for single-writer embedded use.
pub fn init_sql(memory_limit: &str) -> String {
    format!(
        r#"SET memory_limit = '{memory_limit}';
SET threads = 2;

-- ===========================================
-- WEBSITES
-- ===========================================
CREATE TABLE IF NOT EXISTS websites (
    id              VARCHAR PRIMARY KEY,           -- 'site_' + 10 base-36 chars
    owner_id        VARCHAR NOT NULL,              -- opaque caller id from the external auth system
    name            VARCHAR NOT NULL,
    domain          VARCHAR NOT NULL,
    created_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
    updated_at      TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_websites_owner ON websites(owner_id);

-- ===========================================
-- EVENTS (append-only; never updated or deleted by the engine)
-- ===========================================
CREATE TABLE IF NOT EXISTS events (
    id              VARCHAR NOT NULL,              -- UUID v4
    website_id      VARCHAR NOT NULL,
    session_id      VARCHAR NOT NULL,              -- client-generated, never empty
    event_type      VARCHAR NOT NULL,              -- 'pageview' | custom event name
    pathname        VARCHAR NOT NULL DEFAULT '',
    referrer        VARCHAR NOT NULL DEFAULT '',   -- '' = no referrer (NOT NULL sentinel)
    created_at      TIMESTAMP NOT NULL             -- stamped at server receipt
);
-- Every summary statistic filters on (website_id, event_type, created_at).
CREATE INDEX IF NOT EXISTS idx_events_scan
    ON events(website_id, event_type, created_at);
"#
    )
}

/// Schema-version bookkeeping, created before [`init_sql`] runs.
pub const MIGRATIONS_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version     INTEGER PRIMARY KEY,
    applied_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
);
INSERT OR IGNORE INTO schema_migrations (version) VALUES (1);
"#;
