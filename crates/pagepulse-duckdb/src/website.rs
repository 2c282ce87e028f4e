use anyhow::Result;

use pagepulse_core::website::{AccessGuard, Website};

use crate::DuckDbBackend;

pub struct CreateWebsiteParams {
    pub name: String,
    pub domain: String,
}

/// Generate a website ID: "site_" + 10 random base-36 chars.
fn generate_website_id() -> String {
    use rand::Rng;
    let mut rng = rand::thread_rng();
    let chars: String = (0..10)
        .map(|_| {
            let idx = rng.gen_range(0..36);
            if idx < 10 {
                (b'0' + idx) as char
            } else {
                (b'a' + idx - 10) as char
            }
        })
        .collect();
    format!("site_{}", chars)
}

const WEBSITE_COLUMNS: &str = "id, owner_id, name, domain, \
     CAST(created_at AS VARCHAR), CAST(updated_at AS VARCHAR)";

fn row_to_website(row: &duckdb::Row<'_>) -> duckdb::Result<Website> {
    Ok(Website {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        domain: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
    })
}

impl DuckDbBackend {
    /// Create a website owned by `owner_id`.
    pub async fn create_website(
        &self,
        owner_id: &str,
        params: CreateWebsiteParams,
    ) -> Result<Website> {
        let conn = self.conn.lock().await;
        let id = generate_website_id();

        conn.execute(
            "INSERT INTO websites (id, owner_id, name, domain, created_at, updated_at) \
             VALUES (?1, ?2, ?3, ?4, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)",
            duckdb::params![id, owner_id, params.name, params.domain],
        )?;

        // Read back the created row to get timestamps.
        let mut stmt = conn.prepare(&format!(
            "SELECT {WEBSITE_COLUMNS} FROM websites WHERE id = ?1"
        ))?;
        let website = stmt.query_row(duckdb::params![id], row_to_website)?;

        Ok(website)
    }

    /// List the websites owned by `owner_id`, ordered by id.
    pub async fn list_websites(&self, owner_id: &str) -> Result<Vec<Website>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WEBSITE_COLUMNS} FROM websites WHERE owner_id = ?1 ORDER BY id"
        ))?;
        let rows = stmt.query_map(duckdb::params![owner_id], row_to_website)?;

        let mut websites = Vec::new();
        for row in rows {
            websites.push(row?);
        }
        Ok(websites)
    }

    /// Fetch a website only if `owner_id` owns it.
    ///
    /// "Does not exist" and "not the owner" are indistinguishable in the
    /// result, so a non-owner cannot probe for a site's existence.
    pub async fn get_owned_website(
        &self,
        owner_id: &str,
        website_id: &str,
    ) -> Result<Option<Website>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(&format!(
            "SELECT {WEBSITE_COLUMNS} FROM websites WHERE id = ?1 AND owner_id = ?2"
        ))?;
        let mut rows = stmt.query_map(duckdb::params![website_id, owner_id], row_to_website)?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Insert or replace a website row with a fixed id.
    ///
    /// Intended for test fixtures and first-run seeding; safe to call
    /// repeatedly with the same `id`.
    pub async fn seed_website(&self, id: &str, owner_id: &str, domain: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            r#"INSERT INTO websites (id, owner_id, name, domain, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?3, CURRENT_TIMESTAMP, CURRENT_TIMESTAMP)
               ON CONFLICT (id) DO UPDATE SET owner_id = EXCLUDED.owner_id, domain = EXCLUDED.domain"#,
            duckdb::params![id, owner_id, domain],
        )?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl AccessGuard for DuckDbBackend {
    async fn resolve_owned_website(
        &self,
        caller_id: &str,
        website_id: &str,
    ) -> Result<Option<Website>> {
        self.get_owned_website(caller_id, website_id).await
    }
}
