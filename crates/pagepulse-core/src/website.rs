use serde::Serialize;

/// A tracked website. `owner_id` is the opaque caller id issued by the
/// external auth system — this repo stores it and compares it, nothing more.
#[derive(Debug, Clone, Serialize)]
pub struct Website {
    pub id: String,
    #[serde(skip_serializing)]
    pub owner_id: String,
    pub name: String,
    pub domain: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Ownership check run before the aggregation engine.
///
/// Returns `None` both when the website does not exist and when the caller
/// is not its owner; callers surface either as "not found".
#[async_trait::async_trait]
pub trait AccessGuard: Send + Sync + 'static {
    async fn resolve_owned_website(
        &self,
        caller_id: &str,
        website_id: &str,
    ) -> anyhow::Result<Option<Website>>;
}
