//! [`AnalyticsBackend`] implementation for [`DuckDbBackend`].

use pagepulse_core::analytics::{AnalyticsBackend, QueryRange, SummaryResult};
use pagepulse_core::error::QueryError;
use pagepulse_core::event::Event;

use crate::DuckDbBackend;

#[async_trait::async_trait]
impl AnalyticsBackend for DuckDbBackend {
    async fn insert_events(&self, events: &[Event]) -> anyhow::Result<()> {
        DuckDbBackend::insert_events(self, events).await
    }

    async fn summary(
        &self,
        website_id: &str,
        range: &QueryRange,
    ) -> Result<SummaryResult, QueryError> {
        DuckDbBackend::summary(self, website_id, range).await
    }
}
