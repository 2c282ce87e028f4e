use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The payload the tracker sends to POST /api/collect.
/// Wire names are camelCase; "eventName" maps to event_type in storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CollectPayload {
    pub website_id: String,
    pub session_id: String,
    pub event_name: String,
    /// Page path at event time. The tracker fills in `location.pathname`;
    /// absent for non-page events.
    pub path: Option<String>,
    /// Referring URL. Absent and empty are equivalent: both store "".
    pub referrer: Option<String>,
}

/// The stored version of an event — mirrors the DuckDB `events` table columns.
///
/// Rows are append-only. `created_at` is stamped by the server at receipt;
/// a client-supplied timestamp is never accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub website_id: String,
    /// Opaque client-generated session identifier. Never empty once stored.
    pub session_id: String,
    /// "pageview" or a custom event name.
    pub event_type: String,
    pub pathname: String,
    /// Empty string means "no referrer". The column is NOT NULL so the
    /// sentinel is never confused with an absent value.
    pub referrer: String,
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// Build a storable event from a validated collect payload.
    ///
    /// The caller supplies the id and receipt timestamp so batches built in
    /// one request share a single `Utc::now()` observation.
    pub fn from_payload(payload: CollectPayload, id: String, received_at: DateTime<Utc>) -> Self {
        Self {
            id,
            website_id: payload.website_id,
            session_id: payload.session_id,
            event_type: payload.event_name,
            pathname: payload.path.unwrap_or_default(),
            referrer: payload.referrer.unwrap_or_default(),
            created_at: received_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes_camel_case() {
        let payload: CollectPayload = serde_json::from_str(
            r#"{"websiteId":"site_abc1234567","sessionId":"s1","eventName":"pageview",
                "path":"/docs","referrer":"https://example.com"}"#,
        )
        .unwrap();
        assert_eq!(payload.website_id, "site_abc1234567");
        assert_eq!(payload.event_name, "pageview");
    }

    #[test]
    fn missing_optionals_become_empty_strings() {
        let payload: CollectPayload = serde_json::from_str(
            r#"{"websiteId":"site_abc1234567","sessionId":"s1","eventName":"signup"}"#,
        )
        .unwrap();
        let event = Event::from_payload(payload, "e1".to_string(), Utc::now());
        assert_eq!(event.pathname, "");
        assert_eq!(event.referrer, "");
        assert_eq!(event.event_type, "signup");
    }
}
