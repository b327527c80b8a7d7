use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// A tracked event as it travels through the ingest queue.
///
/// Identity is the `(tenant_id, event_id)` pair; the ingest service
/// deduplicates on it before the message is ever enqueued. Messages are
/// never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventMessage {
    pub event_id: String,
    pub tenant_id: TenantId,
    pub event_name: String,
    /// Opaque event payload, stored as-is and serialized to a JSON string
    /// column in the columnar output.
    pub properties: serde_json::Value,
    pub event_time: DateTime<Utc>,
    pub received_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_message_json_round_trip() {
        let msg = EventMessage {
            event_id: "e1".to_string(),
            tenant_id: TenantId::new_unchecked("t1"),
            event_name: "page_view".to_string(),
            properties: serde_json::json!({"path": "/pricing"}),
            event_time: Utc::now(),
            received_at: Utc::now(),
        };

        let data = serde_json::to_vec(&msg).unwrap();
        let parsed: EventMessage = serde_json::from_slice(&data).unwrap();
        assert_eq!(parsed, msg);
    }
}
