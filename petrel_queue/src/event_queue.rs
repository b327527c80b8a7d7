use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use petrel_resources::{EventMessage, TenantId};
use snafu::ResultExt;

use crate::error::{QueueError, Result, SerializationSnafu};
use crate::store::{DeadLetterEntry, QueueStore, DEQUEUE_WAIT, SEEN_TTL};

const INGEST_LIST: &str = "petrel:events:ingest";
const DLQ_LIST: &str = "petrel:events:dlq";
const SEEN_PREFIX: &str = "petrel:events:seen:";
const COUNTS_PREFIX: &str = "petrel:events:counts:";

/// The event pipeline's view of the queue store.
///
/// The seen-marker, not the list, is the dedup authority: markers are set
/// before anything is enqueued, so the list may be at-least-once downstream
/// without producing duplicate materializations inside the TTL window.
#[derive(Clone)]
pub struct EventQueue {
    store: Arc<dyn QueueStore>,
}

impl EventQueue {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    fn seen_key(tenant_id: &TenantId, event_id: &str) -> String {
        format!("{SEEN_PREFIX}{tenant_id}:{event_id}")
    }

    fn counts_key(tenant_id: &TenantId) -> String {
        format!("{COUNTS_PREFIX}{tenant_id}")
    }

    /// Whether the `(tenant, event)` pair has already been seen.
    pub async fn check_duplicate(&self, tenant_id: &TenantId, event_id: &str) -> Result<bool> {
        self.store.exists(&Self::seen_key(tenant_id, event_id)).await
    }

    /// Claim the `(tenant, event)` pair. Fails with
    /// [`QueueError::AlreadyProcessed`] if another request claimed it first.
    pub async fn mark_processed(&self, tenant_id: &TenantId, event_id: &str) -> Result<()> {
        let claimed = self
            .store
            .set_if_absent(&Self::seen_key(tenant_id, event_id), SEEN_TTL)
            .await?;

        if !claimed {
            return Err(QueueError::AlreadyProcessed);
        }

        Ok(())
    }

    pub async fn enqueue(&self, msg: &EventMessage) -> Result<()> {
        let data = serde_json::to_vec(msg).context(SerializationSnafu {
            message: "marshal event",
        })?;

        self.store.push(INGEST_LIST, Bytes::from(data)).await
    }

    /// Pop the next event, waiting up to the bounded dequeue wait.
    pub async fn dequeue(&self) -> Result<Option<EventMessage>> {
        let Some(data) = self.store.pop(INGEST_LIST, DEQUEUE_WAIT).await? else {
            return Ok(None);
        };

        let msg = serde_json::from_slice(&data).context(SerializationSnafu {
            message: "unmarshal event",
        })?;

        Ok(Some(msg))
    }

    pub async fn enqueue_dlq(&self, msg: &EventMessage, reason: &str) -> Result<()> {
        let entry = DeadLetterEntry::new(msg.clone(), reason);
        let data = serde_json::to_vec(&entry).context(SerializationSnafu {
            message: "marshal event dlq entry",
        })?;

        self.store.push(DLQ_LIST, Bytes::from(data)).await
    }

    /// Drain every entry currently on the dead-letter list.
    pub async fn drain_dlq(&self) -> Result<Vec<DeadLetterEntry<EventMessage>>> {
        let mut entries = Vec::new();
        while let Some(data) = self.store.pop(DLQ_LIST, std::time::Duration::ZERO).await? {
            let entry = serde_json::from_slice(&data).context(SerializationSnafu {
                message: "unmarshal event dlq entry",
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }

    /// Best-effort per-event-name counter. Advisory only.
    pub async fn increment_count(&self, tenant_id: &TenantId, event_name: &str) -> Result<()> {
        self.store
            .increment_counter(&Self::counts_key(tenant_id), event_name, 1)
            .await
    }

    pub async fn get_counts(&self, tenant_id: &TenantId) -> Result<HashMap<String, i64>> {
        self.store.read_counters(&Self::counts_key(tenant_id)).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::memory::InMemoryQueueStore;

    fn test_event(tenant: &str, event_id: &str) -> EventMessage {
        EventMessage {
            event_id: event_id.to_string(),
            tenant_id: TenantId::new_unchecked(tenant),
            event_name: "page_view".to_string(),
            properties: serde_json::json!({}),
            event_time: Utc::now(),
            received_at: Utc::now(),
        }
    }

    fn new_queue() -> EventQueue {
        EventQueue::new(Arc::new(InMemoryQueueStore::new()))
    }

    #[tokio::test]
    async fn test_enqueue_dequeue_round_trip() {
        let queue = new_queue();
        let msg = test_event("t1", "e1");

        queue.enqueue(&msg).await.unwrap();
        let popped = queue.dequeue().await.unwrap();

        assert_eq!(popped, Some(msg));
    }

    #[tokio::test]
    async fn test_mark_processed_detects_duplicates() {
        let queue = new_queue();
        let tenant = TenantId::new_unchecked("t1");

        assert!(!queue.check_duplicate(&tenant, "e1").await.unwrap());
        queue.mark_processed(&tenant, "e1").await.unwrap();
        assert!(queue.check_duplicate(&tenant, "e1").await.unwrap());

        let err = queue.mark_processed(&tenant, "e1").await.unwrap_err();
        assert!(matches!(err, QueueError::AlreadyProcessed));

        // A different event id under the same tenant is not a duplicate.
        assert!(!queue.check_duplicate(&tenant, "e2").await.unwrap());
    }

    #[tokio::test]
    async fn test_dlq_wraps_message_with_reason() {
        let queue = new_queue();
        let msg = test_event("t1", "e1");

        queue.enqueue_dlq(&msg, "upload failed").await.unwrap();

        let entries = queue.drain_dlq().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].message, msg);
        assert_eq!(entries[0].reason, "upload failed");
    }
}
