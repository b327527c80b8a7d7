use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use petrel_queue::{EventQueue, QueueError};
use petrel_resources::{EventMessage, TenantId};
use snafu::ResultExt;
use tracing::debug;

use crate::error::{DuplicateSnafu, QueueSnafu, Result};
use crate::metrics::EventMetrics;

/// A client-submitted event, before it is stamped and enqueued.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_id: String,
    pub event_name: String,
    pub properties: serde_json::Value,
    pub event_time: DateTime<Utc>,
}

/// The synchronous ingest path.
///
/// The seen-marker is set before the message is enqueued, which makes the
/// marker the dedup authority: once `ingest` returns, a retry of the same
/// `(tenant, event)` pair fails with [`crate::IngestorError::Duplicate`]
/// regardless of what the queue does downstream.
#[derive(Clone)]
pub struct EventIngestService {
    queue: EventQueue,
    metrics: Arc<EventMetrics>,
}

impl EventIngestService {
    pub fn new(queue: EventQueue, metrics: Arc<EventMetrics>) -> Self {
        Self { queue, metrics }
    }

    /// Accept an event: dedup, stamp, enqueue.
    ///
    /// Returns once the message is durably enqueued; materialization is
    /// asynchronous.
    pub async fn ingest(&self, tenant_id: &TenantId, event: NewEvent) -> Result<EventMessage> {
        self.metrics.received.add(1, &[]);

        let duplicate = self
            .queue
            .check_duplicate(tenant_id, &event.event_id)
            .await
            .context(QueueSnafu {
                message: "check duplicate",
            })?;

        if duplicate {
            self.metrics.duplicate.add(1, &[]);
            return DuplicateSnafu.fail();
        }

        // The set-if-absent is what decides a race between two concurrent
        // ingests of the same pair; the check above only short-circuits.
        match self.queue.mark_processed(tenant_id, &event.event_id).await {
            Ok(()) => {}
            Err(QueueError::AlreadyProcessed) => {
                self.metrics.duplicate.add(1, &[]);
                return DuplicateSnafu.fail();
            }
            Err(source) => {
                return Err(source).context(QueueSnafu {
                    message: "mark event seen",
                });
            }
        }

        let msg = EventMessage {
            event_id: event.event_id,
            tenant_id: tenant_id.clone(),
            event_name: event.event_name,
            properties: event.properties,
            event_time: event.event_time,
            received_at: Utc::now(),
        };

        self.queue.enqueue(&msg).await.context(QueueSnafu {
            message: "enqueue event",
        })?;

        // Best-effort summary counter; never fails the ingest.
        if let Err(error) = self.queue.increment_count(tenant_id, &msg.event_name).await {
            debug!(%tenant_id, %error, "failed to increment event counter");
        }

        self.metrics.enqueued.add(1, &[]);

        Ok(msg)
    }

    /// Per-event-name counts for the tenant, from the best-effort counters.
    pub async fn summary(&self, tenant_id: &TenantId) -> Result<HashMap<String, i64>> {
        self.queue.get_counts(tenant_id).await.context(QueueSnafu {
            message: "read event counts",
        })
    }
}
