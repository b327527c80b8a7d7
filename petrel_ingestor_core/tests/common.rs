use std::sync::Arc;

use chrono::Utc;
use petrel_ingestor_core::{EventMetrics, EventSink, IngestorError};
use petrel_metadata_core::{InMemoryUsageStore, MeteringService};
use petrel_queue::{EventQueue, InMemoryQueueStore};
use petrel_resources::{EventMessage, TenantId};
use tokio::sync::Mutex;

/// A sink that records every partition it receives, optionally failing for
/// selected tenants.
#[derive(Default)]
pub struct RecordingSink {
    writes: Mutex<Vec<(TenantId, Vec<String>)>>,
    fail_tenants: Vec<String>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(tenants: &[&str]) -> Self {
        Self {
            writes: Mutex::new(Vec::new()),
            fail_tenants: tenants.iter().map(|t| t.to_string()).collect(),
        }
    }

    pub async fn writes(&self) -> Vec<(TenantId, Vec<String>)> {
        self.writes.lock().await.clone()
    }
}

#[async_trait::async_trait]
impl EventSink for RecordingSink {
    async fn write_partition(
        &self,
        tenant_id: &TenantId,
        events: &[EventMessage],
    ) -> Result<String, IngestorError> {
        if self.fail_tenants.contains(&tenant_id.as_str().to_string()) {
            return Err(IngestorError::Internal {
                message: "sink unavailable".to_string(),
            });
        }

        let event_ids = events.iter().map(|e| e.event_id.clone()).collect();
        self.writes.lock().await.push((tenant_id.clone(), event_ids));

        Ok(format!("events/{tenant_id}/test.parquet"))
    }
}

pub fn new_event(tenant: &str, event_id: &str) -> EventMessage {
    EventMessage {
        event_id: event_id.to_string(),
        tenant_id: TenantId::new_unchecked(tenant),
        event_name: "page_view".to_string(),
        properties: serde_json::json!({"path": "/"}),
        event_time: Utc::now(),
        received_at: Utc::now(),
    }
}

pub fn new_event_queue() -> (EventQueue, Arc<InMemoryQueueStore>) {
    let store = Arc::new(InMemoryQueueStore::new());
    (EventQueue::new(store.clone()), store)
}

pub fn new_metering() -> (MeteringService, Arc<InMemoryUsageStore>) {
    let usage = Arc::new(InMemoryUsageStore::new());
    (MeteringService::new(usage.clone()), usage)
}

pub fn new_metrics() -> Arc<EventMetrics> {
    Arc::new(EventMetrics::default())
}
