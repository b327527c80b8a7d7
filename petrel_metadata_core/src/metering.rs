//! Best-effort usage metering.
//!
//! Consumers record usage after a successful materialization. Usage is
//! advisory within the pipeline, so the `*_best_effort` variants log and
//! swallow failures instead of propagating them; the strict variants exist
//! for callers that do want the error.

use std::sync::Arc;

use chrono::Utc;
use petrel_resources::{TenantId, UsageEvent, UsageEventType};
use tracing::warn;
use uuid::Uuid;

use crate::usage::{Result, UsageStore};

#[derive(Clone)]
pub struct MeteringService {
    usage: Arc<dyn UsageStore>,
}

impl MeteringService {
    pub fn new(usage: Arc<dyn UsageStore>) -> Self {
        Self { usage }
    }

    fn usage_event(tenant_id: &TenantId, event_type: UsageEventType, delta: i64) -> UsageEvent {
        UsageEvent {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.clone(),
            event_type,
            delta,
            recorded_at: Utc::now(),
        }
    }

    /// Record event-ingest usage.
    pub async fn record_events(&self, tenant_id: &TenantId, count: i64) -> Result<()> {
        let date = Utc::now().date_naive();
        self.usage.increment_events(tenant_id, date, count).await?;
        self.usage
            .record_event(Self::usage_event(
                tenant_id,
                UsageEventType::EventsIngest,
                count,
            ))
            .await
    }

    /// Record converted rows plus the raw bytes landed in storage.
    pub async fn record_upload(
        &self,
        tenant_id: &TenantId,
        row_count: i64,
        storage_bytes: i64,
    ) -> Result<()> {
        let date = Utc::now().date_naive();
        self.usage.increment_rows(tenant_id, date, row_count).await?;
        self.usage
            .increment_storage(tenant_id, date, storage_bytes)
            .await?;
        self.usage
            .record_event(Self::usage_event(
                tenant_id,
                UsageEventType::StorageWrite,
                row_count,
            ))
            .await
    }

    /// Record one completed upload.
    pub async fn record_upload_completed(&self, tenant_id: &TenantId) -> Result<()> {
        let date = Utc::now().date_naive();
        self.usage.increment_uploads(tenant_id, date, 1).await?;
        self.usage
            .record_event(Self::usage_event(tenant_id, UsageEventType::UploadComplete, 1))
            .await
    }

    /// Like [`Self::record_events`], but failures are logged, not returned.
    pub async fn record_events_best_effort(&self, tenant_id: &TenantId, count: i64) {
        if let Err(error) = self.record_events(tenant_id, count).await {
            warn!(%tenant_id, %error, "failed to record event usage");
        }
    }

    /// Like [`Self::record_upload`], but failures are logged, not returned.
    pub async fn record_upload_best_effort(
        &self,
        tenant_id: &TenantId,
        row_count: i64,
        storage_bytes: i64,
    ) {
        if let Err(error) = self.record_upload(tenant_id, row_count, storage_bytes).await {
            warn!(%tenant_id, %error, "failed to record upload usage");
        }
    }

    /// Like [`Self::record_upload_completed`], but failures are logged, not
    /// returned.
    pub async fn record_upload_completed_best_effort(&self, tenant_id: &TenantId) {
        if let Err(error) = self.record_upload_completed(tenant_id).await {
            warn!(%tenant_id, %error, "failed to record upload completion");
        }
    }
}
