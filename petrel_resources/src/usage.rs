use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// Daily usage rollup for a tenant. Advisory counters, not billing records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageDaily {
    pub events_count: i64,
    pub rows_count: i64,
    pub storage_bytes: i64,
    pub uploads_count: i64,
}

/// The kind of usage being recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageEventType {
    EventsIngest,
    UploadComplete,
    StorageWrite,
}

/// An append-only usage audit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    pub id: String,
    pub tenant_id: TenantId,
    pub event_type: UsageEventType,
    pub delta: i64,
    pub recorded_at: DateTime<Utc>,
}
