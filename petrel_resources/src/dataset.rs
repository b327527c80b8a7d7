use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tenant::TenantId;

/// Where a dataset's rows came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetSourceType {
    /// Materialized from the event ingest pipeline.
    Tracker,
    /// Converted from an uploaded tabular file.
    Import,
}

/// A catalog entry describing a materialized dataset.
///
/// Datasets are keyed by `(tenant_id, name)`; a name collision within a
/// tenant is an update-in-place, not a merge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub id: String,
    pub tenant_id: TenantId,
    pub name: String,
    pub source_type: DatasetSourceType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_json: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<i64>,
    pub storage_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
