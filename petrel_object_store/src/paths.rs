//! Object key layout.
//!
//! All keys are partitioned by tenant first, so downstream consumers can
//! scan a single tenant without listing the whole bucket. Materialized
//! files additionally carry a `dt=` date partition.

use chrono::NaiveDate;
use petrel_resources::TenantId;

/// How many characters of the event id end up in the file name.
const EVENT_ID_PREFIX_LEN: usize = 8;

/// Key for a materialized event batch:
/// `events/{tenant}/dt={date}/{unix_millis}_{event-id-prefix}.parquet`.
///
/// The unix-millis prefix keeps files time-ordered within a partition; the
/// event-id fragment makes concurrent flushes collision-resistant.
pub fn format_event_data_path(
    tenant_id: &TenantId,
    date: NaiveDate,
    unix_millis: i64,
    first_event_id: &str,
) -> String {
    let id_prefix: String = first_event_id.chars().take(EVENT_ID_PREFIX_LEN).collect();
    format!("events/{tenant_id}/dt={date}/{unix_millis}_{id_prefix}.parquet")
}

/// Key for a raw uploaded file:
/// `uploads/{tenant}/{date}/{file_id}.{ext}`.
pub fn format_upload_data_path(
    tenant_id: &TenantId,
    date: NaiveDate,
    file_id: &str,
    extension: &str,
) -> String {
    format!("uploads/{tenant_id}/{date}/{file_id}.{extension}")
}

/// Key for a converted upload:
/// `imports/{tenant}/dt={date}/{file_id}.parquet`.
pub fn format_import_data_path(tenant_id: &TenantId, date: NaiveDate, file_id: &str) -> String {
    format!("imports/{tenant_id}/dt={date}/{file_id}.parquet")
}
