//! Columnar materialization of event partitions.

use std::sync::Arc;

use arrow::array::{StringArray, TimestampMicrosecondArray};
use arrow::datatypes::{DataType, Field, Schema, SchemaRef, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use object_store::{path::Path, ObjectStore, PutMode, PutOptions, PutPayload};
use parquet::file::properties::WriterProperties;
use petrel_object_store::{paths::format_event_data_path, ParquetWriter};
use petrel_resources::{EventMessage, TenantId};
use snafu::ResultExt;

use crate::error::{ArrowSnafu, ObjectStoreSnafu, ParquetSnafu, Result};

/// Writes one tenant's slice of a flush as a single columnar file.
///
/// A partition never mixes tenants; that invariant is owned by the
/// consumer, the sink just turns a slice into one file.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    /// Returns the object key of the written file.
    async fn write_partition(
        &self,
        tenant_id: &TenantId,
        events: &[EventMessage],
    ) -> Result<String>;
}

/// Event sink producing parquet files in object storage.
pub struct ParquetEventSink {
    object_store: Arc<dyn ObjectStore>,
}

/// The fixed schema of materialized event files.
pub fn event_schema() -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new("event_id", DataType::Utf8, false),
        Field::new("tenant_id", DataType::Utf8, false),
        Field::new("event_name", DataType::Utf8, false),
        Field::new("properties", DataType::Utf8, false),
        Field::new(
            "event_time",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
        Field::new(
            "received_at",
            DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
            false,
        ),
    ]))
}

impl ParquetEventSink {
    pub fn new(object_store: Arc<dyn ObjectStore>) -> Self {
        Self { object_store }
    }

    fn build_record_batch(events: &[EventMessage]) -> Result<RecordBatch> {
        let event_ids = StringArray::from_iter_values(events.iter().map(|e| e.event_id.as_str()));
        let tenant_ids =
            StringArray::from_iter_values(events.iter().map(|e| e.tenant_id.as_str()));
        let event_names =
            StringArray::from_iter_values(events.iter().map(|e| e.event_name.as_str()));
        let properties =
            StringArray::from_iter_values(events.iter().map(|e| e.properties.to_string()));
        let event_times = TimestampMicrosecondArray::from_iter_values(
            events.iter().map(|e| e.event_time.timestamp_micros()),
        )
        .with_timezone("UTC");
        let received_ats = TimestampMicrosecondArray::from_iter_values(
            events.iter().map(|e| e.received_at.timestamp_micros()),
        )
        .with_timezone("UTC");

        RecordBatch::try_new(
            event_schema(),
            vec![
                Arc::new(event_ids),
                Arc::new(tenant_ids),
                Arc::new(event_names),
                Arc::new(properties),
                Arc::new(event_times),
                Arc::new(received_ats),
            ],
        )
        .context(ArrowSnafu)
    }
}

#[async_trait::async_trait]
impl EventSink for ParquetEventSink {
    async fn write_partition(
        &self,
        tenant_id: &TenantId,
        events: &[EventMessage],
    ) -> Result<String> {
        let batch = Self::build_record_batch(events)?;

        let mut writer = ParquetWriter::new(event_schema(), WriterProperties::builder().build());
        writer.write(&batch).context(ParquetSnafu)?;
        let (data, _metadata) = writer.finish().context(ParquetSnafu)?;

        let now = Utc::now();
        let first_event_id = events.first().map(|e| e.event_id.as_str()).unwrap_or_default();
        let object_key = format_event_data_path(
            tenant_id,
            now.date_naive(),
            now.timestamp_millis(),
            first_event_id,
        );

        let path = Path::from(object_key.clone());
        self.object_store
            .put_opts(
                &path,
                PutPayload::from(data),
                PutOptions {
                    mode: PutMode::Create,
                    ..Default::default()
                },
            )
            .await
            .context(ObjectStoreSnafu {
                message: "upload event batch",
            })?;

        Ok(object_key)
    }
}
