//! CSV to parquet conversion through the embedded analytical engine.

use std::sync::Arc;

use arrow::datatypes::{Schema, SchemaRef};
use chrono::Utc;
use datafusion::prelude::{CsvReadOptions, SessionContext};
use object_store::{path::Path, ObjectStore, PutMode, PutOptions, PutPayload};
use parquet::file::properties::WriterProperties;
use petrel_metadata_core::DatasetCatalog;
use petrel_object_store::{paths::format_import_data_path, ParquetWriter};
use petrel_resources::{Dataset, DatasetSourceType, TenantId, UploadJobFile};
use serde::Serialize;
use snafu::ResultExt;
use uuid::Uuid;

use crate::error::{
    CatalogSnafu, DataFusionSnafu, IoSnafu, ObjectStoreSnafu, ParquetSnafu, Result,
    SerializationSnafu,
};

/// Outcome of converting one uploaded file.
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub row_count: i64,
    pub schema_json: String,
    pub output_key: String,
}

/// The inferred shape of one column, as recorded in the catalog.
#[derive(Debug, Serialize)]
struct ColumnDescriptor {
    column_name: String,
    column_type: String,
}

/// Converts uploaded CSV files to parquet and registers them as datasets.
pub struct CsvImporter {
    object_store: Arc<dyn ObjectStore>,
    catalog: Arc<dyn DatasetCatalog>,
}

impl CsvImporter {
    pub fn new(object_store: Arc<dyn ObjectStore>, catalog: Arc<dyn DatasetCatalog>) -> Self {
        Self {
            object_store,
            catalog,
        }
    }

    /// Download, convert, upload, and catalog one file.
    ///
    /// The dataset name is the file name without its extension; converting
    /// the same name again updates the catalog row in place.
    pub async fn process_file(
        &self,
        tenant_id: &TenantId,
        file: &UploadJobFile,
    ) -> Result<ImportResult> {
        let scratch = tempfile::tempdir().context(IoSnafu {
            message: "create scratch dir",
        })?;
        let csv_path = scratch.path().join("input.csv");

        let raw = self
            .object_store
            .get(&Path::from(file.object_key.clone()))
            .await
            .context(ObjectStoreSnafu {
                message: "download uploaded file",
            })?
            .bytes()
            .await
            .context(ObjectStoreSnafu {
                message: "read uploaded file body",
            })?;

        tokio::fs::write(&csv_path, &raw).await.context(IoSnafu {
            message: "write scratch csv",
        })?;

        let ctx = SessionContext::new();
        let df = ctx
            .read_csv(csv_path.to_string_lossy().as_ref(), CsvReadOptions::new())
            .await
            .context(DataFusionSnafu {
                message: "read csv",
            })?;

        let inferred_schema: SchemaRef = Arc::new(Schema::from(df.schema()));
        let schema_json = schema_to_json(&inferred_schema)?;

        let batches = df.collect().await.context(DataFusionSnafu {
            message: "collect csv rows",
        })?;
        let row_count: i64 = batches.iter().map(|b| b.num_rows() as i64).sum();

        // Batches carry the scan's schema; prefer it so the writer sees an
        // exact match.
        let output_schema = batches
            .first()
            .map(|batch| batch.schema())
            .unwrap_or(inferred_schema);

        let mut writer = ParquetWriter::new(output_schema, WriterProperties::builder().build());
        for batch in &batches {
            writer.write(batch).context(ParquetSnafu)?;
        }
        let (data, _metadata) = writer.finish().context(ParquetSnafu)?;

        let now = Utc::now();
        let output_key = format_import_data_path(tenant_id, now.date_naive(), &file.file_id);

        self.object_store
            .put_opts(
                &Path::from(output_key.clone()),
                PutPayload::from(data),
                PutOptions {
                    mode: PutMode::Create,
                    ..Default::default()
                },
            )
            .await
            .context(ObjectStoreSnafu {
                message: "upload converted parquet",
            })?;

        let dataset_name = dataset_name_for(&file.file_name);
        let dataset = Dataset {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.clone(),
            name: dataset_name,
            source_type: DatasetSourceType::Import,
            schema_json: Some(schema_json.clone()),
            row_count: Some(row_count),
            storage_path: output_key.clone(),
            last_updated_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        self.catalog.upsert(dataset).await.context(CatalogSnafu)?;

        Ok(ImportResult {
            row_count,
            schema_json,
            output_key,
        })
    }
}

fn schema_to_json(schema: &SchemaRef) -> Result<String> {
    let columns: Vec<ColumnDescriptor> = schema
        .fields()
        .iter()
        .map(|field| ColumnDescriptor {
            column_name: field.name().clone(),
            column_type: field.data_type().to_string(),
        })
        .collect();

    serde_json::to_string(&columns).context(SerializationSnafu {
        message: "marshal inferred schema",
    })
}

/// The dataset name derived from an uploaded file: the name without its
/// extension.
pub(crate) fn dataset_name_for(file_name: &str) -> String {
    std::path::Path::new(file_name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string())
}
