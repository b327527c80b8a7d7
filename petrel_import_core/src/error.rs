use datafusion::error::DataFusionError;
use petrel_metadata_core::catalog::CatalogError;
use petrel_metadata_core::upload_store::UploadStoreError;
use petrel_object_store::SignerError;
use petrel_queue::QueueError;
use petrel_resources::UploadValidationError;
use snafu::Snafu;

/// Upload pipeline error types.
///
/// The message associated with an error is forwarded to the client, so it
/// should contain information that is useful to the user.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ImportError {
    /// The presign request was rejected before any record was created.
    #[snafu(transparent)]
    Validation { source: UploadValidationError },
    /// The upload does not exist for this tenant.
    #[snafu(display("upload not found: {upload_id}"))]
    NotFound { upload_id: String },
    /// The upload was already completed; completion is not idempotent.
    #[snafu(display("upload already complete: {upload_id}"))]
    AlreadyComplete { upload_id: String },
    /// Upload repository failure.
    #[snafu(display("upload store error: {message}"))]
    Store {
        message: &'static str,
        source: UploadStoreError,
    },
    /// Queue store failure.
    #[snafu(display("queue error: {message}"))]
    Queue {
        message: &'static str,
        source: QueueError,
    },
    /// Presigned URL generation failure.
    #[snafu(display("failed to generate presigned url"))]
    Signer { source: SignerError },
    /// Object store failure.
    #[snafu(display("object store error: {message}"))]
    ObjectStore {
        message: &'static str,
        source: object_store::Error,
    },
    /// The analytical engine rejected the file.
    #[snafu(display("conversion error: {message}"))]
    DataFusion {
        message: &'static str,
        source: DataFusionError,
    },
    /// Columnar encoding failure.
    #[snafu(display("parquet error"))]
    Parquet {
        source: petrel_object_store::parquet::Error,
    },
    /// Catalog upsert failure.
    #[snafu(display("catalog error"))]
    Catalog { source: CatalogError },
    /// Schema serialization failure.
    #[snafu(display("serialization error: {message}"))]
    Serialization {
        message: &'static str,
        source: serde_json::Error,
    },
    /// Scratch storage failure.
    #[snafu(display("io error: {message}"))]
    Io {
        message: &'static str,
        source: std::io::Error,
    },
}

pub type Result<T, E = ImportError> = std::result::Result<T, E>;
