use petrel_queue::QueueError;
use snafu::Snafu;

/// Event pipeline error types.
///
/// The message associated with an error is forwarded to the client, so it
/// should contain information that is useful to the user.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum IngestorError {
    /// The `(tenant, event)` pair was already ingested.
    #[snafu(display("event already processed"))]
    Duplicate,
    /// Queue store failure.
    #[snafu(display("queue error: {message}"))]
    Queue {
        message: &'static str,
        source: QueueError,
    },
    /// The event batch could not be converted to a record batch.
    #[snafu(display("failed to build event record batch"))]
    Arrow { source: arrow::error::ArrowError },
    /// Columnar encoding failure.
    #[snafu(display("parquet error"))]
    Parquet {
        source: petrel_object_store::parquet::Error,
    },
    /// Object store failure.
    #[snafu(display("object store error: {message}"))]
    ObjectStore {
        message: &'static str,
        source: object_store::Error,
    },
    /// Internal error.
    #[snafu(display("internal error: {message}"))]
    Internal { message: String },
}

pub type Result<T, E = IngestorError> = std::result::Result<T, E>;
