//! The upload pipeline.
//!
//! The synchronous half ([`UploadService`]) validates file metadata, hands
//! out time-boxed write URLs, and enqueues a conversion job when the client
//! reports completion. The asynchronous half
//! ([`UploadConversionConsumer`]) claims each job exactly once via an
//! idempotency mark and converts the uploaded tabular files to parquet,
//! registering the results in the dataset catalog.

pub mod consumer;
pub mod error;
pub mod importer;
pub mod metrics;
pub mod service;

pub use self::{
    consumer::UploadConversionConsumer,
    error::{ImportError, Result},
    importer::{CsvImporter, ImportResult},
    metrics::UploadMetrics,
    service::{UploadPresignResult, UploadPresignedFile, UploadService, PRESIGN_EXPIRY},
};
