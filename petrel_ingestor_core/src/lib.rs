//! The event pipeline.
//!
//! The synchronous half ([`EventIngestService`]) deduplicates and enqueues;
//! the asynchronous half ([`EventBatchConsumer`]) buffers dequeued events
//! and flushes them as per-tenant parquet files into object storage,
//! routing failed partitions to the dead-letter list.

pub mod consumer;
pub mod error;
pub mod metrics;
pub mod service;
pub mod sink;

pub use self::{
    consumer::EventBatchConsumer,
    error::{IngestorError, Result},
    metrics::EventMetrics,
    service::{EventIngestService, NewEvent},
    sink::{EventSink, ParquetEventSink},
};
