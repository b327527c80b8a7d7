//! Repository seams consumed by the petrel pipelines.
//!
//! The pipelines talk to relational metadata (uploads, the dataset catalog,
//! usage rollups) through the traits in this crate. Each trait ships with an
//! in-memory implementation suitable for development and testing; production
//! deployments substitute database-backed implementations behind the same
//! contracts.

pub mod catalog;
pub mod metering;
pub mod upload_store;
pub mod usage;

pub use self::{
    catalog::{CatalogError, DatasetCatalog, InMemoryDatasetCatalog},
    metering::MeteringService,
    upload_store::{InMemoryUploadStore, UploadStore, UploadStoreError},
    usage::{InMemoryUsageStore, UsageError, UsageStore},
};
