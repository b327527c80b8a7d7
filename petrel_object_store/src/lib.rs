//! Object storage for petrel.
//!
//! Stores are constructed once at startup from configuration and injected
//! into the components that need them; there is no ambient store registry.
//! This crate provides the constructors (a tempdir-backed local store for
//! development and testing, and an S3-compatible builder for production),
//! the object key layout, the presigned-URL signer seam used by the upload
//! path, and the buffered parquet writer both pipelines use to produce
//! columnar files.

pub mod cloud;
pub mod local;
pub mod parquet;
pub mod paths;
pub mod signer;

pub use self::{
    cloud::{build_s3_compatible_store, S3CompatibleConfiguration},
    local::TemporaryFileSystem,
    parquet::{FileMetadata, ParquetWriter},
    signer::{S3UrlSigner, SignedUrl, SignerError, StaticUrlSigner, UploadUrlSigner},
};
