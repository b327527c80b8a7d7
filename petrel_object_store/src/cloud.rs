//! Production object store construction for S3-compatible providers.

use std::sync::Arc;

use object_store::{
    aws::{AmazonS3, AmazonS3Builder, S3CopyIfNotExists},
    prefix::PrefixStore,
    Error as ObjectStoreError, ObjectStore,
};

/// Configuration for an S3-compatible object store (AWS S3, MinIO, and
/// friends).
#[derive(Debug, Clone)]
pub struct S3CompatibleConfiguration {
    pub bucket_name: String,
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    pub region: Option<String>,
    pub prefix: Option<String>,
    /// Allow plain HTTP endpoints (local MinIO).
    pub allow_http: bool,
}

pub(crate) fn build_s3_client(
    config: &S3CompatibleConfiguration,
) -> Result<AmazonS3, ObjectStoreError> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(&config.bucket_name)
        .with_access_key_id(&config.access_key_id)
        .with_secret_access_key(&config.secret_access_key)
        .with_copy_if_not_exists(S3CopyIfNotExists::Multipart)
        .with_allow_http(config.allow_http);

    if let Some(endpoint) = &config.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    if let Some(region) = &config.region {
        builder = builder.with_region(region);
    }

    builder.build()
}

/// Create an S3-compatible object store from configuration.
pub fn build_s3_compatible_store(
    config: &S3CompatibleConfiguration,
) -> Result<Arc<dyn ObjectStore>, ObjectStoreError> {
    let store = build_s3_client(config)?;

    let Some(prefix) = &config.prefix else {
        return Ok(Arc::new(store));
    };

    Ok(Arc::new(PrefixStore::new(store, prefix.as_str())))
}
