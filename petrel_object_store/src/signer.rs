//! Presigned upload URL generation.
//!
//! Clients upload file bytes directly to object storage; the application
//! tier only hands out time-boxed write-capable URLs. The seam is a trait
//! so the upload service does not care whether URLs come from a real S3
//! signer or the static generator used in development and tests.

use std::time::Duration;

use chrono::{DateTime, Utc};
use http::Method;
use object_store::{path::Path, signer::Signer};
use snafu::{ResultExt, Snafu};

use crate::cloud::{build_s3_client, S3CompatibleConfiguration};

/// Signer error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SignerError {
    #[snafu(display("failed to sign url for '{object_key}'"))]
    Sign {
        object_key: String,
        source: object_store::Error,
    },
    #[snafu(display("failed to build signing client"))]
    Client { source: object_store::Error },
}

pub type Result<T, E = SignerError> = std::result::Result<T, E>;

/// A write-capable URL and the instant it stops working.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// Generator of time-boxed write URLs.
///
/// The content type is accepted for interface parity but implementations
/// are not required to bind it into the signature.
#[async_trait::async_trait]
pub trait UploadUrlSigner: Send + Sync {
    async fn signed_put_url(
        &self,
        object_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> Result<SignedUrl>;
}

/// URL signer backed by an S3-compatible store.
pub struct S3UrlSigner {
    client: object_store::aws::AmazonS3,
    prefix: Option<String>,
}

impl S3UrlSigner {
    pub fn from_configuration(config: &S3CompatibleConfiguration) -> Result<Self> {
        let client = build_s3_client(config).context(ClientSnafu)?;

        Ok(Self {
            client,
            prefix: config.prefix.clone(),
        })
    }
}

#[async_trait::async_trait]
impl UploadUrlSigner for S3UrlSigner {
    async fn signed_put_url(
        &self,
        object_key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<SignedUrl> {
        // The signing client is not wrapped in a PrefixStore, so the prefix
        // has to be applied to the key here.
        let full_key = match &self.prefix {
            Some(prefix) => format!("{prefix}/{object_key}"),
            None => object_key.to_string(),
        };

        let path = Path::from(full_key);
        let url = self
            .client
            .signed_url(Method::PUT, &path, expires_in)
            .await
            .context(SignSnafu {
                object_key: object_key.to_string(),
            })?;

        Ok(SignedUrl {
            url: url.to_string(),
            expires_at: Utc::now() + expires_in,
        })
    }
}

/// Deterministic URL generator for development and tests.
///
/// The produced URLs are not write-capable anywhere; they only exercise the
/// presign flow end to end without a cloud credential.
pub struct StaticUrlSigner {
    base_url: String,
}

impl StaticUrlSigner {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait::async_trait]
impl UploadUrlSigner for StaticUrlSigner {
    async fn signed_put_url(
        &self,
        object_key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<SignedUrl> {
        Ok(SignedUrl {
            url: format!("{}/{}", self.base_url.trim_end_matches('/'), object_key),
            expires_at: Utc::now() + expires_in,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_signer_produces_stable_urls() {
        let signer = StaticUrlSigner::new("http://localhost:9000/petrel/");

        let signed = signer
            .signed_put_url("uploads/t1/2026-08-06/f1.csv", "text/csv", Duration::from_secs(900))
            .await
            .unwrap();

        assert_eq!(
            signed.url,
            "http://localhost:9000/petrel/uploads/t1/2026-08-06/f1.csv"
        );
        assert!(signed.expires_at > Utc::now());
    }
}
