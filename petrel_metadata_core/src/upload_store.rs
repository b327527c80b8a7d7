//! Upload and upload-file repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use petrel_resources::{TenantId, Upload, UploadFile, UploadStatus};
use snafu::Snafu;
use tokio::sync::RwLock;

/// Upload repository error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum UploadStoreError {
    #[snafu(display("upload not found: {upload_id}"))]
    NotFound { upload_id: String },
    #[snafu(display("upload already exists: {upload_id}"))]
    AlreadyExists { upload_id: String },
    #[snafu(display("upload store error: {message}"))]
    Internal { message: String },
}

pub type Result<T, E = UploadStoreError> = std::result::Result<T, E>;

/// Repository for upload records and their files.
///
/// Uploads are tenant-scoped: lookups require the tenant and never return
/// another tenant's records.
#[async_trait]
pub trait UploadStore: Send + Sync {
    async fn create_upload(&self, upload: Upload) -> Result<()>;

    async fn create_upload_file(&self, file: UploadFile) -> Result<()>;

    async fn find_by_id(&self, tenant_id: &TenantId, upload_id: &str) -> Result<Upload>;

    async fn find_files_by_upload_id(
        &self,
        tenant_id: &TenantId,
        upload_id: &str,
    ) -> Result<Vec<UploadFile>>;

    async fn update_status(
        &self,
        tenant_id: &TenantId,
        upload_id: &str,
        status: UploadStatus,
    ) -> Result<()>;
}

#[derive(Debug, Default)]
struct UploadStoreState {
    uploads: HashMap<String, Upload>,
    /// Files keyed by upload id, in creation order.
    files: HashMap<String, Vec<UploadFile>>,
}

/// In-memory implementation of the upload repository.
///
/// Stores all records in memory behind a `RwLock`; suitable for development
/// and testing.
#[derive(Debug, Default)]
pub struct InMemoryUploadStore {
    state: RwLock<UploadStoreState>,
}

impl InMemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UploadStore for InMemoryUploadStore {
    async fn create_upload(&self, upload: Upload) -> Result<()> {
        let mut state = self.state.write().await;

        if state.uploads.contains_key(&upload.id) {
            return Err(UploadStoreError::AlreadyExists {
                upload_id: upload.id,
            });
        }

        state.uploads.insert(upload.id.clone(), upload);
        Ok(())
    }

    async fn create_upload_file(&self, file: UploadFile) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .files
            .entry(file.upload_id.clone())
            .or_default()
            .push(file);
        Ok(())
    }

    async fn find_by_id(&self, tenant_id: &TenantId, upload_id: &str) -> Result<Upload> {
        let state = self.state.read().await;
        state
            .uploads
            .get(upload_id)
            .filter(|upload| &upload.tenant_id == tenant_id)
            .cloned()
            .ok_or_else(|| UploadStoreError::NotFound {
                upload_id: upload_id.to_string(),
            })
    }

    async fn find_files_by_upload_id(
        &self,
        tenant_id: &TenantId,
        upload_id: &str,
    ) -> Result<Vec<UploadFile>> {
        let state = self.state.read().await;
        let files = state
            .files
            .get(upload_id)
            .map(|files| {
                files
                    .iter()
                    .filter(|file| &file.tenant_id == tenant_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        Ok(files)
    }

    async fn update_status(
        &self,
        tenant_id: &TenantId,
        upload_id: &str,
        status: UploadStatus,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        let upload = state
            .uploads
            .get_mut(upload_id)
            .filter(|upload| &upload.tenant_id == tenant_id)
            .ok_or_else(|| UploadStoreError::NotFound {
                upload_id: upload_id.to_string(),
            })?;

        upload.status = status;
        upload.updated_at = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_upload(tenant: &str, id: &str) -> Upload {
        Upload {
            id: id.to_string(),
            tenant_id: TenantId::new_unchecked(tenant),
            status: UploadStatus::Presigned,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryUploadStore::new();
        let tenant = TenantId::new_unchecked("t1");

        store.create_upload(new_upload("t1", "u1")).await.unwrap();

        let found = store.find_by_id(&tenant, "u1").await.unwrap();
        assert_eq!(found.status, UploadStatus::Presigned);

        let err = store.find_by_id(&tenant, "missing").await.unwrap_err();
        assert!(matches!(err, UploadStoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let store = InMemoryUploadStore::new();
        store.create_upload(new_upload("t1", "u1")).await.unwrap();

        let other = TenantId::new_unchecked("t2");
        let err = store.find_by_id(&other, "u1").await.unwrap_err();
        assert!(matches!(err, UploadStoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_status() {
        let store = InMemoryUploadStore::new();
        let tenant = TenantId::new_unchecked("t1");
        store.create_upload(new_upload("t1", "u1")).await.unwrap();

        store
            .update_status(&tenant, "u1", UploadStatus::Uploaded)
            .await
            .unwrap();

        let found = store.find_by_id(&tenant, "u1").await.unwrap();
        assert_eq!(found.status, UploadStatus::Uploaded);
    }
}
