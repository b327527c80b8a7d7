use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use petrel_metadata_core::upload_store::UploadStoreError;
use petrel_metadata_core::UploadStore;
use petrel_object_store::{paths::format_upload_data_path, UploadUrlSigner};
use petrel_queue::UploadJobQueue;
use petrel_resources::{
    file_extension, validate_presign_files, TenantId, Upload, UploadFile, UploadFileInput,
    UploadJobMessage, UploadStatus,
};
use snafu::ResultExt;
use uuid::Uuid;

use crate::error::{
    AlreadyCompleteSnafu, NotFoundSnafu, QueueSnafu, Result, SignerSnafu, StoreSnafu,
};

/// How long a presigned write URL stays valid.
pub const PRESIGN_EXPIRY: Duration = Duration::from_secs(15 * 60);

#[derive(Debug, Clone)]
pub struct UploadPresignedFile {
    pub file_id: String,
    pub file_name: String,
    pub presigned_url: String,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct UploadPresignResult {
    pub upload_id: String,
    pub files: Vec<UploadPresignedFile>,
}

/// The synchronous upload orchestration path.
///
/// File bytes never pass through this service: clients write directly to
/// object storage with the returned time-boxed URLs, then report
/// completion, which enqueues the conversion job.
#[derive(Clone)]
pub struct UploadService {
    uploads: Arc<dyn UploadStore>,
    signer: Arc<dyn UploadUrlSigner>,
    queue: UploadJobQueue,
}

impl UploadService {
    pub fn new(
        uploads: Arc<dyn UploadStore>,
        signer: Arc<dyn UploadUrlSigner>,
        queue: UploadJobQueue,
    ) -> Self {
        Self {
            uploads,
            signer,
            queue,
        }
    }

    /// Validate the request and hand out one write URL per file.
    pub async fn create_presign(
        &self,
        tenant_id: &TenantId,
        files: Vec<UploadFileInput>,
    ) -> Result<UploadPresignResult> {
        validate_presign_files(&files)?;

        let now = Utc::now();
        let upload_id = Uuid::new_v4().to_string();
        let upload = Upload {
            id: upload_id.clone(),
            tenant_id: tenant_id.clone(),
            status: UploadStatus::Presigned,
            created_at: now,
            updated_at: now,
        };

        self.uploads.create_upload(upload).await.context(StoreSnafu {
            message: "create upload",
        })?;

        let date = now.date_naive();
        let mut presigned_files = Vec::with_capacity(files.len());

        for file in files {
            let file_id = Uuid::new_v4().to_string();
            // Validation guarantees an allow-listed extension is present.
            let extension = file_extension(&file.file_name).unwrap_or_default();
            let object_key = format_upload_data_path(tenant_id, date, &file_id, &extension);

            let signed = self
                .signer
                .signed_put_url(&object_key, &file.content_type, PRESIGN_EXPIRY)
                .await
                .context(SignerSnafu)?;

            let upload_file = UploadFile {
                id: file_id.clone(),
                tenant_id: tenant_id.clone(),
                upload_id: upload_id.clone(),
                file_name: file.file_name.clone(),
                object_key: object_key.clone(),
                content_type: file.content_type,
                size_bytes: file.size_bytes,
                created_at: now,
            };
            self.uploads
                .create_upload_file(upload_file)
                .await
                .context(StoreSnafu {
                    message: "create upload file",
                })?;

            presigned_files.push(UploadPresignedFile {
                file_id,
                file_name: file.file_name,
                presigned_url: signed.url,
                object_key,
                expires_at: signed.expires_at,
            });
        }

        Ok(UploadPresignResult {
            upload_id,
            files: presigned_files,
        })
    }

    /// Mark an upload as uploaded and enqueue its conversion job.
    ///
    /// Completion is deliberately not idempotent: a second call is a hard
    /// conflict, even though the downstream consumer is idempotent. The job
    /// is enqueued only after the status flip, so a crash in between leaves
    /// an uploaded-but-unprocessed record for an external sweep.
    pub async fn complete(
        &self,
        tenant_id: &TenantId,
        upload_id: &str,
    ) -> Result<(Upload, Vec<UploadFile>)> {
        let upload = match self.uploads.find_by_id(tenant_id, upload_id).await {
            Ok(upload) => upload,
            Err(UploadStoreError::NotFound { .. }) => {
                return NotFoundSnafu { upload_id }.fail();
            }
            Err(source) => {
                return Err(source).context(StoreSnafu {
                    message: "find upload",
                });
            }
        };

        if upload.status == UploadStatus::Uploaded {
            return AlreadyCompleteSnafu { upload_id }.fail();
        }

        self.uploads
            .update_status(tenant_id, upload_id, UploadStatus::Uploaded)
            .await
            .context(StoreSnafu {
                message: "update upload status",
            })?;

        let upload = self
            .uploads
            .find_by_id(tenant_id, upload_id)
            .await
            .context(StoreSnafu {
                message: "reload upload",
            })?;

        let files = self
            .uploads
            .find_files_by_upload_id(tenant_id, upload_id)
            .await
            .context(StoreSnafu {
                message: "find upload files",
            })?;

        let job = UploadJobMessage {
            upload_id: upload_id.to_string(),
            tenant_id: tenant_id.clone(),
            files: files.iter().map(Into::into).collect(),
        };
        self.queue.enqueue(&job).await.context(QueueSnafu {
            message: "enqueue upload job",
        })?;

        Ok((upload, files))
    }
}
