//! Wire types for the HTTP API.

use chrono::{DateTime, Utc};
use petrel_resources::{Upload, UploadFile, UploadFileInput, UploadStatus};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct IngestEventRequest {
    pub event_id: String,
    pub event_name: String,
    #[serde(default)]
    pub properties: Option<serde_json::Value>,
    pub event_time: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct IngestEventResponse {
    pub event_id: String,
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EventCount {
    pub event_name: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct EventsSummaryResponse {
    pub counts: Vec<EventCount>,
    pub total: i64,
}

#[derive(Debug, Deserialize)]
pub struct PresignFileRequest {
    pub filename: String,
    pub content_type: String,
    pub size_bytes: i64,
}

#[derive(Debug, Deserialize)]
pub struct PresignRequest {
    pub files: Vec<PresignFileRequest>,
}

impl From<PresignFileRequest> for UploadFileInput {
    fn from(file: PresignFileRequest) -> Self {
        Self {
            file_name: file.filename,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PresignFileResponse {
    pub file_id: String,
    pub filename: String,
    pub presigned_url: String,
    pub object_key: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PresignResponse {
    pub upload_id: String,
    pub files: Vec<PresignFileResponse>,
}

#[derive(Debug, Serialize)]
pub struct UploadFileResponse {
    pub id: String,
    pub file_name: String,
    pub object_key: String,
    pub content_type: String,
    pub size_bytes: i64,
}

#[derive(Debug, Serialize)]
pub struct CompleteResponse {
    pub id: String,
    pub tenant_id: String,
    pub status: UploadStatus,
    pub files: Vec<UploadFileResponse>,
}

impl CompleteResponse {
    pub fn from_record(upload: Upload, files: Vec<UploadFile>) -> Self {
        Self {
            id: upload.id,
            tenant_id: upload.tenant_id.to_string(),
            status: upload.status,
            files: files
                .into_iter()
                .map(|file| UploadFileResponse {
                    id: file.id,
                    file_name: file.file_name,
                    object_key: file.object_key,
                    content_type: file.content_type,
                    size_bytes: file.size_bytes,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}
