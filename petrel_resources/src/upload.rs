//! Upload records and the validation rules applied before any record is
//! created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use snafu::Snafu;

use crate::tenant::TenantId;

/// Maximum size of a single uploaded file.
pub const MAX_FILE_SIZE_BYTES: i64 = 100 * 1024 * 1024;

/// Maximum number of files in a single presign request.
pub const MAX_FILES_PER_REQUEST: usize = 10;

/// File extensions accepted at upload time.
///
/// Acceptance here does not imply the converter materializes them: only
/// `.csv` is converted today, the rest land in object storage untouched.
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "csv", "json", "parquet", "xlsx", "txt", "tsv", "gz", "zip",
];

/// Lifecycle of an upload.
///
/// `Presigned` uploads transition to `Uploaded` exactly once, enforced by a
/// status check rather than a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    Presigned,
    Uploaded,
}

/// An upload: a batch of files presigned together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upload {
    pub id: String,
    pub tenant_id: TenantId,
    pub status: UploadStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single file belonging to an upload. Read-only after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFile {
    pub id: String,
    pub tenant_id: TenantId,
    pub upload_id: String,
    pub file_name: String,
    pub object_key: String,
    pub content_type: String,
    pub size_bytes: i64,
    pub created_at: DateTime<Utc>,
}

/// Client-declared metadata for one file in a presign request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadFileInput {
    pub file_name: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// A conversion job file reference carried on the upload queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadJobFile {
    pub file_id: String,
    pub file_name: String,
    pub object_key: String,
    pub content_type: String,
    pub size_bytes: i64,
}

/// The conversion job enqueued when an upload completes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadJobMessage {
    pub upload_id: String,
    pub tenant_id: TenantId,
    pub files: Vec<UploadJobFile>,
}

impl From<&UploadFile> for UploadJobFile {
    fn from(file: &UploadFile) -> Self {
        Self {
            file_id: file.id.clone(),
            file_name: file.file_name.clone(),
            object_key: file.object_key.clone(),
            content_type: file.content_type.clone(),
            size_bytes: file.size_bytes,
        }
    }
}

/// Validation errors for presign requests.
///
/// The message associated with an error is forwarded to the client, so it
/// should contain information that is useful to the user.
#[derive(Debug, Clone, PartialEq, Eq, Snafu)]
pub enum UploadValidationError {
    #[snafu(display("at least one file is required"))]
    NoFiles,
    #[snafu(display("too many files: max {MAX_FILES_PER_REQUEST}"))]
    TooManyFiles,
    #[snafu(display("invalid size for file '{file_name}'"))]
    InvalidSize { file_name: String },
    #[snafu(display("file '{file_name}' exceeds max size {MAX_FILE_SIZE_BYTES} bytes"))]
    FileTooLarge { file_name: String },
    #[snafu(display("file extension '{extension}' is not allowed"))]
    ExtensionNotAllowed { extension: String },
}

/// Extract the lowercased extension of a file name, without the dot.
pub fn file_extension(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Validate a presign request's file list.
///
/// Rejects the whole request before any record is created.
pub fn validate_presign_files(files: &[UploadFileInput]) -> Result<(), UploadValidationError> {
    if files.is_empty() {
        return Err(UploadValidationError::NoFiles);
    }
    if files.len() > MAX_FILES_PER_REQUEST {
        return Err(UploadValidationError::TooManyFiles);
    }

    for file in files {
        if file.size_bytes <= 0 {
            return Err(UploadValidationError::InvalidSize {
                file_name: file.file_name.clone(),
            });
        }
        if file.size_bytes > MAX_FILE_SIZE_BYTES {
            return Err(UploadValidationError::FileTooLarge {
                file_name: file.file_name.clone(),
            });
        }

        let extension = file_extension(&file.file_name).unwrap_or_default();
        if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(UploadValidationError::ExtensionNotAllowed { extension });
        }
    }

    Ok(())
}
