mod dataset;
mod event;
mod tenant;
mod upload;
mod usage;

pub use self::{
    dataset::{Dataset, DatasetSourceType},
    event::EventMessage,
    tenant::{validate_tenant_id, TenantId, TenantIdError},
    upload::{
        file_extension, validate_presign_files, Upload, UploadFile, UploadFileInput,
        UploadJobFile, UploadJobMessage, UploadStatus, UploadValidationError,
        ALLOWED_EXTENSIONS, MAX_FILES_PER_REQUEST, MAX_FILE_SIZE_BYTES,
    },
    usage::{UsageDaily, UsageEvent, UsageEventType},
};
