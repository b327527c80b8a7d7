use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use petrel_import_core::ImportError;
use petrel_ingestor_core::IngestorError;
use petrel_resources::TenantId;
use snafu::Snafu;
use tracing::error;

use crate::types::ErrorResponse;
use crate::TENANT_HEADER;

/// HTTP-facing error types.
///
/// The message is forwarded to the client except for `Internal`, whose
/// cause is only logged.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum HttpError {
    #[snafu(display("{message}"))]
    BadRequest { message: String },
    #[snafu(display("{message}"))]
    NotFound { message: String },
    #[snafu(display("{message}"))]
    Conflict { message: String },
    #[snafu(display("internal server error"))]
    Internal { message: String },
}

pub type Result<T, E = HttpError> = std::result::Result<T, E>;

impl From<IngestorError> for HttpError {
    fn from(error: IngestorError) -> Self {
        match error {
            IngestorError::Duplicate => HttpError::Conflict {
                message: "event already processed".to_string(),
            },
            other => HttpError::Internal {
                message: other.to_string(),
            },
        }
    }
}

impl From<ImportError> for HttpError {
    fn from(error: ImportError) -> Self {
        match error {
            ImportError::Validation { .. } => HttpError::BadRequest {
                message: error.to_string(),
            },
            ImportError::NotFound { .. } => HttpError::NotFound {
                message: error.to_string(),
            },
            ImportError::AlreadyComplete { .. } => HttpError::Conflict {
                message: error.to_string(),
            },
            other => HttpError::Internal {
                message: other.to_string(),
            },
        }
    }
}

/// Resolve the tenant from the request headers.
pub fn tenant_from_headers(headers: &HeaderMap) -> Result<TenantId> {
    let value = headers
        .get(TENANT_HEADER)
        .ok_or_else(|| HttpError::BadRequest {
            message: format!("missing {TENANT_HEADER} header"),
        })?;

    let raw = value.to_str().map_err(|_| HttpError::BadRequest {
        message: format!("invalid {TENANT_HEADER} header"),
    })?;

    TenantId::new(raw).map_err(|err| HttpError::BadRequest {
        message: err.to_string(),
    })
}

pub fn map_error_to_response(err: HttpError) -> Response {
    let status_code = match &err {
        HttpError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        HttpError::NotFound { .. } => StatusCode::NOT_FOUND,
        HttpError::Conflict { .. } => StatusCode::CONFLICT,
        HttpError::Internal { message } => {
            error!(%message, "request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let response = Json(ErrorResponse {
        message: err.to_string(),
    });

    (status_code, response).into_response()
}
