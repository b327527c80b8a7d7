use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Json};

use crate::error::{map_error_to_response, tenant_from_headers, Result};
use crate::types::{CompleteResponse, PresignFileResponse, PresignRequest, PresignResponse};
use crate::AppState;

/// Handler for `POST /v1/uploads`.
pub async fn presign_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<PresignRequest>,
) -> impl IntoResponse {
    match process_presign(&state, &headers, request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => map_error_to_response(err),
    }
}

async fn process_presign(
    state: &AppState,
    headers: &HeaderMap,
    request: PresignRequest,
) -> Result<PresignResponse> {
    let tenant_id = tenant_from_headers(headers)?;

    let files = request.files.into_iter().map(Into::into).collect();
    let result = state.uploads.create_presign(&tenant_id, files).await?;

    Ok(PresignResponse {
        upload_id: result.upload_id,
        files: result
            .files
            .into_iter()
            .map(|file| PresignFileResponse {
                file_id: file.file_id,
                filename: file.file_name,
                presigned_url: file.presigned_url,
                object_key: file.object_key,
                expires_at: file.expires_at,
            })
            .collect(),
    })
}

/// Handler for `POST /v1/uploads/{upload_id}/complete`.
pub async fn complete_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(upload_id): Path<String>,
) -> impl IntoResponse {
    match process_complete(&state, &headers, &upload_id).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => map_error_to_response(err),
    }
}

async fn process_complete(
    state: &AppState,
    headers: &HeaderMap,
    upload_id: &str,
) -> Result<CompleteResponse> {
    let tenant_id = tenant_from_headers(headers)?;

    let (upload, files) = state.uploads.complete(&tenant_id, upload_id).await?;

    Ok(CompleteResponse::from_record(upload, files))
}
