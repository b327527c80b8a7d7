use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};
use petrel_ingestor_core::NewEvent;

use crate::error::{map_error_to_response, tenant_from_headers, HttpError, Result};
use crate::types::{EventCount, EventsSummaryResponse, IngestEventRequest, IngestEventResponse};
use crate::AppState;

/// Handler for `POST /v1/events`.
pub async fn ingest_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<IngestEventRequest>,
) -> impl IntoResponse {
    match process_ingest(&state, &headers, request).await {
        Ok(response) => (StatusCode::ACCEPTED, Json(response)).into_response(),
        Err(err) => map_error_to_response(err),
    }
}

async fn process_ingest(
    state: &AppState,
    headers: &HeaderMap,
    request: IngestEventRequest,
) -> Result<IngestEventResponse> {
    let tenant_id = tenant_from_headers(headers)?;

    if request.event_id.is_empty() {
        return Err(HttpError::BadRequest {
            message: "event_id is required".to_string(),
        });
    }
    if request.event_name.is_empty() {
        return Err(HttpError::BadRequest {
            message: "event_name is required".to_string(),
        });
    }

    let event = NewEvent {
        event_id: request.event_id,
        event_name: request.event_name,
        properties: request
            .properties
            .unwrap_or_else(|| serde_json::Value::Object(Default::default())),
        event_time: request.event_time,
    };

    let accepted = state.events.ingest(&tenant_id, event).await?;

    Ok(IngestEventResponse {
        event_id: accepted.event_id,
        status: "accepted",
    })
}

/// Handler for `GET /v1/events/summary`.
pub async fn summary_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let tenant_id = match tenant_from_headers(&headers) {
        Ok(tenant_id) => tenant_id,
        Err(err) => return map_error_to_response(err),
    };

    match state.events.summary(&tenant_id).await {
        Ok(counts) => {
            let mut items: Vec<EventCount> = counts
                .into_iter()
                .map(|(event_name, count)| EventCount { event_name, count })
                .collect();
            items.sort_by(|a, b| a.event_name.cmp(&b.event_name));
            let total = items.iter().map(|item| item.count).sum();

            Json(EventsSummaryResponse {
                counts: items,
                total,
            })
            .into_response()
        }
        Err(err) => map_error_to_response(err.into()),
    }
}
