//! HTTP surface for the petrel pipelines.
//!
//! Three routes make up the core API: event ingestion, upload presigning,
//! and upload completion. Requests are tenant-scoped through the
//! `x-petrel-tenant` header; authenticating that header is the job of the
//! (external) auth layer in front of this service.

pub mod error;
pub mod events;
pub mod types;
pub mod uploads;

pub use error::{HttpError, Result};
pub use types::{
    CompleteResponse, ErrorResponse, EventsSummaryResponse, IngestEventRequest,
    IngestEventResponse, PresignRequest, PresignResponse,
};

use axum::{
    routing::{get, post},
    Router,
};
use petrel_import_core::UploadService;
use petrel_ingestor_core::EventIngestService;

use crate::events::{ingest_handler, summary_handler};
use crate::uploads::{complete_handler, presign_handler};

/// Name of the header carrying the authenticated tenant id.
pub const TENANT_HEADER: &str = "x-petrel-tenant";

#[derive(Clone)]
pub struct AppState {
    pub events: EventIngestService,
    pub uploads: UploadService,
}

/// HTTP server exposing the event and upload endpoints.
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    pub fn new(events: EventIngestService, uploads: UploadService) -> Self {
        Self {
            state: AppState { events, uploads },
        }
    }

    pub fn into_router(self) -> Router {
        Router::new()
            .route("/v1/events", post(ingest_handler))
            .route("/v1/events/summary", get(summary_handler))
            .route("/v1/uploads", post(presign_handler))
            .route("/v1/uploads/{upload_id}/complete", post(complete_handler))
            .with_state(self.state)
    }
}
