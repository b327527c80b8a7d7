use std::net::SocketAddr;
use std::sync::Arc;

use clap::Args;
use snafu::ResultExt;
use tokio_util::sync::CancellationToken;
use tracing::info;

use petrel_import_core::{
    CsvImporter, UploadConversionConsumer, UploadMetrics, UploadService,
};
use petrel_ingestor_core::{
    EventBatchConsumer, EventIngestService, EventMetrics, ParquetEventSink,
};
use petrel_metadata_core::{
    InMemoryDatasetCatalog, InMemoryUploadStore, InMemoryUsageStore, MeteringService,
};
use petrel_object_store::{StaticUrlSigner, TemporaryFileSystem};
use petrel_queue::{EventQueue, InMemoryQueueStore, UploadJobQueue};
use petrel_server_http::HttpServer;

use crate::error::{InvalidServerAddressSnafu, IoSnafu, ObjectStoreSnafu, Result};

#[derive(Debug, Args)]
pub struct DevArgs {
    /// The address of the HTTP server.
    #[arg(long, default_value = "127.0.0.1:7780")]
    http_address: String,
}

impl DevArgs {
    /// Run the whole service in-process: in-memory queue store and
    /// repositories, a temporary filesystem object store, both consumers,
    /// and the HTTP server. Nothing persists across restarts.
    pub async fn run(self, ct: CancellationToken) -> Result<()> {
        let http_address = self
            .http_address
            .parse::<SocketAddr>()
            .context(InvalidServerAddressSnafu {})?;

        let _ct_guard = ct.child_token().drop_guard();

        let object_store = TemporaryFileSystem::new().context(ObjectStoreSnafu {})?;

        info!("starting petrel in development mode");
        info!("http server listening on {http_address}");
        info!(
            "object store root path: {}",
            object_store.root_path().display()
        );

        let queue_store = Arc::new(InMemoryQueueStore::new());
        let upload_store = Arc::new(InMemoryUploadStore::new());
        let catalog = Arc::new(InMemoryDatasetCatalog::new());
        let usage = Arc::new(InMemoryUsageStore::new());
        let metering = MeteringService::new(usage);

        let event_queue = EventQueue::new(queue_store.clone());
        let upload_queue = UploadJobQueue::new(queue_store);

        let event_metrics = Arc::new(EventMetrics::default());
        let upload_metrics = Arc::new(UploadMetrics::default());

        let ingest_service = EventIngestService::new(event_queue.clone(), event_metrics.clone());
        let upload_service = UploadService::new(
            upload_store,
            Arc::new(StaticUrlSigner::new(format!(
                "http://{http_address}/dev/uploads"
            ))),
            upload_queue.clone(),
        );

        let event_consumer = EventBatchConsumer::new(
            event_queue,
            Arc::new(ParquetEventSink::new(object_store.store())),
            event_metrics,
            metering.clone(),
        );

        let upload_consumer = UploadConversionConsumer::new(
            upload_queue,
            CsvImporter::new(object_store.store(), catalog),
            upload_metrics,
            metering,
        );

        let http_fut = run_http_server(ingest_service, upload_service, http_address, ct.clone());
        let event_consumer_fut = event_consumer.run(ct.clone());
        let upload_consumer_fut = upload_consumer.run(ct);

        tokio::select! {
            res = http_fut => {
                info!("http server exited with {:?}", res);
            }
            _ = event_consumer_fut => {
                info!("event consumer exited");
            }
            _ = upload_consumer_fut => {
                info!("upload consumer exited");
            }
        }

        Ok(())
    }
}

async fn run_http_server(
    events: EventIngestService,
    uploads: UploadService,
    address: SocketAddr,
    ct: CancellationToken,
) -> Result<()> {
    let app = HttpServer::new(events, uploads).into_router();

    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .context(IoSnafu {})?;

    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        ct.cancelled().await;
    });

    server.await.context(IoSnafu {})
}
