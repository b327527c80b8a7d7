use std::sync::Arc;

use object_store::{path::Path, PutPayload};
use petrel_import_core::{CsvImporter, UploadConversionConsumer, UploadMetrics, UploadService};
use petrel_metadata_core::{
    InMemoryDatasetCatalog, InMemoryUploadStore, InMemoryUsageStore, MeteringService,
};
use petrel_object_store::{StaticUrlSigner, TemporaryFileSystem};
use petrel_queue::{InMemoryQueueStore, UploadJobQueue};

pub const PEOPLE_CSV: &str = "name,age\nalice,25\nbob,30\ncharlie,35\n";

pub struct TestEnv {
    pub queue_store: Arc<InMemoryQueueStore>,
    pub upload_store: Arc<InMemoryUploadStore>,
    pub catalog: Arc<InMemoryDatasetCatalog>,
    pub usage: Arc<InMemoryUsageStore>,
    pub fs: TemporaryFileSystem,
    pub service: UploadService,
}

pub fn new_env() -> TestEnv {
    let queue_store = Arc::new(InMemoryQueueStore::new());
    let upload_store = Arc::new(InMemoryUploadStore::new());
    let catalog = Arc::new(InMemoryDatasetCatalog::new());
    let usage = Arc::new(InMemoryUsageStore::new());
    let fs = TemporaryFileSystem::new().expect("temporary object store");

    let service = UploadService::new(
        upload_store.clone(),
        Arc::new(StaticUrlSigner::new("http://localhost:9000/petrel")),
        UploadJobQueue::new(queue_store.clone()),
    );

    TestEnv {
        queue_store,
        upload_store,
        catalog,
        usage,
        fs,
        service,
    }
}

impl TestEnv {
    pub fn job_queue(&self) -> UploadJobQueue {
        UploadJobQueue::new(self.queue_store.clone())
    }

    pub fn new_consumer(&self) -> UploadConversionConsumer {
        UploadConversionConsumer::new(
            self.job_queue(),
            CsvImporter::new(self.fs.store(), self.catalog.clone()),
            Arc::new(UploadMetrics::default()),
            MeteringService::new(self.usage.clone()),
        )
    }

    pub async fn put_object(&self, key: &str, data: &str) {
        self.fs
            .store()
            .put(&Path::from(key), PutPayload::from(data.as_bytes().to_vec()))
            .await
            .expect("put object");
    }
}
