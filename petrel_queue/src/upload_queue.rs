use std::sync::Arc;

use bytes::Bytes;
use petrel_resources::UploadJobMessage;
use snafu::ResultExt;

use crate::error::{QueueError, Result, SerializationSnafu};
use crate::store::{DeadLetterEntry, QueueStore, DEQUEUE_WAIT, SEEN_TTL};

const INGEST_LIST: &str = "petrel:uploads:ingest";
const DLQ_LIST: &str = "petrel:uploads:dlq";
const SEEN_PREFIX: &str = "petrel:uploads:seen:";

/// The upload pipeline's view of the queue store.
///
/// Unlike events, upload jobs are marked on the consumer side: the queue is
/// at-least-once, and the seen-marker is what guarantees a job's conversion
/// runs at most once inside the TTL window.
#[derive(Clone)]
pub struct UploadJobQueue {
    store: Arc<dyn QueueStore>,
}

impl UploadJobQueue {
    pub fn new(store: Arc<dyn QueueStore>) -> Self {
        Self { store }
    }

    fn seen_key(upload_id: &str) -> String {
        format!("{SEEN_PREFIX}{upload_id}")
    }

    pub async fn enqueue(&self, msg: &UploadJobMessage) -> Result<()> {
        let data = serde_json::to_vec(msg).context(SerializationSnafu {
            message: "marshal upload job",
        })?;

        self.store.push(INGEST_LIST, Bytes::from(data)).await
    }

    /// Pop the next job, waiting up to the bounded dequeue wait.
    pub async fn dequeue(&self) -> Result<Option<UploadJobMessage>> {
        let Some(data) = self.store.pop(INGEST_LIST, DEQUEUE_WAIT).await? else {
            return Ok(None);
        };

        let msg = serde_json::from_slice(&data).context(SerializationSnafu {
            message: "unmarshal upload job",
        })?;

        Ok(Some(msg))
    }

    /// Claim the upload for processing. Fails with
    /// [`QueueError::AlreadyProcessed`] if a prior delivery claimed it.
    pub async fn mark_processed(&self, upload_id: &str) -> Result<()> {
        let claimed = self
            .store
            .set_if_absent(&Self::seen_key(upload_id), SEEN_TTL)
            .await?;

        if !claimed {
            return Err(QueueError::AlreadyProcessed);
        }

        Ok(())
    }

    pub async fn enqueue_dlq(&self, msg: &UploadJobMessage, reason: &str) -> Result<()> {
        let entry = DeadLetterEntry::new(msg.clone(), reason);
        let data = serde_json::to_vec(&entry).context(SerializationSnafu {
            message: "marshal upload dlq entry",
        })?;

        self.store.push(DLQ_LIST, Bytes::from(data)).await
    }

    /// Drain every entry currently on the dead-letter list.
    pub async fn drain_dlq(&self) -> Result<Vec<DeadLetterEntry<UploadJobMessage>>> {
        let mut entries = Vec::new();
        while let Some(data) = self.store.pop(DLQ_LIST, std::time::Duration::ZERO).await? {
            let entry = serde_json::from_slice(&data).context(SerializationSnafu {
                message: "unmarshal upload dlq entry",
            })?;
            entries.push(entry);
        }

        Ok(entries)
    }
}
