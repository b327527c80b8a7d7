use std::sync::Arc;

use petrel_metadata_core::MeteringService;
use petrel_queue::{QueueError, UploadJobQueue};
use petrel_resources::{file_extension, UploadJobMessage};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::importer::CsvImporter;
use crate::metrics::UploadMetrics;

/// Long-running worker that converts completed uploads.
///
/// The queue is at-least-once; the idempotency mark set at the top of each
/// message is what makes the conversion's effects exactly-once. A crash
/// before the mark causes a safe reprocess; a crash after it loses the
/// message until the mark's TTL expires.
pub struct UploadConversionConsumer {
    queue: UploadJobQueue,
    importer: CsvImporter,
    metrics: Arc<UploadMetrics>,
    metering: MeteringService,
}

impl UploadConversionConsumer {
    pub fn new(
        queue: UploadJobQueue,
        importer: CsvImporter,
        metrics: Arc<UploadMetrics>,
        metering: MeteringService,
    ) -> Self {
        Self {
            queue,
            importer,
            metrics,
            metering,
        }
    }

    /// Run until cancelled. In-flight conversions complete naturally.
    pub async fn run(self, ct: CancellationToken) {
        info!("upload consumer started");

        loop {
            tokio::select! {
                _ = ct.cancelled() => {
                    info!("upload consumer stopped");
                    return;
                }
                result = self.queue.dequeue() => {
                    match result {
                        Err(error) => {
                            warn!(%error, "upload dequeue error");
                        }
                        Ok(None) => {}
                        Ok(Some(msg)) => {
                            self.process_message(&msg).await;
                        }
                    }
                }
            }
        }
    }

    async fn process_message(&self, msg: &UploadJobMessage) {
        let started = Instant::now();

        // The mark happens-before any conversion side effect; this is the
        // at-least-once to exactly-once boundary.
        match self.queue.mark_processed(&msg.upload_id).await {
            Ok(()) => {}
            Err(QueueError::AlreadyProcessed) => {
                debug!(upload_id = %msg.upload_id, "skipping duplicate upload job");
                self.metrics.duplicate.add(1, &[]);
                return;
            }
            Err(error) => {
                warn!(upload_id = %msg.upload_id, %error, "failed to mark upload processed");
                self.enqueue_dlq(msg, &error.to_string()).await;
                return;
            }
        }

        let mut total_rows: i64 = 0;
        let mut files_converted: u64 = 0;
        let mut last_error: Option<String> = None;

        for file in &msg.files {
            // Only CSV is materialized today; other allow-listed extensions
            // are accepted at upload time and left untouched in storage.
            if !is_csv(&file.file_name) {
                debug!(
                    file_name = %file.file_name,
                    upload_id = %msg.upload_id,
                    "skipping non-csv file"
                );
                continue;
            }

            match self.importer.process_file(&msg.tenant_id, file).await {
                Ok(result) => {
                    files_converted += 1;
                    total_rows += result.row_count;
                    info!(
                        file_name = %file.file_name,
                        rows = result.row_count,
                        output_key = %result.output_key,
                        upload_id = %msg.upload_id,
                        "converted file"
                    );
                }
                Err(error) => {
                    warn!(
                        file_name = %file.file_name,
                        upload_id = %msg.upload_id,
                        %error,
                        "file conversion failed"
                    );
                    last_error = Some(error.to_string());
                }
            }
        }

        match last_error {
            Some(reason) => {
                // Files converted before the failure stay written and
                // cataloged; the whole message is still dead-lettered.
                self.metrics.failed.add(1, &[]);
                self.enqueue_dlq(msg, &reason).await;
            }
            None => {
                self.metrics.processed.add(1, &[]);
                let total_bytes: i64 = msg.files.iter().map(|f| f.size_bytes).sum();
                self.metering
                    .record_upload_best_effort(&msg.tenant_id, total_rows, total_bytes)
                    .await;
                self.metering
                    .record_upload_completed_best_effort(&msg.tenant_id)
                    .await;
            }
        }

        self.metrics.files_converted.add(files_converted, &[]);
        self.metrics.rows.add(total_rows.max(0) as u64, &[]);
        self.metrics
            .duration
            .record(started.elapsed().as_secs_f64(), &[]);
    }

    async fn enqueue_dlq(&self, msg: &UploadJobMessage, reason: &str) {
        if let Err(error) = self.queue.enqueue_dlq(msg, reason).await {
            warn!(upload_id = %msg.upload_id, %error, "failed to enqueue upload job to dlq");
        }
    }
}

fn is_csv(file_name: &str) -> bool {
    file_extension(file_name).as_deref() == Some("csv")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_csv_is_case_insensitive() {
        assert!(is_csv("data.csv"));
        assert!(is_csv("DATA.CSV"));
        assert!(!is_csv("data.json"));
        assert!(!is_csv("csv"));
    }
}
