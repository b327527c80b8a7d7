use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use petrel_metadata_core::MeteringService;
use petrel_queue::EventQueue;
use petrel_resources::{EventMessage, TenantId};
use tokio::sync::Mutex;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::metrics::EventMetrics;
use crate::sink::EventSink;

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(30);

struct Buffer {
    events: Vec<EventMessage>,
    last_flush: Instant,
}

/// Long-running worker that materializes queued events.
///
/// Buffers dequeued messages and flushes when the buffer reaches the batch
/// size or the flush interval elapses, whichever comes first; this bounds
/// both delivery latency and per-file size. On shutdown the current buffer
/// is drained with one final flush.
pub struct EventBatchConsumer {
    queue: EventQueue,
    sink: Arc<dyn EventSink>,
    metrics: Arc<EventMetrics>,
    metering: MeteringService,
    batch_size: usize,
    flush_interval: Duration,
    buffer: Mutex<Buffer>,
}

impl EventBatchConsumer {
    pub fn new(
        queue: EventQueue,
        sink: Arc<dyn EventSink>,
        metrics: Arc<EventMetrics>,
        metering: MeteringService,
    ) -> Self {
        Self {
            queue,
            sink,
            metrics,
            metering,
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: DEFAULT_FLUSH_INTERVAL,
            buffer: Mutex::new(Buffer {
                events: Vec::with_capacity(DEFAULT_BATCH_SIZE),
                last_flush: Instant::now(),
            }),
        }
    }

    /// Override the flush thresholds.
    pub fn with_thresholds(mut self, batch_size: usize, flush_interval: Duration) -> Self {
        self.batch_size = batch_size;
        self.flush_interval = flush_interval;
        self
    }

    /// Run until cancelled, then drain the buffer and exit.
    pub async fn run(self, ct: CancellationToken) {
        info!("event consumer started");

        let mut flush_timer = tokio::time::interval(self.flush_interval);
        flush_timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ct.cancelled() => {
                    // Buffered events are not dropped on shutdown.
                    self.flush().await;
                    info!("event consumer stopped");
                    return;
                }
                _ = flush_timer.tick() => {
                    let time_elapsed = {
                        let buffer = self.buffer.lock().await;
                        !buffer.events.is_empty()
                            && buffer.last_flush.elapsed() >= self.flush_interval
                    };

                    if time_elapsed {
                        self.flush().await;
                    }
                }
                result = self.queue.dequeue() => {
                    match result {
                        Err(error) => {
                            warn!(%error, "event dequeue error");
                        }
                        Ok(None) => {}
                        Ok(Some(msg)) => {
                            let size_reached = {
                                let mut buffer = self.buffer.lock().await;
                                buffer.events.push(msg);
                                buffer.events.len() >= self.batch_size
                            };

                            if size_reached {
                                self.flush().await;
                            }
                        }
                    }
                }
            }
        }
    }

    /// Swap out the buffer and materialize it, one file per tenant.
    ///
    /// Partitions are independent: a failing tenant goes to the dead-letter
    /// list without blocking the other tenants in the same flush.
    async fn flush(&self) {
        let batch = {
            let mut buffer = self.buffer.lock().await;
            if buffer.events.is_empty() {
                return;
            }
            buffer.last_flush = Instant::now();
            std::mem::take(&mut buffer.events)
        };

        let mut by_tenant: HashMap<TenantId, Vec<EventMessage>> = HashMap::new();
        for msg in batch {
            by_tenant.entry(msg.tenant_id.clone()).or_default().push(msg);
        }

        for (tenant_id, events) in by_tenant {
            let started = Instant::now();

            match self.sink.write_partition(&tenant_id, &events).await {
                Ok(object_key) => {
                    info!(%tenant_id, count = events.len(), %object_key, "flushed event batch");
                    self.metrics.processed.add(events.len() as u64, &[]);
                    self.metering
                        .record_events_best_effort(&tenant_id, events.len() as i64)
                        .await;
                }
                Err(error) => {
                    warn!(%tenant_id, count = events.len(), %error, "event batch write failed");
                    self.metrics.failed.add(events.len() as u64, &[]);

                    // Retry is an operator concern: the whole partition goes
                    // to the dead-letter list, not back onto the queue.
                    let reason = error.to_string();
                    for msg in &events {
                        if let Err(dlq_error) = self.queue.enqueue_dlq(msg, &reason).await {
                            warn!(event_id = %msg.event_id, %dlq_error, "failed to enqueue event to dlq");
                        }
                    }
                }
            }

            self.metrics.batch_size.record(events.len() as u64, &[]);
            self.metrics
                .batch_duration
                .record(started.elapsed().as_secs_f64(), &[]);
        }
    }
}
