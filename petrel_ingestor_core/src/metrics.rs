use petrel_observability::{Counter, Histogram};

pub struct EventMetrics {
    pub received: Counter<u64>,
    pub enqueued: Counter<u64>,
    pub duplicate: Counter<u64>,
    pub processed: Counter<u64>,
    pub failed: Counter<u64>,
    pub batch_size: Histogram<u64>,
    pub batch_duration: Histogram<f64>,
}

impl Default for EventMetrics {
    fn default() -> Self {
        let meter = petrel_observability::meter("petrel-events");
        Self {
            received: meter
                .u64_counter("events.received")
                .with_description("events received by the ingest service")
                .build(),
            enqueued: meter
                .u64_counter("events.enqueued")
                .with_description("events enqueued successfully")
                .build(),
            duplicate: meter
                .u64_counter("events.duplicate")
                .with_description("duplicate events rejected")
                .build(),
            processed: meter
                .u64_counter("events.processed")
                .with_description("events materialized by the batch consumer")
                .build(),
            failed: meter
                .u64_counter("events.failed")
                .with_description("events routed to the dead-letter list")
                .build(),
            batch_size: meter
                .u64_histogram("events.batch_size")
                .with_unit("{event}")
                .with_description("events per flushed partition")
                .build(),
            batch_duration: meter
                .f64_histogram("events.batch_duration")
                .with_unit("s")
                .with_description("time to materialize a partition")
                .build(),
        }
    }
}
