use petrel_observability::{Counter, Histogram};

pub struct UploadMetrics {
    pub processed: Counter<u64>,
    pub failed: Counter<u64>,
    pub duplicate: Counter<u64>,
    pub files_converted: Counter<u64>,
    pub rows: Counter<u64>,
    pub duration: Histogram<f64>,
}

impl Default for UploadMetrics {
    fn default() -> Self {
        let meter = petrel_observability::meter("petrel-uploads");
        Self {
            processed: meter
                .u64_counter("uploads.processed")
                .with_description("upload jobs processed by the conversion consumer")
                .build(),
            failed: meter
                .u64_counter("uploads.failed")
                .with_description("upload jobs routed to the dead-letter list")
                .build(),
            duplicate: meter
                .u64_counter("uploads.duplicate")
                .with_description("duplicate upload job deliveries dropped")
                .build(),
            files_converted: meter
                .u64_counter("uploads.files_converted")
                .with_description("tabular files converted to parquet")
                .build(),
            rows: meter
                .u64_counter("uploads.rows")
                .with_description("rows imported from uploaded files")
                .build(),
            duration: meter
                .f64_histogram("uploads.duration")
                .with_unit("s")
                .with_description("time to process an upload job")
                .build(),
        }
    }
}
