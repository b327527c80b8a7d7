use std::collections::HashMap;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// How long an idempotency marker is kept before it may be reused.
///
/// Messages redelivered after this window will be reprocessed; a bounded
/// risk accepted in exchange for a bounded ledger.
pub const SEEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Bounded wait for a blocking dequeue, so worker loops can observe flush
/// timers and shutdown without a busy loop.
pub const DEQUEUE_WAIT: Duration = Duration::from_secs(5);

/// The queue store contract shared by both pipelines.
///
/// Lists are FIFO; keys are TTL-bounded existence records whose atomic
/// set-if-absent is the exactly-once-effect boundary. Counters back the
/// best-effort event summaries and are advisory.
#[async_trait::async_trait]
pub trait QueueStore: Send + Sync {
    /// Append a payload to the tail of a list.
    async fn push(&self, list: &str, payload: Bytes) -> Result<()>;

    /// Pop the head of a list, waiting up to `wait` for an item to appear.
    async fn pop(&self, list: &str, wait: Duration) -> Result<Option<Bytes>>;

    /// Atomically create a key with a TTL. Returns `false` if the key
    /// already exists and has not expired.
    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool>;

    /// Whether a key exists and has not expired.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Increment a counter field under a key.
    async fn increment_counter(&self, key: &str, field: &str, delta: i64) -> Result<()>;

    /// Read all counter fields under a key.
    async fn read_counters(&self, key: &str) -> Result<HashMap<String, i64>>;
}

/// A message that failed processing, wrapped with its failure reason for
/// later inspection or replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetterEntry<T> {
    pub message: T,
    pub reason: String,
    pub time: DateTime<Utc>,
}

impl<T> DeadLetterEntry<T> {
    pub fn new(message: T, reason: impl Into<String>) -> Self {
        Self {
            message,
            reason: reason.into(),
            time: Utc::now(),
        }
    }
}
