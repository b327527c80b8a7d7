//! In-memory implementation of the queue store.
//!
//! This implementation keeps lists, markers, and counters in process memory
//! and is suitable for development and testing. All data is lost when the
//! process stops. TTL deadlines use the tokio clock so tests can pause and
//! advance time.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::{Mutex, Notify};
use tokio::time::Instant;

use crate::error::Result;
use crate::store::QueueStore;

#[derive(Default)]
struct QueueState {
    /// FIFO lists keyed by list name.
    lists: HashMap<String, VecDeque<Bytes>>,
    /// Marker keys with their expiry deadline.
    markers: HashMap<String, Instant>,
    /// Counter fields keyed by counter key.
    counters: HashMap<String, HashMap<String, i64>>,
}

/// In-memory queue store.
#[derive(Default)]
pub struct InMemoryQueueStore {
    state: Mutex<QueueState>,
    push_notify: Notify,
}

impl InMemoryQueueStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl QueueStore for InMemoryQueueStore {
    async fn push(&self, list: &str, payload: Bytes) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .lists
            .entry(list.to_string())
            .or_default()
            .push_back(payload);
        drop(state);

        self.push_notify.notify_waiters();

        Ok(())
    }

    async fn pop(&self, list: &str, wait: Duration) -> Result<Option<Bytes>> {
        let deadline = Instant::now() + wait;

        loop {
            // Register for wakeups before checking the list, so a push
            // between the check and the wait is not missed.
            let notified = self.push_notify.notified();

            {
                let mut state = self.state.lock().await;
                if let Some(item) = state.lists.get_mut(list).and_then(VecDeque::pop_front) {
                    return Ok(Some(item));
                }
            }

            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return Ok(None);
            }
        }
    }

    async fn set_if_absent(&self, key: &str, ttl: Duration) -> Result<bool> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        match state.markers.get(key) {
            Some(expires_at) if *expires_at > now => Ok(false),
            _ => {
                state.markers.insert(key.to_string(), now + ttl);
                Ok(true)
            }
        }
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut state = self.state.lock().await;
        let now = Instant::now();

        match state.markers.get(key) {
            Some(expires_at) if *expires_at > now => Ok(true),
            Some(_) => {
                // Expired markers are purged lazily.
                state.markers.remove(key);
                Ok(false)
            }
            None => Ok(false),
        }
    }

    async fn increment_counter(&self, key: &str, field: &str, delta: i64) -> Result<()> {
        let mut state = self.state.lock().await;
        *state
            .counters
            .entry(key.to_string())
            .or_default()
            .entry(field.to_string())
            .or_default() += delta;

        Ok(())
    }

    async fn read_counters(&self, key: &str) -> Result<HashMap<String, i64>> {
        let state = self.state.lock().await;
        Ok(state.counters.get(key).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lists_are_fifo() {
        let store = InMemoryQueueStore::new();

        store.push("work", Bytes::from_static(b"a")).await.unwrap();
        store.push("work", Bytes::from_static(b"b")).await.unwrap();

        let first = store.pop("work", Duration::from_secs(1)).await.unwrap();
        let second = store.pop("work", Duration::from_secs(1)).await.unwrap();

        assert_eq!(first, Some(Bytes::from_static(b"a")));
        assert_eq!(second, Some(Bytes::from_static(b"b")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_times_out_on_empty_list() {
        let store = InMemoryQueueStore::new();

        let item = store.pop("work", Duration::from_secs(5)).await.unwrap();
        assert_eq!(item, None);
    }

    #[tokio::test]
    async fn test_pop_wakes_on_push() {
        let store = std::sync::Arc::new(InMemoryQueueStore::new());

        let popper = tokio::spawn({
            let store = store.clone();
            async move { store.pop("work", Duration::from_secs(30)).await.unwrap() }
        });

        tokio::task::yield_now().await;
        store.push("work", Bytes::from_static(b"x")).await.unwrap();

        let item = popper.await.unwrap();
        assert_eq!(item, Some(Bytes::from_static(b"x")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_if_absent_respects_ttl() {
        let store = InMemoryQueueStore::new();
        let ttl = Duration::from_secs(60);

        assert!(store.set_if_absent("seen:k", ttl).await.unwrap());
        assert!(!store.set_if_absent("seen:k", ttl).await.unwrap());
        assert!(store.exists("seen:k").await.unwrap());

        tokio::time::advance(Duration::from_secs(61)).await;

        assert!(!store.exists("seen:k").await.unwrap());
        assert!(store.set_if_absent("seen:k", ttl).await.unwrap());
    }

    #[tokio::test]
    async fn test_counters_accumulate() {
        let store = InMemoryQueueStore::new();

        store.increment_counter("counts:t1", "page_view", 1).await.unwrap();
        store.increment_counter("counts:t1", "page_view", 2).await.unwrap();
        store.increment_counter("counts:t1", "signup", 1).await.unwrap();

        let counts = store.read_counters("counts:t1").await.unwrap();
        assert_eq!(counts.get("page_view"), Some(&3));
        assert_eq!(counts.get("signup"), Some(&1));
        assert!(store.read_counters("counts:t2").await.unwrap().is_empty());
    }
}
