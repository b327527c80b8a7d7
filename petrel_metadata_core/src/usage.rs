//! Usage metering repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use petrel_resources::{TenantId, UsageDaily, UsageEvent};
use snafu::Snafu;
use tokio::sync::RwLock;

/// Usage store error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum UsageError {
    #[snafu(display("usage store error: {message}"))]
    Internal { message: String },
}

pub type Result<T, E = UsageError> = std::result::Result<T, E>;

/// Sink for usage counters and audit events.
///
/// Counters are advisory within the pipeline: callers decide whether a
/// failure propagates (see [`crate::MeteringService`]).
#[async_trait]
pub trait UsageStore: Send + Sync {
    async fn increment_events(&self, tenant_id: &TenantId, date: NaiveDate, delta: i64)
        -> Result<()>;

    async fn increment_rows(&self, tenant_id: &TenantId, date: NaiveDate, delta: i64)
        -> Result<()>;

    async fn increment_storage(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
        delta_bytes: i64,
    ) -> Result<()>;

    async fn increment_uploads(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
        delta: i64,
    ) -> Result<()>;

    async fn record_event(&self, event: UsageEvent) -> Result<()>;

    async fn daily(&self, tenant_id: &TenantId, date: NaiveDate) -> Result<UsageDaily>;
}

#[derive(Debug, Default)]
struct UsageState {
    daily: HashMap<(TenantId, NaiveDate), UsageDaily>,
    events: Vec<UsageEvent>,
}

/// In-memory implementation of the usage store.
#[derive(Debug, Default)]
pub struct InMemoryUsageStore {
    state: RwLock<UsageState>,
}

impl InMemoryUsageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of audit events recorded so far.
    pub async fn recorded_events(&self) -> usize {
        self.state.read().await.events.len()
    }
}

#[async_trait]
impl UsageStore for InMemoryUsageStore {
    async fn increment_events(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
        delta: i64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .daily
            .entry((tenant_id.clone(), date))
            .or_default()
            .events_count += delta;
        Ok(())
    }

    async fn increment_rows(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
        delta: i64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .daily
            .entry((tenant_id.clone(), date))
            .or_default()
            .rows_count += delta;
        Ok(())
    }

    async fn increment_storage(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
        delta_bytes: i64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .daily
            .entry((tenant_id.clone(), date))
            .or_default()
            .storage_bytes += delta_bytes;
        Ok(())
    }

    async fn increment_uploads(
        &self,
        tenant_id: &TenantId,
        date: NaiveDate,
        delta: i64,
    ) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .daily
            .entry((tenant_id.clone(), date))
            .or_default()
            .uploads_count += delta;
        Ok(())
    }

    async fn record_event(&self, event: UsageEvent) -> Result<()> {
        let mut state = self.state.write().await;
        state.events.push(event);
        Ok(())
    }

    async fn daily(&self, tenant_id: &TenantId, date: NaiveDate) -> Result<UsageDaily> {
        let state = self.state.read().await;
        Ok(state
            .daily
            .get(&(tenant_id.clone(), date))
            .cloned()
            .unwrap_or_default())
    }
}
