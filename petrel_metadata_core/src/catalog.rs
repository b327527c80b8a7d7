//! Dataset catalog repository.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use petrel_resources::{Dataset, TenantId};
use snafu::Snafu;
use tokio::sync::RwLock;

/// Catalog error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CatalogError {
    #[snafu(display("dataset not found: {name}"))]
    NotFound { name: String },
    #[snafu(display("catalog error: {message}"))]
    Internal { message: String },
}

pub type Result<T, E = CatalogError> = std::result::Result<T, E>;

/// The registry of materialized datasets.
///
/// Datasets are keyed by `(tenant, name)`; upserting an existing name
/// updates the row in place, keeping the original id and creation time.
#[async_trait]
pub trait DatasetCatalog: Send + Sync {
    async fn upsert(&self, dataset: Dataset) -> Result<Dataset>;

    async fn get(&self, tenant_id: &TenantId, name: &str) -> Result<Dataset>;

    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<Dataset>>;
}

/// In-memory implementation of the dataset catalog.
#[derive(Debug, Default)]
pub struct InMemoryDatasetCatalog {
    datasets: RwLock<HashMap<(TenantId, String), Dataset>>,
}

impl InMemoryDatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetCatalog for InMemoryDatasetCatalog {
    async fn upsert(&self, mut dataset: Dataset) -> Result<Dataset> {
        let mut datasets = self.datasets.write().await;
        let key = (dataset.tenant_id.clone(), dataset.name.clone());

        if let Some(existing) = datasets.get(&key) {
            // Last writer wins, but the row keeps its identity.
            dataset.id = existing.id.clone();
            dataset.created_at = existing.created_at;
        }
        dataset.updated_at = Utc::now();

        datasets.insert(key, dataset.clone());
        Ok(dataset)
    }

    async fn get(&self, tenant_id: &TenantId, name: &str) -> Result<Dataset> {
        let datasets = self.datasets.read().await;
        datasets
            .get(&(tenant_id.clone(), name.to_string()))
            .cloned()
            .ok_or_else(|| CatalogError::NotFound {
                name: name.to_string(),
            })
    }

    async fn list(&self, tenant_id: &TenantId) -> Result<Vec<Dataset>> {
        let datasets = self.datasets.read().await;
        let mut result: Vec<_> = datasets
            .values()
            .filter(|dataset| &dataset.tenant_id == tenant_id)
            .cloned()
            .collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(result)
    }
}
