use std::sync::Arc;

use assetdesk_assets::Asset;
use assetdesk_customers::{Customer, Site};
use assetdesk_infra::document_store::{self, InMemoryDocumentStore};
use assetdesk_infra::{DocumentStore, Lifecycle, Placement, Repository, StoreConfig, StoreError};
use assetdesk_infrastructure::InfrastructureLocation;

/// Everything the handlers need, built once around a single document store.
pub struct AppServices {
    store: Arc<dyn DocumentStore>,
    pub customers: Repository<Customer>,
    pub sites: Repository<Site>,
    pub locations: Repository<InfrastructureLocation>,
    pub assets: Repository<Asset>,
    pub lifecycle: Lifecycle,
    pub placement: Placement,
}

impl AppServices {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            customers: Repository::new(store.clone()),
            sites: Repository::new(store.clone()),
            locations: Repository::new(store.clone()),
            assets: Repository::new(store.clone()),
            lifecycle: Lifecycle::new(store.clone()),
            placement: Placement::new(store.clone()),
            store,
        }
    }

    /// Services over a fresh in-memory store (dev/tests).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryDocumentStore::new()))
    }

    /// Open the configured store backend.
    pub async fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        Ok(Self::new(document_store::open(config).await?))
    }

    /// Close the underlying store (once, at shutdown).
    pub async fn close(&self) {
        self.store.close().await;
    }
}
