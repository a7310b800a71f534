//! Collection-oriented document store boundary.
//!
//! Handlers and orchestrators only see [`DocumentStore`]; the backend (in-memory for
//! tests/dev, Postgres JSONB for persistence) is chosen once at startup by [`open`].

pub mod in_memory;
pub mod postgres;
pub mod query;
pub mod r#trait;

use std::sync::Arc;

pub use in_memory::InMemoryDocumentStore;
pub use postgres::PostgresDocumentStore;
pub use query::Filter;
pub use r#trait::{DocumentStore, StoredDocument};

use crate::config::StoreConfig;
use crate::error::StoreError;

/// Open the configured backend. Call once per process and [`DocumentStore::close`] it
/// on shutdown.
pub async fn open(config: &StoreConfig) -> Result<Arc<dyn DocumentStore>, StoreError> {
    match config {
        StoreConfig::InMemory => {
            tracing::info!("using in-memory document store");
            Ok(Arc::new(InMemoryDocumentStore::new()))
        }
        StoreConfig::Postgres {
            url,
            max_connections,
        } => {
            tracing::info!(max_connections, "connecting to postgres document store");
            let store = PostgresDocumentStore::connect(url, *max_connections).await?;
            Ok(Arc::new(store))
        }
    }
}
