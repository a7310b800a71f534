use serde_json::{Map, Value};

use assetdesk_core::DocumentId;

use super::query::Filter;
use crate::error::StoreError;

/// A document as held by the store: its key plus the JSON object body.
///
/// The body never contains the key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: DocumentId,
    pub body: Value,
}

/// Schemaless store of JSON documents grouped in named collections.
///
/// The store enforces no relationships between documents; referential integrity and
/// cascades are the caller's job.
///
/// Implementations must:
/// - assign a fresh [`DocumentId`] on insert
/// - only accept JSON objects as bodies
/// - return `find` results in a stable order (insertion order, or key order for
///   time-ordered keys)
/// - treat `update` as a top-level merge: keys in the patch overwrite, others stay
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn insert(&self, collection: &str, body: Value) -> Result<DocumentId, StoreError>;

    async fn get(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError>;

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, StoreError>;

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<StoredDocument>, StoreError> {
        Ok(self.find(collection, filter).await?.into_iter().next())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Merge `patch` into the document. Returns `false` when no document has `id`.
    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Map<String, Value>,
    ) -> Result<bool, StoreError>;

    /// Returns `false` when no document has `id`.
    async fn delete(&self, collection: &str, id: DocumentId) -> Result<bool, StoreError>;

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError>;

    /// Release backend resources (connection pool). Idempotent.
    async fn close(&self) {}
}
