use std::collections::HashMap;
use std::sync::RwLock;

use serde_json::{Map, Value};

use assetdesk_core::DocumentId;

use super::query::Filter;
use super::r#trait::{DocumentStore, StoredDocument};
use crate::error::StoreError;

/// In-memory document store.
///
/// Intended for tests/dev. Collections keep insertion order; lookups are linear scans.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    collections: RwLock<HashMap<String, Vec<StoredDocument>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn insert(&self, collection: &str, body: Value) -> Result<DocumentId, StoreError> {
        if !body.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "{collection} documents must be JSON objects"
            )));
        }

        let id = DocumentId::new();
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        collections
            .entry(collection.to_string())
            .or_default()
            .push(StoredDocument { id, body });
        Ok(id)
    }

    async fn get(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .cloned())
    }

    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(d.id, &d.body))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let collections = self.collections.read().map_err(|_| StoreError::Poisoned)?;
        let count = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .filter(|d| filter.matches(d.id, &d.body))
                    .count()
            })
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let Some(doc) = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|d| d.id == id))
        else {
            return Ok(false);
        };

        match &mut doc.body {
            Value::Object(body) => {
                body.extend(patch);
                Ok(true)
            }
            _ => Err(StoreError::InvalidDocument(format!(
                "{collection}/{id} is not a JSON object"
            ))),
        }
    }

    async fn delete(&self, collection: &str, id: DocumentId) -> Result<bool, StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(false);
        };
        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() < before)
    }

    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().map_err(|_| StoreError::Poisoned)?;
        let Some(docs) = collections.get_mut(collection) else {
            return Ok(0);
        };
        let before = docs.len();
        docs.retain(|d| !filter.matches(d.id, &d.body));
        Ok((before - docs.len()) as u64)
    }
}
