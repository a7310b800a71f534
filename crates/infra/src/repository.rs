//! Typed access to one collection of the document store.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};

use assetdesk_core::{DomainError, Entity, Record};

use crate::document_store::{DocumentStore, Filter, StoredDocument};
use crate::error::{ServiceResult, StoreError};

/// Repository for documents of entity `T`, stored in `T::KIND.collection()`.
pub struct Repository<T: Entity> {
    store: Arc<dyn DocumentStore>,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self::new(self.store.clone())
    }
}

impl<T: Entity> Repository<T> {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn collection() -> &'static str {
        T::KIND.collection()
    }

    pub async fn get(&self, id: T::Id) -> ServiceResult<Option<Record<T>>> {
        let doc = self.store.get(Self::collection(), id.into()).await?;
        Ok(doc.map(decode::<T>).transpose()?)
    }

    /// Like [`Repository::get`], but a missing document is `NotFound`.
    pub async fn fetch(&self, id: T::Id) -> ServiceResult<Record<T>> {
        self.get(id)
            .await?
            .ok_or_else(|| DomainError::not_found(T::KIND).into())
    }

    pub async fn find(&self, filter: &Filter) -> ServiceResult<Vec<Record<T>>> {
        let docs = self.store.find(Self::collection(), filter).await?;
        Ok(docs
            .into_iter()
            .map(decode::<T>)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn find_one(&self, filter: &Filter) -> ServiceResult<Option<Record<T>>> {
        let doc = self.store.find_one(Self::collection(), filter).await?;
        Ok(doc.map(decode::<T>).transpose()?)
    }

    pub async fn count(&self, filter: &Filter) -> ServiceResult<u64> {
        Ok(self.store.count(Self::collection(), filter).await?)
    }

    pub async fn insert(&self, body: T) -> ServiceResult<Record<T>> {
        let value = serde_json::to_value(&body)
            .map_err(|e| StoreError::InvalidDocument(format!("{} encoding failed: {e}", T::KIND)))?;
        let id = self.store.insert(Self::collection(), value).await?;
        Ok(Record::new(id, body))
    }

    /// Merge `patch` into the stored document and return the reloaded result.
    ///
    /// `None` when no document has `id`.
    pub async fn update<P>(&self, id: T::Id, patch: &P) -> ServiceResult<Option<Record<T>>>
    where
        P: Serialize + Sync,
    {
        let patch = encode_object::<T, _>(patch)?;
        if !self.store.update(Self::collection(), id.into(), patch).await? {
            return Ok(None);
        }
        self.get(id).await
    }

    pub async fn delete(&self, id: T::Id) -> ServiceResult<bool> {
        Ok(self.store.delete(Self::collection(), id.into()).await?)
    }

    pub async fn delete_many(&self, filter: &Filter) -> ServiceResult<u64> {
        Ok(self.store.delete_many(Self::collection(), filter).await?)
    }
}

fn decode<T: Entity>(doc: StoredDocument) -> Result<Record<T>, StoreError> {
    let body: T = serde_json::from_value(doc.body)
        .map_err(|e| StoreError::Decode(format!("{} {}: {e}", T::KIND, doc.id)))?;
    Ok(Record::new(doc.id, body))
}

fn encode_object<T: Entity, P: Serialize>(patch: &P) -> Result<Map<String, Value>, StoreError> {
    match serde_json::to_value(patch) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(StoreError::InvalidDocument(format!(
            "{} update must be a JSON object",
            T::KIND
        ))),
        Err(e) => Err(StoreError::InvalidDocument(format!(
            "{} update encoding failed: {e}",
            T::KIND
        ))),
    }
}
