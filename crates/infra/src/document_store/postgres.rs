//! Postgres-backed document store.
//!
//! Every collection shares one JSONB table keyed by `(collection, id)`. Filters are
//! evaluated with JSONB containment (`body @> $filter`), updates with a top-level
//! merge (`body || $patch`).
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (unique violation `23505`) | `InvalidDocument` | Key collision on insert |
//! | Database (other) | `Query` | Malformed statement, constraint failure |
//! | PoolClosed / PoolTimedOut / Io / Tls | `Unavailable` | Connectivity |
//! | ColumnDecode / Decode | `Decode` | Row does not carry the expected columns |
//! | Other | `Query` | Anything else |

use serde_json::{Map, Value};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use assetdesk_core::DocumentId;

use super::query::Filter;
use super::r#trait::{DocumentStore, StoredDocument};
use crate::error::StoreError;

const BOOTSTRAP: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS documents (
        collection TEXT NOT NULL,
        id UUID NOT NULL,
        body JSONB NOT NULL,
        PRIMARY KEY (collection, id)
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS documents_body_idx
        ON documents USING GIN (body jsonb_path_ops)
    "#,
];

/// Postgres JSONB document store.
///
/// Uses an SQLx connection pool, so the store is `Send + Sync` and cheap to share.
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect and make sure the documents table exists.
    #[instrument(skip(url), err)]
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;

        let store = Self::new(pool);
        store.bootstrap().await?;
        Ok(store)
    }

    async fn bootstrap(&self) -> Result<(), StoreError> {
        for statement in BOOTSTRAP {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(|e| map_sqlx_error("bootstrap", e))?;
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip(self, body), err)]
    async fn insert(&self, collection: &str, body: Value) -> Result<DocumentId, StoreError> {
        if !body.is_object() {
            return Err(StoreError::InvalidDocument(format!(
                "{collection} documents must be JSON objects"
            )));
        }

        let id = DocumentId::new();
        sqlx::query("INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3)")
            .bind(collection)
            .bind(id.as_uuid())
            .bind(&body)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(id)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn get(
        &self,
        collection: &str,
        id: DocumentId,
    ) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query("SELECT id, body FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(document_from_row).transpose()
    }

    #[instrument(skip(self, filter), err)]
    async fn find(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, body
            FROM documents
            WHERE collection = $1
              AND body @> $2
              AND ($3::uuid IS NULL OR id <> $3)
            ORDER BY id ASC
            "#,
        )
        .bind(collection)
        .bind(filter.to_containment())
        .bind(excluded(filter))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("find", e))?;

        rows.iter().map(document_from_row).collect()
    }

    #[instrument(skip(self, filter), err)]
    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total
            FROM documents
            WHERE collection = $1
              AND body @> $2
              AND ($3::uuid IS NULL OR id <> $3)
            "#,
        )
        .bind(collection)
        .bind(filter.to_containment())
        .bind(excluded(filter))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("count", e))?;

        let total: i64 = row
            .try_get("total")
            .map_err(|e| map_sqlx_error("count", e))?;
        Ok(total.max(0) as u64)
    }

    #[instrument(skip(self, patch), fields(id = %id), err)]
    async fn update(
        &self,
        collection: &str,
        id: DocumentId,
        patch: Map<String, Value>,
    ) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET body = body || $3 WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id.as_uuid())
        .bind(Value::Object(patch))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), fields(id = %id), err)]
    async fn delete(&self, collection: &str, id: DocumentId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, filter), err)]
    async fn delete_many(&self, collection: &str, filter: &Filter) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            DELETE FROM documents
            WHERE collection = $1
              AND body @> $2
              AND ($3::uuid IS NULL OR id <> $3)
            "#,
        )
        .bind(collection)
        .bind(filter.to_containment())
        .bind(excluded(filter))
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("delete_many", e))?;
        Ok(result.rows_affected())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

fn excluded(filter: &Filter) -> Option<Uuid> {
    filter.excluded().map(Uuid::from)
}

fn document_from_row(row: &PgRow) -> Result<StoredDocument, StoreError> {
    let id: Uuid = row.try_get("id").map_err(|e| map_sqlx_error("decode_row", e))?;
    let body: Value = row
        .try_get("body")
        .map_err(|e| map_sqlx_error("decode_row", e))?;
    Ok(StoredDocument {
        id: DocumentId::from_uuid(id),
        body,
    })
}

/// Map SQLx errors to `StoreError`.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {}: {}", operation, db_err.message());
            match db_err.code().as_deref() {
                Some("23505") => StoreError::InvalidDocument(msg),
                _ => StoreError::Query(msg),
            }
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {}", operation))
        }
        sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool timed out in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {}: {}", operation, e)),
        sqlx::Error::Tls(e) => {
            StoreError::Unavailable(format!("tls error in {}: {}", operation, e))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            StoreError::Decode(format!("{} in {}", err, operation))
        }
        _ => StoreError::Query(format!("sqlx error in {}: {}", operation, err)),
    }
}
