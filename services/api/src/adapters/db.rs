//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DocumentStore` port from the `core` crate. Every collection lives in a
//! single PostgreSQL table with a JSONB body, accessed through `sqlx`.

use async_trait::async_trait;
use figure8_core::ports::{Document, DocumentStore, Filter, PortError, PortResult};
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DocumentStore` port.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    /// Creates a new `PgDocumentStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the `documents` table if needed.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }

    async fn exists(&self, collection: &str, id: &str) -> PortResult<bool> {
        let found: Option<(i32,)> =
            sqlx::query_as("SELECT 1 FROM documents WHERE collection = $1 AND id = $2")
                .bind(collection)
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(found.is_some())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn not_found(collection: &str, id: &str) -> PortError {
    PortError::NotFound(format!("Document {}/{} not found", collection, id))
}

//=========================================================================================
// `DocumentStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn get(&self, collection: &str, filter: &Filter) -> PortResult<Vec<Document>> {
        let rows: Vec<(Json<Value>,)> = sqlx::query_as(
            "SELECT body FROM documents WHERE collection = $1 AND body -> $2 = $3 ORDER BY id",
        )
        .bind(collection)
        .bind(&filter.field)
        .bind(Json(&filter.equals))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(rows.into_iter().map(|(Json(body),)| body).collect())
    }

    async fn set(&self, collection: &str, id: &str, mut document: Document) -> PortResult<()> {
        let object = document.as_object_mut().ok_or_else(|| {
            PortError::Unexpected(format!("Document {}/{} is not a JSON object", collection, id))
        })?;
        object.insert("id".to_string(), Value::String(id.to_string()));

        sqlx::query(
            "INSERT INTO documents (collection, id, body) VALUES ($1, $2, $3) \
             ON CONFLICT (collection, id) DO UPDATE SET body = EXCLUDED.body, updated_at = now()",
        )
        .bind(collection)
        .bind(id)
        .bind(Json(&document))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    /// A single conditional UPDATE, so concurrent appends never overwrite each
    /// other and an element that is already present is not added twice.
    async fn update_append(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE documents \
             SET body = jsonb_set(body, ARRAY[$3::text], \
                     COALESCE(body -> $3, '[]'::jsonb) || jsonb_build_array($4::jsonb)), \
                 updated_at = now() \
             WHERE collection = $1 AND id = $2 \
               AND NOT (COALESCE(body -> $3, '[]'::jsonb) @> jsonb_build_array($4::jsonb))",
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(Json(&value))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        // Zero rows means either a missing document or an element already there.
        if result.rows_affected() == 0 && !self.exists(collection, id).await? {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    async fn update_field(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        value: Value,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE documents SET body = jsonb_set(body, ARRAY[$3::text], $4::jsonb, true), \
                 updated_at = now() \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(field)
        .bind(Json(&value))
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(not_found(collection, id));
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = $1 AND id = $2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
