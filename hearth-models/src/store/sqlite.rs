//! SQLite-backed entity store.
//!
//! Documents are JSON bodies in the `documents` table; a batch commit runs
//! inside a single SQLite transaction so either every staged op lands or
//! none does. Blobs are stored inline in the `blobs` table.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, ErrorCode, OptionalExtension};
use tracing::{debug, warn};

use hearth_core::constants::BLOB_URL_SCHEME;
use hearth_core::error::{HearthError, StoreError, StoreResult};

use super::{BatchOp, BlobStore, EntityStore, WriteBatch};
use crate::db::Database;
use crate::document::{merge_fields, Collection, Document};
use crate::id::EntityId;

/// [`EntityStore`] and [`BlobStore`] over the pooled SQLite [`Database`].
#[derive(Clone)]
pub struct SqliteStore {
    database: Database,
    max_blob_bytes: u64,
}

impl SqliteStore {
    pub fn new(database: Database, max_blob_bytes: u64) -> Self {
        Self {
            database,
            max_blob_bytes,
        }
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Bytes of an uploaded blob.
    pub fn read_blob(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        let conn = self.database.conn().map_err(pool_error)?;
        conn.query_row("SELECT bytes FROM blobs WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .map_err(classify)
    }
}

fn pool_error(err: HearthError) -> StoreError {
    StoreError::Unavailable(err.to_string())
}

/// Map a SQLite failure onto the store error taxonomy.
fn classify(err: rusqlite::Error) -> StoreError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        match failure.code {
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull
            | ErrorCode::OutOfMemory => return StoreError::Unavailable(err.to_string()),
            ErrorCode::OperationInterrupted | ErrorCode::OperationAborted => {
                return StoreError::Aborted
            }
            _ => {}
        }
    }
    StoreError::Rejected(err.to_string())
}

fn parse_body(collection: Collection, id: &str, body: &str) -> StoreResult<Document> {
    serde_json::from_str(body).map_err(|e| {
        StoreError::Rejected(format!("corrupt document {collection}/{id}: {e}"))
    })
}

fn encode_body(document: &Document) -> StoreResult<String> {
    serde_json::to_string(document).map_err(|e| StoreError::Rejected(e.to_string()))
}

#[async_trait]
impl EntityStore for SqliteStore {
    async fn get(&self, collection: Collection, id: &EntityId) -> StoreResult<Option<Document>> {
        let conn = self.database.conn().map_err(pool_error)?;
        let body: Option<String> = conn
            .query_row(
                "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                params![collection.as_str(), id.as_str()],
                |row| row.get(0),
            )
            .optional()
            .map_err(classify)?;

        body.map(|b| parse_body(collection, id.as_str(), &b)).transpose()
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut conn = self.database.conn().map_err(pool_error)?;
        let tx = conn.transaction().map_err(classify)?;
        let now = Utc::now().to_rfc3339();

        for op in batch.ops() {
            match op {
                BatchOp::Set { collection, id, document } => {
                    tx.execute(
                        "INSERT INTO documents (collection, id, body, created_at, updated_at)
                         VALUES (?1, ?2, ?3, ?4, ?4)
                         ON CONFLICT(collection, id) DO UPDATE SET
                             body = excluded.body,
                             updated_at = excluded.updated_at",
                        params![collection.as_str(), id.as_str(), encode_body(document)?, now],
                    )
                    .map_err(classify)?;
                }
                BatchOp::Update { collection, id, fields } => {
                    let body: Option<String> = tx
                        .query_row(
                            "SELECT body FROM documents WHERE collection = ?1 AND id = ?2",
                            params![collection.as_str(), id.as_str()],
                            |row| row.get(0),
                        )
                        .optional()
                        .map_err(classify)?;

                    // Returning here drops `tx`, which rolls back earlier ops.
                    let Some(body) = body else {
                        warn!("update target {collection}/{id} missing, rolling back batch");
                        return Err(StoreError::NotFound {
                            collection: collection.to_string(),
                            id: id.to_string(),
                        });
                    };

                    let mut document = parse_body(*collection, id.as_str(), &body)?;
                    merge_fields(&mut document, fields);
                    tx.execute(
                        "UPDATE documents SET body = ?3, updated_at = ?4
                         WHERE collection = ?1 AND id = ?2",
                        params![collection.as_str(), id.as_str(), encode_body(&document)?, now],
                    )
                    .map_err(classify)?;
                }
            }
        }

        tx.commit().map_err(classify)?;
        debug!("sqlite store: committed batch of {} op(s)", batch.len());
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &EntityId) -> StoreResult<()> {
        let conn = self.database.conn().map_err(pool_error)?;
        conn.execute(
            "DELETE FROM documents WHERE collection = ?1 AND id = ?2",
            params![collection.as_str(), id.as_str()],
        )
        .map_err(classify)?;
        Ok(())
    }

    async fn list_ids(&self, collection: Collection) -> StoreResult<Vec<EntityId>> {
        let conn = self.database.conn().map_err(pool_error)?;
        let mut stmt = conn
            .prepare(
                "SELECT id FROM documents WHERE collection = ?1
                 ORDER BY created_at ASC, id ASC",
            )
            .map_err(classify)?;
        let ids = stmt
            .query_map([collection.as_str()], |row| row.get::<_, String>(0))
            .map_err(classify)?
            .collect::<Result<Vec<_>, _>>()
            .map_err(classify)?;
        Ok(ids.into_iter().map(EntityId::from).collect())
    }
}

#[async_trait]
impl BlobStore for SqliteStore {
    async fn upload_blob(&self, key: &str, bytes: &[u8]) -> StoreResult<String> {
        if bytes.len() as u64 > self.max_blob_bytes {
            return Err(StoreError::Rejected(format!(
                "blob of {} bytes exceeds limit of {}",
                bytes.len(),
                self.max_blob_bytes
            )));
        }

        let conn = self.database.conn().map_err(pool_error)?;
        conn.execute(
            "INSERT INTO blobs (key, bytes, size, created_at) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(key) DO UPDATE SET
                 bytes = excluded.bytes,
                 size = excluded.size",
            params![key, bytes, bytes.len() as i64, Utc::now().to_rfc3339()],
        )
        .map_err(classify)?;

        Ok(format!("{BLOB_URL_SCHEME}://{key}"))
    }
}
