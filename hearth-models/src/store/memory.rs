//! In-memory entity store.
//!
//! Backs the CLI's `--memory` mode and the test suites. Every committed
//! batch and every delete is recorded so callers can assert on what was
//! written, and failures can be injected per operation kind.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use hearth_core::constants::DEFAULT_MAX_BLOB_BYTES;
use hearth_core::error::{StoreError, StoreResult};

use super::{BatchOp, BlobStore, EntityStore, WriteBatch};
use crate::document::{merge_fields, Collection, Document};
use crate::id::EntityId;

const BLOB_URL_PREFIX: &str = "memory://blobs/";

#[derive(Default)]
struct MemoryState {
    documents: BTreeMap<(Collection, EntityId), Document>,
    blobs: BTreeMap<String, Vec<u8>>,
    committed: Vec<WriteBatch>,
    deleted: Vec<(Collection, EntityId)>,
    fail_next_commit: Option<StoreError>,
    fail_uploads: Option<StoreError>,
    fail_deletes: Option<StoreError>,
}

/// Process-local [`EntityStore`] and [`BlobStore`].
pub struct MemoryStore {
    state: RwLock<MemoryState>,
    max_blob_bytes: u64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_max_blob_bytes(DEFAULT_MAX_BLOB_BYTES)
    }

    pub fn with_max_blob_bytes(max_blob_bytes: u64) -> Self {
        Self {
            state: RwLock::new(MemoryState::default()),
            max_blob_bytes,
        }
    }

    /// Write a document directly, bypassing batches and the commit log.
    pub async fn put(&self, collection: Collection, id: EntityId, document: Document) {
        self.state.write().await.documents.insert((collection, id), document);
    }

    /// Make the next commit fail with `error` without applying anything.
    pub async fn fail_next_commit(&self, error: StoreError) {
        self.state.write().await.fail_next_commit = Some(error);
    }

    /// Make every upload fail with `error` until cleared with `None`.
    pub async fn fail_uploads(&self, error: Option<StoreError>) {
        self.state.write().await.fail_uploads = error;
    }

    /// Make every delete fail with `error` until cleared with `None`.
    pub async fn fail_deletes(&self, error: Option<StoreError>) {
        self.state.write().await.fail_deletes = error;
    }

    /// Every successfully committed batch, oldest first.
    pub async fn committed_batches(&self) -> Vec<WriteBatch> {
        self.state.read().await.committed.clone()
    }

    /// Every successful delete, oldest first.
    pub async fn deleted(&self) -> Vec<(Collection, EntityId)> {
        self.state.read().await.deleted.clone()
    }

    /// Bytes of an uploaded blob.
    pub async fn read_blob(&self, key: &str) -> Option<Vec<u8>> {
        self.state.read().await.blobs.get(key).cloned()
    }

    /// Number of stored blobs.
    pub async fn blob_count(&self) -> usize {
        self.state.read().await.blobs.len()
    }

    /// Number of documents in a collection.
    pub async fn count(&self, collection: Collection) -> usize {
        self.state
            .read()
            .await
            .documents
            .keys()
            .filter(|(c, _)| *c == collection)
            .count()
    }
}

#[async_trait]
impl EntityStore for MemoryStore {
    async fn get(&self, collection: Collection, id: &EntityId) -> StoreResult<Option<Document>> {
        let state = self.state.read().await;
        Ok(state.documents.get(&(collection, id.clone())).cloned())
    }

    async fn commit(&self, batch: WriteBatch) -> StoreResult<()> {
        let mut state = self.state.write().await;

        if let Some(error) = state.fail_next_commit.take() {
            debug!("memory store: injected commit failure: {error}");
            return Err(error);
        }

        // Every update target must exist, either already or via an earlier
        // set in this batch, before anything is applied.
        let mut created: HashSet<(Collection, EntityId)> = HashSet::new();
        for op in batch.ops() {
            let key = (op.collection(), op.id().clone());
            match op {
                BatchOp::Set { .. } => {
                    created.insert(key);
                }
                BatchOp::Update { .. } => {
                    if !created.contains(&key) && !state.documents.contains_key(&key) {
                        return Err(StoreError::NotFound {
                            collection: key.0.to_string(),
                            id: key.1.to_string(),
                        });
                    }
                }
            }
        }

        for op in batch.ops() {
            match op {
                BatchOp::Set { collection, id, document } => {
                    state.documents.insert((*collection, id.clone()), document.clone());
                }
                BatchOp::Update { collection, id, fields } => {
                    if let Some(target) = state.documents.get_mut(&(*collection, id.clone())) {
                        merge_fields(target, fields);
                    }
                }
            }
        }

        debug!("memory store: committed batch of {} op(s)", batch.len());
        state.committed.push(batch);
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &EntityId) -> StoreResult<()> {
        let mut state = self.state.write().await;
        if let Some(error) = state.fail_deletes.clone() {
            return Err(error);
        }
        state.documents.remove(&(collection, id.clone()));
        state.deleted.push((collection, id.clone()));
        Ok(())
    }

    async fn list_ids(&self, collection: Collection) -> StoreResult<Vec<EntityId>> {
        let state = self.state.read().await;
        Ok(state
            .documents
            .keys()
            .filter(|(c, _)| *c == collection)
            .map(|(_, id)| id.clone())
            .collect())
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn upload_blob(&self, key: &str, bytes: &[u8]) -> StoreResult<String> {
        let mut state = self.state.write().await;
        if let Some(error) = state.fail_uploads.clone() {
            return Err(error);
        }
        if bytes.len() as u64 > self.max_blob_bytes {
            return Err(StoreError::Rejected(format!(
                "blob of {} bytes exceeds limit of {}",
                bytes.len(),
                self.max_blob_bytes
            )));
        }
        state.blobs.insert(key.to_string(), bytes.to_vec());
        Ok(format!("{BLOB_URL_PREFIX}{key}"))
    }
}
