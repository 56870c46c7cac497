//! Entity store capability traits and staged write batches.
//!
//! The transaction layer depends only on these traits; which backend sits
//! behind them is decided by whoever constructs the services. A batch is a
//! plain list of staged operations, so callers and tests can inspect exactly
//! what a commit will apply.

pub mod memory;
pub mod sqlite;

use async_trait::async_trait;

use hearth_core::error::StoreResult;

use crate::document::{Collection, Document};
use crate::id::EntityId;

/// One staged write.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOp {
    /// Create or overwrite a whole document.
    Set {
        collection: Collection,
        id: EntityId,
        document: Document,
    },
    /// Merge top-level fields into an existing document.
    Update {
        collection: Collection,
        id: EntityId,
        fields: Document,
    },
}

impl BatchOp {
    pub fn collection(&self) -> Collection {
        match self {
            Self::Set { collection, .. } | Self::Update { collection, .. } => *collection,
        }
    }

    pub fn id(&self) -> &EntityId {
        match self {
            Self::Set { id, .. } | Self::Update { id, .. } => id,
        }
    }
}

/// Staged writes applied together by [`EntityStore::commit`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WriteBatch {
    ops: Vec<BatchOp>,
}

impl WriteBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a create/overwrite.
    pub fn set(&mut self, collection: Collection, id: EntityId, document: Document) -> &mut Self {
        self.ops.push(BatchOp::Set { collection, id, document });
        self
    }

    /// Stage a field merge. The target must exist when the batch commits.
    pub fn update(&mut self, collection: Collection, id: EntityId, fields: Document) -> &mut Self {
        self.ops.push(BatchOp::Update { collection, id, fields });
        self
    }

    pub fn ops(&self) -> &[BatchOp] {
        &self.ops
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }
}

/// Document storage with all-or-nothing batch commits.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Fetch a document. `Ok(None)` when it does not exist.
    async fn get(&self, collection: Collection, id: &EntityId) -> StoreResult<Option<Document>>;

    /// Start an empty batch.
    fn begin_batch(&self) -> WriteBatch {
        WriteBatch::new()
    }

    /// Apply every staged op, or none of them.
    async fn commit(&self, batch: WriteBatch) -> StoreResult<()>;

    /// Delete a document outside of any batch. Deleting a missing document
    /// is not an error.
    async fn delete(&self, collection: Collection, id: &EntityId) -> StoreResult<()>;

    /// Ids of every document in a collection.
    async fn list_ids(&self, collection: Collection) -> StoreResult<Vec<EntityId>>;
}

/// Object storage for uploaded images.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key` and return a URL that resolves to them.
    async fn upload_blob(&self, key: &str, bytes: &[u8]) -> StoreResult<String>;
}
