//! Error types for the Hearth application.
//!
//! Three layers share this module:
//! - `HearthError` covers configuration, database, service and validation
//!   failures across the application.
//! - `StoreError` is what an entity store adapter returns.
//! - `TxError` is what a linked-entity transaction returns to the caller.

use thiserror::Error;

/// Convenience type alias for Results using HearthError.
pub type HearthResult<T> = Result<T, HearthError>;

/// Result of an entity store adapter call.
pub type StoreResult<T> = Result<T, StoreError>;

/// Result of a linked-entity transaction.
pub type TxResult<T> = Result<T, TxError>;

/// Unified error type covering all error categories in Hearth.
#[derive(Error, Debug)]
pub enum HearthError {
    // -- Configuration errors --
    /// Failed to load or parse application configuration.
    #[error("configuration error: {0}")]
    Config(String),

    // -- Database errors --
    /// SQLite database error.
    #[error("database error: {0}")]
    Database(String),

    /// Database migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// Database integrity check failed.
    #[error("database integrity check failed: {0}")]
    IntegrityCheck(String),

    // -- Domain errors --
    /// A form payload failed validation before reaching the store.
    #[error("validation error: {0}")]
    Validation(String),

    /// A requested entity does not exist.
    #[error("{collection} not found: {id}")]
    NotFound {
        /// Collection that was searched.
        collection: String,
        /// Id that was not found.
        id: String,
    },

    /// A linked-entity transaction failed.
    #[error("transaction failed: {0}")]
    Transaction(#[from] TxError),

    /// A store call outside a transaction failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Service errors --
    /// A service failed to initialize.
    #[error("service init error: {0}")]
    ServiceInit(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for HearthError {
    fn from(e: serde_json::Error) -> Self {
        HearthError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for HearthError {
    fn from(e: toml::de::Error) -> Self {
        HearthError::Config(e.to_string())
    }
}

/// Failure reported by an entity store adapter.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The backend could not be reached or is temporarily busy.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The backend refused the write (permissions, constraints, size limits).
    #[error("store rejected write: {0}")]
    Rejected(String),

    /// A document addressed by an update does not exist.
    #[error("document {collection}/{id} does not exist")]
    NotFound {
        /// Collection name.
        collection: String,
        /// Document id.
        id: String,
    },

    /// The client went away before the backend answered.
    #[error("store call aborted")]
    Aborted,
}

/// Terminal failure of a single linked-entity transaction.
///
/// None of these are retried automatically; the caller decides whether to
/// re-invoke the operation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TxError {
    /// The pending blob could not be uploaded; no document was written.
    #[error("blob upload failed: {0}")]
    BlobUploadFailed(StoreError),

    /// The store could not be reached.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// The store refused the batch.
    #[error("store rejected transaction: {0}")]
    StoreRejected(String),

    /// The client closed before the commit resolved.
    #[error("transaction aborted before commit resolved")]
    Aborted,
}

impl From<StoreError> for TxError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Unavailable(msg) => TxError::StoreUnavailable(msg),
            StoreError::Rejected(msg) => TxError::StoreRejected(msg),
            not_found @ StoreError::NotFound { .. } => {
                TxError::StoreRejected(not_found.to_string())
            }
            StoreError::Aborted => TxError::Aborted,
        }
    }
}

impl TxError {
    /// Short machine-friendly label, used in logs and events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::BlobUploadFailed(_) => "blob_upload_failed",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::StoreRejected(_) => "store_rejected",
            Self::Aborted => "aborted",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_maps_to_tx_error() {
        assert_eq!(
            TxError::from(StoreError::Unavailable("offline".into())),
            TxError::StoreUnavailable("offline".into())
        );
        assert_eq!(TxError::from(StoreError::Aborted), TxError::Aborted);
    }

    #[test]
    fn test_missing_document_is_a_rejected_write() {
        let err = TxError::from(StoreError::NotFound {
            collection: "families".into(),
            id: "fam1".into(),
        });
        assert_eq!(
            err,
            TxError::StoreRejected("document families/fam1 does not exist".into())
        );
        assert_eq!(err.kind(), "store_rejected");
    }

    #[test]
    fn test_hearth_error_display() {
        let err = HearthError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");

        let err: HearthError = TxError::Aborted.into();
        assert_eq!(
            err.to_string(),
            "transaction failed: transaction aborted before commit resolved"
        );
    }
}
