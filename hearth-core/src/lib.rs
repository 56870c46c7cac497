//! Hearth Core - Foundation types, error handling, configuration, and logging.
//!
//! This crate provides the shared foundation used by all other Hearth crates:
//! - Application configuration (store backend, logging, household defaults)
//! - Error types for the application, the entity store, and transactions
//! - Structured logging with tracing
//! - Platform directory lookup
//! - Collection and field name constants

pub mod config;
pub mod error;
pub mod logging;
pub mod platform;
pub mod constants;

// Re-export commonly used items at the crate root
pub use config::AppConfig;
pub use error::{HearthError, HearthResult, StoreError, StoreResult, TxError, TxResult};
pub use logging::init_logging;
pub use platform::Platform;
