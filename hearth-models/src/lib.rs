//! Hearth Models - Entity models, document mapping, and entity store adapters.
//!
//! This crate owns everything about persistence: the id generator, the
//! household entity models and their document shape, the `EntityStore` /
//! `BlobStore` capability traits consumed by the transaction layer, and two
//! adapters implementing them (in-memory and SQLite).

pub mod db;
pub mod schema;
pub mod migrations;
pub mod id;
pub mod document;
pub mod models;
pub mod store;

// Re-export key types
pub use db::{Database, DatabaseStats};
pub use id::{new_id, EntityId};
pub use document::{Collection, Document};
pub use models::{ChildKind, PendingBlob};
pub use models::family::{Family, FamilySettings, NewFamily, Units};
pub use models::residence::{Residence, ResidenceDraft};
pub use models::vehicle::{Vehicle, VehicleDraft};
pub use models::profile::UserProfile;
pub use models::upkeep::{MaintenanceMarker, ServiceLogEntry};
pub use store::{BatchOp, BlobStore, EntityStore, WriteBatch};
pub use store::memory::MemoryStore;
pub use store::sqlite::SqliteStore;
