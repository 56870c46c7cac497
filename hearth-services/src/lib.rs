//! Hearth Services - Linked-entity transactions and household operations.
//!
//! This crate provides:
//! - The membership list reconciler (append / remove-first)
//! - The linked-entity transaction manager pairing child writes with parent
//!   list updates in one batch commit
//! - The optimistic UI state controller for in-flight transactions
//! - The household service built on top of the manager
//! - Event bus, service trait and the registry that wires it all together

pub mod service;
pub mod registry;
pub mod event_bus;
pub mod reconciler;
pub mod transaction;
pub mod ui_state;
pub mod household;

// Re-export key types
pub use service::{Service, ServiceState};
pub use registry::{ServiceRegistry, StoreHandle};
pub use event_bus::{AppEvent, EventBus};
pub use transaction::{ChildDraft, LinkedEntityTransactionManager};
pub use ui_state::{Ticket, TxPhase, UiState, UiStateController};
pub use household::HouseholdService;
