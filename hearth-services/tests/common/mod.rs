//! Shared test utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use hearth_core::config::{AppConfig, ConfigHandle, HouseholdConfig, StoreConfig};
use hearth_models::document::to_document;
use hearth_models::{
    Collection, Database, EntityId, Family, MemoryStore, NewFamily, SqliteStore, UserProfile,
};
use hearth_services::event_bus::EventBus;
use hearth_services::household::HouseholdService;
use hearth_services::transaction::LinkedEntityTransactionManager;
use tempfile::TempDir;

/// Create a temporary database with full schema and migrations applied.
/// Returns the Database and the TempDir (must be held alive for the duration of the test).
pub fn create_test_db() -> (Database, TempDir) {
    let dir = TempDir::new().expect("failed to create temp dir");
    let path = dir.path().join("test.db");
    let db = Database::init(&path, &StoreConfig::default()).expect("failed to init test database");
    (db, dir)
}

/// Create a default test configuration.
pub fn create_test_config() -> AppConfig {
    AppConfig::default()
}

/// Create a ConfigHandle wrapping a default config.
pub fn create_test_config_handle() -> ConfigHandle {
    ConfigHandle::new(create_test_config())
}

/// Create an EventBus with a small buffer suitable for tests.
pub fn create_test_event_bus() -> EventBus {
    EventBus::new(64)
}

/// A transaction manager over a fresh in-memory store.
pub fn memory_manager() -> (Arc<MemoryStore>, LinkedEntityTransactionManager, EventBus) {
    let store = Arc::new(MemoryStore::new());
    let bus = create_test_event_bus();
    let manager = LinkedEntityTransactionManager::new(store.clone(), store.clone(), bus.clone());
    (store, manager, bus)
}

/// A household service over a fresh in-memory store.
pub fn memory_household() -> (Arc<MemoryStore>, HouseholdService, EventBus) {
    let (store, manager, bus) = memory_manager();
    let service = HouseholdService::new(manager, bus.clone(), HouseholdConfig::default());
    (store, service, bus)
}

/// A household service over a temporary SQLite store.
pub fn sqlite_household() -> (Arc<SqliteStore>, HouseholdService, TempDir) {
    let (db, dir) = create_test_db();
    let store = Arc::new(SqliteStore::new(db, 1024 * 1024));
    let bus = create_test_event_bus();
    let manager = LinkedEntityTransactionManager::new(store.clone(), store.clone(), bus.clone());
    let service = HouseholdService::new(manager, bus, HouseholdConfig::default());
    (store, service, dir)
}

fn ids(list: &[&str]) -> Vec<EntityId> {
    list.iter().map(|s| EntityId::from(*s)).collect()
}

/// Seed family `fam1` headed by `user1` with the given child lists, plus
/// child documents for every listed id so no reference dangles.
pub async fn seed_family(store: &MemoryStore, residences: &[&str], vehicles: &[&str]) -> Family {
    let mut family = Family::founded_by("fam1".into(), "user1".into(), NewFamily::new("Smiths"));
    family.residences = ids(residences);
    family.vehicles = ids(vehicles);

    store
        .put(Collection::Families, family.id.clone(), to_document(&family).unwrap())
        .await;
    for id in &family.residences {
        let doc = serde_json::json!({ "id": id.as_str(), "name": format!("Residence {id}") });
        store.put(Collection::Residences, id.clone(), doc.as_object().unwrap().clone()).await;
    }
    for id in &family.vehicles {
        let doc = serde_json::json!({ "id": id.as_str(), "make": "Honda", "model": "Civic", "year": 2018 });
        store.put(Collection::Vehicles, id.clone(), doc.as_object().unwrap().clone()).await;
    }

    let mut head = UserProfile::new("user1", "Ada");
    head.family_id = Some(family.id.clone());
    store
        .put(Collection::Profiles, head.id.clone(), to_document(&head).unwrap())
        .await;

    family
}

/// Seed a profile with no family.
pub async fn seed_profile(store: &MemoryStore, id: &str, name: &str) -> UserProfile {
    let profile = UserProfile::new(id, name);
    store
        .put(Collection::Profiles, profile.id.clone(), to_document(&profile).unwrap())
        .await;
    profile
}
