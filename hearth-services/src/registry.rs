//! Service registry for dependency injection and lifecycle management.
//!
//! The registry builds the configured store once and hands the same handle
//! to every service it wires. Services never reach for a global store.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, error};

use hearth_core::config::{ConfigHandle, StoreBackend};
use hearth_core::error::{HearthError, HearthResult};
use hearth_models::{BlobStore, Database, EntityStore, MemoryStore, SqliteStore};

use crate::event_bus::EventBus;
use crate::household::HouseholdService;
use crate::service::{Service, ServiceState};
use crate::transaction::LinkedEntityTransactionManager;

/// The concrete store behind the capability traits.
#[derive(Clone)]
pub enum StoreHandle {
    Memory(Arc<MemoryStore>),
    Sqlite(Arc<SqliteStore>),
}

impl StoreHandle {
    pub fn entities(&self) -> Arc<dyn EntityStore> {
        match self {
            Self::Memory(store) => store.clone(),
            Self::Sqlite(store) => store.clone(),
        }
    }

    pub fn blobs(&self) -> Arc<dyn BlobStore> {
        match self {
            Self::Memory(store) => store.clone(),
            Self::Sqlite(store) => store.clone(),
        }
    }

    /// The SQLite database, when the store is SQLite-backed.
    pub fn database(&self) -> Option<&Database> {
        match self {
            Self::Memory(_) => None,
            Self::Sqlite(store) => Some(store.database()),
        }
    }

    pub fn backend(&self) -> StoreBackend {
        match self {
            Self::Memory(_) => StoreBackend::Memory,
            Self::Sqlite(_) => StoreBackend::Sqlite,
        }
    }
}

/// Central service registry.
///
/// Holds the shared infrastructure (config, store, event bus) and the
/// registered services in initialization order.
pub struct ServiceRegistry {
    /// Application configuration.
    pub config: ConfigHandle,
    /// Application-level event bus.
    pub event_bus: EventBus,
    store: StoreHandle,
    services: Vec<(String, Arc<RwLock<Box<dyn Service>>>)>,
}

impl ServiceRegistry {
    /// Create a registry around an already-built store.
    pub async fn new(config: ConfigHandle, store: StoreHandle) -> Self {
        let capacity = config.read().await.events.bus_capacity;
        Self {
            config,
            event_bus: EventBus::new(capacity),
            store,
            services: Vec::new(),
        }
    }

    /// Build the store selected by `store.backend` and create a registry
    /// around it.
    pub async fn from_config(config: ConfigHandle) -> HearthResult<Self> {
        let store = {
            let cfg = config.read().await;
            match cfg.store.backend {
                StoreBackend::Memory => {
                    info!("using in-memory store");
                    StoreHandle::Memory(Arc::new(MemoryStore::with_max_blob_bytes(
                        cfg.store.max_blob_bytes,
                    )))
                }
                StoreBackend::Sqlite => {
                    let db_path = cfg.effective_db_path()?;
                    let database = Database::init(&db_path, &cfg.store)?;
                    StoreHandle::Sqlite(Arc::new(SqliteStore::new(
                        database,
                        cfg.store.max_blob_bytes,
                    )))
                }
            }
        };
        Ok(Self::new(config, store).await)
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// A transaction manager wired to the registry's store and event bus.
    pub fn transaction_manager(&self) -> LinkedEntityTransactionManager {
        LinkedEntityTransactionManager::new(
            self.store.entities(),
            self.store.blobs(),
            self.event_bus.clone(),
        )
    }

    /// A household service wired to the registry's store and event bus.
    pub async fn household(&self) -> HouseholdService {
        let defaults = self.config.read().await.household.clone();
        HouseholdService::new(self.transaction_manager(), self.event_bus.clone(), defaults)
    }

    /// Register a service. Services are initialized in registration order.
    pub fn register<S: Service + 'static>(&mut self, service: S) {
        let name = service.name().to_string();
        info!("registered service: {name}");
        self.services
            .push((name, Arc::new(RwLock::new(Box::new(service)))));
    }

    /// Register the default services.
    pub async fn register_all(&mut self) {
        let household = self.household().await;
        self.register(household);
        info!("registered {} default services", self.services.len());
    }

    /// Initialize all registered services in order.
    pub async fn init_all(&self) -> HearthResult<()> {
        info!("initializing {} services", self.services.len());

        for (name, service) in &self.services {
            let mut svc = service.write().await;
            if let Err(e) = svc.init() {
                error!("failed to initialize service {name}: {e}");
                return Err(HearthError::ServiceInit(format!("{name}: {e}")));
            }
        }

        info!("all services initialized");
        Ok(())
    }

    /// Shut down all services in reverse order.
    pub async fn shutdown_all(&self) -> HearthResult<()> {
        for (name, service) in self.services.iter().rev() {
            let mut svc = service.write().await;
            if let Err(e) = svc.shutdown() {
                // Keep going so every service gets a shutdown call.
                error!("error shutting down service {name}: {e}");
            }
        }

        info!("all services shut down");
        Ok(())
    }

    /// Name, state and health of each registered service.
    pub async fn health_check(&self) -> Vec<(String, ServiceState, bool)> {
        let mut results = Vec::new();
        for (name, service) in &self.services {
            let svc = service.read().await;
            results.push((name.clone(), svc.state(), svc.is_healthy()));
        }
        results
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::config::AppConfig;

    fn memory_config() -> ConfigHandle {
        let mut config = AppConfig::default();
        config.store.backend = StoreBackend::Memory;
        ConfigHandle::new(config)
    }

    #[tokio::test]
    async fn test_from_config_memory_backend() {
        let registry = ServiceRegistry::from_config(memory_config()).await.unwrap();
        assert_eq!(registry.store().backend(), StoreBackend::Memory);
        assert!(registry.store().database().is_none());
    }

    #[tokio::test]
    async fn test_sqlite_backend_uses_configured_path() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = AppConfig::default();
        config.store.path = dir.path().join("h.db").display().to_string();

        let registry = ServiceRegistry::from_config(ConfigHandle::new(config)).await.unwrap();
        assert_eq!(registry.store().backend(), StoreBackend::Sqlite);
        assert!(dir.path().join("h.db").exists());
    }

    #[tokio::test]
    async fn test_init_and_shutdown() {
        let mut registry = ServiceRegistry::from_config(memory_config()).await.unwrap();
        registry.register_all().await;
        assert_eq!(registry.service_count(), 1);

        registry.init_all().await.unwrap();
        for (name, state, healthy) in registry.health_check().await {
            assert!(healthy, "service {name} is not healthy (state: {state})");
        }
        registry.shutdown_all().await.unwrap();
    }
}
