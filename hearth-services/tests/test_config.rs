//! Integration tests for application configuration.
//!
//! Tests config loading from TOML, saving and reloading, default values,
//! validation of loaded files, ConfigHandle shared access, and building the
//! service registry from a config.

mod common;

use hearth_core::config::{AppConfig, ConfigHandle, StoreBackend};
use hearth_services::registry::ServiceRegistry;
use tempfile::TempDir;

// ---- Default values ----

#[test]
fn default_config_has_expected_store_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert!(config.store.path.is_empty(), "default db path should be empty");
    assert!(config.store.wal_mode, "WAL mode should be enabled by default");
    assert_eq!(config.store.pool_size, 4);
    assert!(config.store.integrity_check_on_startup);
    assert_eq!(config.store.max_blob_bytes, 10 * 1024 * 1024);
}

#[test]
fn default_config_has_expected_logging_and_household_defaults() {
    let config = AppConfig::default();
    assert_eq!(config.logging.level, "info");
    assert!(config.logging.directory.is_empty());
    assert!(!config.logging.json_output);
    assert_eq!(config.events.bus_capacity, 256);
    assert_eq!(config.household.default_units, "imperial");
    assert!(config.household.weather_location.is_empty());
}

// ---- TOML serialization ----

#[test]
fn config_toml_roundtrip_preserves_fields() {
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Memory;
    config.store.pool_size = 8;
    config.store.max_blob_bytes = 512;
    config.logging.level = "debug".into();
    config.household.default_units = "metric".into();
    config.household.weather_location = "Bergen".into();

    let toml_str = toml::to_string_pretty(&config).unwrap();
    assert!(toml_str.contains("backend = \"memory\""));

    let deserialized: AppConfig = toml::from_str(&toml_str).unwrap();
    assert_eq!(deserialized.store.backend, StoreBackend::Memory);
    assert_eq!(deserialized.store.pool_size, 8);
    assert_eq!(deserialized.store.max_blob_bytes, 512);
    assert_eq!(deserialized.logging.level, "debug");
    assert_eq!(deserialized.household.default_units, "metric");
    assert_eq!(deserialized.household.weather_location, "Bergen");
}

#[test]
fn config_toml_applies_defaults_for_missing_fields() {
    let toml_str = r#"
[household]
weather_location = "Reno"
"#;

    let config: AppConfig = toml::from_str(toml_str).unwrap();
    assert_eq!(config.household.weather_location, "Reno");
    assert_eq!(config.household.default_units, "imperial");
    assert_eq!(config.store.backend, StoreBackend::Sqlite);
    assert!(config.store.wal_mode);
}

#[test]
fn config_toml_empty_string_deserializes_to_defaults() {
    let config: AppConfig = toml::from_str("").unwrap();
    assert_eq!(config.store.pool_size, 4);
    assert_eq!(config.events.bus_capacity, 256);
}

// ---- File save and load ----

#[test]
fn config_save_and_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = AppConfig::default();
    config.store.path = "/var/lib/hearth/hearth.db".into();
    config.save_to_file(&path).unwrap();
    assert!(path.exists(), "config file should be created");

    let loaded = AppConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded.store.path, "/var/lib/hearth/hearth.db");
}

#[test]
fn config_load_invalid_toml_returns_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("invalid.toml");
    std::fs::write(&path, "this is not valid {{ toml }}").unwrap();

    assert!(AppConfig::load_from_file(&path).is_err());
}

#[test]
fn config_load_rejects_unusable_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.toml");

    std::fs::write(&path, "[store]\npool_size = 0\n").unwrap();
    assert!(AppConfig::load_from_file(&path).is_err());

    std::fs::write(&path, "[household]\ndefault_units = \"furlongs\"\n").unwrap();
    assert!(AppConfig::load_from_file(&path).is_err());
}

// ---- ConfigHandle async access ----

#[tokio::test]
async fn config_handle_clone_shares_state() {
    let handle1 = common::create_test_config_handle();
    let handle2 = handle1.clone();

    {
        let mut config = handle1.write().await;
        config.household.weather_location = "Tromsø".into();
    }

    let config = handle2.read().await;
    assert_eq!(config.household.weather_location, "Tromsø");
}

// ---- Registry from config ----

#[tokio::test]
async fn registry_household_uses_configured_defaults() {
    let mut config = AppConfig::default();
    config.store.backend = StoreBackend::Memory;
    config.household.default_units = "metric".into();

    let registry = ServiceRegistry::from_config(ConfigHandle::new(config)).await.unwrap();
    let household = registry.household().await;
    let template = household.family_template("Olsens");

    assert_eq!(template.settings.units, hearth_models::Units::Metric);
    assert_eq!(registry.store().backend(), StoreBackend::Memory);
}
