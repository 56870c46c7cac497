//! Application-wide constants.

/// Application name.
pub const APP_NAME: &str = "Hearth";

/// Application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directory name used under the platform data/config directories.
pub const APP_DIR_NAME: &str = "Hearth";

/// Default event bus capacity.
pub const DEFAULT_EVENT_BUS_CAPACITY: usize = 256;

/// Default upper bound for a single uploaded blob (10 MiB).
pub const DEFAULT_MAX_BLOB_BYTES: u64 = 10 * 1024 * 1024;

/// Database schema version.
pub const DB_SCHEMA_VERSION: i32 = 1;

/// URL scheme for blobs held by the SQLite store.
pub const BLOB_URL_SCHEME: &str = "hearth-blob";

/// Collection names as persisted by the store adapters.
pub mod collections {
    pub const FAMILIES: &str = "families";
    pub const RESIDENCES: &str = "residences";
    pub const VEHICLES: &str = "vehicles";
    pub const PROFILES: &str = "profiles";

    /// All known collections.
    pub const ALL: &[&str] = &[FAMILIES, RESIDENCES, VEHICLES, PROFILES];
}

/// Document field names touched by partial updates.
pub mod fields {
    pub const ID: &str = "id";
    pub const MEMBERS: &str = "members";
    pub const RESIDENCES: &str = "residences";
    pub const VEHICLES: &str = "vehicles";
    pub const GROCERY_LIST: &str = "groceryList";
    pub const BOARD_MARKDOWN: &str = "boardMarkdown";
    pub const FAMILY_ID: &str = "familyId";
    pub const IMAGE_URL: &str = "imageUrl";
    pub const SERVICE_LOG: &str = "serviceLogEntries";
    pub const MAINTENANCE_MARKERS: &str = "maintenanceMarkers";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_constants() {
        assert_eq!(collections::ALL.len(), 4);
        assert!(collections::ALL.contains(&"vehicles"));
    }
}
