//! CLI command implementations.

pub mod profile;
pub mod family;
pub mod residence;
pub mod vehicle;
pub mod db;

use std::path::Path;

use chrono::{NaiveDate, Utc};
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use console::style;
use serde::Serialize;

use hearth_core::config::ConfigHandle;
use hearth_core::error::{HearthError, HearthResult};
use hearth_models::{EntityId, Family, PendingBlob};
use hearth_services::{HouseholdService, ServiceRegistry};

/// Build the registry from config and return an initialized household service.
pub async fn init_household(config: &ConfigHandle) -> HearthResult<(ServiceRegistry, HouseholdService)> {
    let registry = ServiceRegistry::from_config(config.clone()).await?;
    let mut household = registry.household().await;
    hearth_services::Service::init(&mut household)?;
    Ok((registry, household))
}

/// Load a family by id, failing with `NotFound` when it does not exist.
pub async fn load_family(household: &HouseholdService, id: &str) -> HearthResult<Family> {
    household.require_family(&EntityId::from(id)).await
}

/// Read an image file into a pending upload.
pub fn read_image(path: &Path) -> HearthResult<PendingBlob> {
    let bytes = std::fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());
    Ok(PendingBlob::new(file_name, bytes))
}

/// Parse a `YYYY-MM-DD` date, defaulting to today.
pub fn parse_date(value: Option<&str>) -> HearthResult<NaiveDate> {
    match value {
        None => Ok(Utc::now().date_naive()),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|e| HearthError::Validation(format!("invalid date `{s}`: {e}"))),
    }
}

/// Print a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> HearthResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// A table with the CLI's standard look.
pub fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Print a success line.
pub fn print_ok(message: impl std::fmt::Display) {
    println!("  {} {}", style("OK").green().bold(), message);
}

/// Render an optional value for a table cell.
pub fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

/// Format a byte count as a human-readable string.
pub fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.2} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date(Some("2024-03-09")).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap()
        );
        assert!(parse_date(Some("03/09/2024")).is_err());
        assert!(parse_date(None).is_ok());
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(Some(1990)), "1990");
        assert_eq!(or_dash(None::<u16>), "-");
    }
}
