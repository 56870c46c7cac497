//! Vehicle entity model.

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

use hearth_core::error::{HearthError, HearthResult};

use super::upkeep::{MaintenanceMarker, ServiceLogEntry};
use super::PendingBlob;
use crate::id::EntityId;

/// Earliest model year accepted by the vehicle form.
const FIRST_MODEL_YEAR: u16 = 1886;

/// A car, truck or other vehicle kept by a family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: EntityId,
    pub make: String,
    pub model: String,
    pub year: u16,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub odometer_miles: Option<u64>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub service_log_entries: Vec<ServiceLogEntry>,
    #[serde(default)]
    pub maintenance_markers: Vec<MaintenanceMarker>,
}

impl Vehicle {
    /// "2019 Honda Odyssey", or the nickname when one is set.
    pub fn title(&self) -> String {
        match self.nickname.as_deref() {
            Some(nick) if !nick.trim().is_empty() => nick.to_string(),
            _ => format!("{} {} {}", self.year, self.make, self.model),
        }
    }
}

/// Form payload for adding a vehicle.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleDraft {
    pub make: String,
    pub model: String,
    pub year: u16,
    pub nickname: Option<String>,
    pub vin: Option<String>,
    pub odometer_miles: Option<u64>,
    pub service_log_entries: Vec<ServiceLogEntry>,
    pub maintenance_markers: Vec<MaintenanceMarker>,
    #[serde(skip)]
    pub image: Option<PendingBlob>,
}

impl VehicleDraft {
    pub fn new(make: impl Into<String>, model: impl Into<String>, year: u16) -> Self {
        Self { make: make.into(), model: model.into(), year, ..Default::default() }
    }

    pub fn validate(&self) -> HearthResult<()> {
        if self.make.trim().is_empty() || self.model.trim().is_empty() {
            return Err(HearthError::Validation("vehicle make and model are required".into()));
        }
        let latest = u16::try_from(Utc::now().year() + 1).unwrap_or(u16::MAX);
        if !(FIRST_MODEL_YEAR..=latest).contains(&self.year) {
            return Err(HearthError::Validation(format!(
                "vehicle year {} outside {FIRST_MODEL_YEAR}..={latest}",
                self.year
            )));
        }
        if let Some(vin) = &self.vin {
            if vin.len() != 17 || !vin.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(HearthError::Validation(format!("`{vin}` is not a 17 character VIN")));
            }
        }
        for marker in &self.maintenance_markers {
            marker.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{from_document, to_document};
    use serde_json::json;

    #[test]
    fn test_draft_roundtrip_through_document() {
        let mut draft = VehicleDraft::new("Honda", "Odyssey", 2019);
        draft.odometer_miles = Some(52_000);
        let mut doc = to_document(&draft).unwrap();
        assert_eq!(doc["odometerMiles"], json!(52_000));
        doc.insert("id".into(), json!("veh1"));

        let vehicle: Vehicle = from_document(doc).unwrap();
        assert_eq!(vehicle.title(), "2019 Honda Odyssey");
    }

    #[test]
    fn test_nickname_wins_title() {
        let doc = json!({"id": "veh1", "make": "Ford", "model": "F-150", "year": 2008, "nickname": "Old Blue"});
        let vehicle: Vehicle = from_document(doc.as_object().unwrap().clone()).unwrap();
        assert_eq!(vehicle.title(), "Old Blue");
    }

    #[test]
    fn test_validate() {
        assert!(VehicleDraft::new("Honda", "Odyssey", 2019).validate().is_ok());
        assert!(VehicleDraft::new("", "Odyssey", 2019).validate().is_err());
        assert!(VehicleDraft::new("Benz", "Motorwagen", 1885).validate().is_err());

        let mut draft = VehicleDraft::new("Honda", "Odyssey", 2019);
        draft.vin = Some("SHORT".into());
        assert!(draft.validate().is_err());
        draft.vin = Some("5FNRL6H78KB000001".into());
        assert!(draft.validate().is_ok());
    }
}
