//! Residence entity model.

use serde::{Deserialize, Serialize};

use hearth_core::error::{HearthError, HearthResult};

use super::upkeep::{MaintenanceMarker, ServiceLogEntry};
use super::PendingBlob;
use crate::id::EntityId;

/// A home owned or rented by a family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Residence {
    pub id: EntityId,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub year_built: Option<u16>,
    #[serde(default)]
    pub square_feet: Option<u32>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub service_log_entries: Vec<ServiceLogEntry>,
    #[serde(default)]
    pub maintenance_markers: Vec<MaintenanceMarker>,
}

/// Form payload for adding a residence.
///
/// Serializes to the residence document minus `id` and `imageUrl`, which
/// are filled in by the transaction that creates it.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResidenceDraft {
    pub name: String,
    pub address: Option<String>,
    pub year_built: Option<u16>,
    pub square_feet: Option<u32>,
    pub service_log_entries: Vec<ServiceLogEntry>,
    pub maintenance_markers: Vec<MaintenanceMarker>,
    #[serde(skip)]
    pub image: Option<PendingBlob>,
}

impl ResidenceDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), ..Default::default() }
    }

    pub fn validate(&self) -> HearthResult<()> {
        if self.name.trim().is_empty() {
            return Err(HearthError::Validation("residence name cannot be empty".into()));
        }
        if self.square_feet == Some(0) {
            return Err(HearthError::Validation("square footage must be positive".into()));
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
    fn test_draft_document_becomes_residence_once_id_is_added() {
        let mut draft = ResidenceDraft::new("Lake cabin");
        draft.address = Some("1 Shore Rd".into());
        draft.image = Some(PendingBlob::new("cabin.jpg", vec![1, 2, 3]));

        let mut doc = to_document(&draft).unwrap();
        assert!(!doc.contains_key("image"));
        doc.insert("id".into(), json!("res1"));

        let residence: Residence = from_document(doc).unwrap();
        assert_eq!(residence.id.as_str(), "res1");
        assert_eq!(residence.address.as_deref(), Some("1 Shore Rd"));
        assert!(residence.image_url.is_none());
        assert!(residence.service_log_entries.is_empty());
    }

    #[test]
    fn test_validate() {
        assert!(ResidenceDraft::new("Home").validate().is_ok());
        assert!(ResidenceDraft::new("").validate().is_err());

        let mut draft = ResidenceDraft::new("Home");
        draft.square_feet = Some(0);
        assert!(draft.validate().is_err());
    }
}
