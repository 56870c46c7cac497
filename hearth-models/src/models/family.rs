//! Family (household) entity model.

use serde::{Deserialize, Serialize};

use hearth_core::error::{HearthError, HearthResult};

use super::ChildKind;
use crate::id::EntityId;

/// Unit system used when displaying mileage, temperatures and areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Imperial,
    Metric,
}

impl std::str::FromStr for Units {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imperial" => Ok(Self::Imperial),
            "metric" => Ok(Self::Metric),
            other => Err(HearthError::Validation(format!("unknown unit system `{other}`"))),
        }
    }
}

/// Per-household preferences.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FamilySettings {
    #[serde(default)]
    pub units: Units,
    #[serde(default)]
    pub weather_location: Option<String>,
}

/// A household: the parent of every residence and vehicle.
///
/// `members`, `residences` and `vehicles` are ordered id lists. They may
/// contain duplicates; readers must tolerate them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    pub id: EntityId,
    pub name: String,
    pub head_of_family_id: EntityId,
    #[serde(default)]
    pub members: Vec<EntityId>,
    #[serde(default)]
    pub residences: Vec<EntityId>,
    #[serde(default)]
    pub vehicles: Vec<EntityId>,
    #[serde(default)]
    pub grocery_list: Vec<String>,
    #[serde(default)]
    pub board_markdown: String,
    #[serde(default)]
    pub settings: FamilySettings,
}

impl Family {
    /// Build the document for a newly created family headed by `head`.
    pub fn founded_by(id: EntityId, head: EntityId, new_family: NewFamily) -> Self {
        Self {
            id,
            name: new_family.name.trim().to_string(),
            members: vec![head.clone()],
            head_of_family_id: head,
            residences: Vec::new(),
            vehicles: Vec::new(),
            grocery_list: Vec::new(),
            board_markdown: String::new(),
            settings: new_family.settings,
        }
    }

    /// The membership list holding children of `kind`.
    pub fn children(&self, kind: ChildKind) -> &[EntityId] {
        match kind {
            ChildKind::Residence => &self.residences,
            ChildKind::Vehicle => &self.vehicles,
        }
    }

    /// Mutable access to the membership list for `kind`, used to refresh a
    /// snapshot after a committed transaction.
    pub fn children_mut(&mut self, kind: ChildKind) -> &mut Vec<EntityId> {
        match kind {
            ChildKind::Residence => &mut self.residences,
            ChildKind::Vehicle => &mut self.vehicles,
        }
    }

    /// Whether `profile_id` appears in the member list.
    pub fn has_member(&self, profile_id: &EntityId) -> bool {
        self.members.contains(profile_id)
    }
}

/// Form payload for creating a family.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewFamily {
    pub name: String,
    pub settings: FamilySettings,
}

impl NewFamily {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), settings: FamilySettings::default() }
    }

    pub fn validate(&self) -> HearthResult<()> {
        if self.name.trim().is_empty() {
            return Err(HearthError::Validation("family name cannot be empty".into()));
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
    fn test_founded_by_sets_head_and_first_member() {
        let family = Family::founded_by("fam1".into(), "user1".into(), NewFamily::new("  Smiths "));
        assert_eq!(family.name, "Smiths");
        assert_eq!(family.head_of_family_id.as_str(), "user1");
        assert_eq!(family.members, vec![EntityId::from("user1")]);
        assert!(family.residences.is_empty());
    }

    #[test]
    fn test_document_field_names() {
        let family = Family::founded_by("fam1".into(), "user1".into(), NewFamily::new("Smiths"));
        let doc = to_document(&family).unwrap();
        assert_eq!(doc["headOfFamilyId"], json!("user1"));
        assert_eq!(doc["members"], json!(["user1"]));
        assert_eq!(doc["groceryList"], json!([]));
        assert_eq!(doc["settings"]["units"], json!("imperial"));
    }

    #[test]
    fn test_sparse_document_loads_with_defaults() {
        let doc = json!({"id": "fam1", "name": "Smiths", "headOfFamilyId": "user1"});
        let family: Family = from_document(doc.as_object().unwrap().clone()).unwrap();
        assert!(family.vehicles.is_empty());
        assert_eq!(family.board_markdown, "");
    }

    #[test]
    fn test_children_by_kind() {
        let mut family = Family::founded_by("fam1".into(), "user1".into(), NewFamily::new("Smiths"));
        family.children_mut(ChildKind::Vehicle).push("veh1".into());
        assert_eq!(family.children(ChildKind::Vehicle), &[EntityId::from("veh1")]);
        assert!(family.children(ChildKind::Residence).is_empty());
    }

    #[test]
    fn test_validate_new_family() {
        assert!(NewFamily::new("Smiths").validate().is_ok());
        assert!(NewFamily::new("   ").validate().is_err());
        assert_eq!("METRIC".parse::<Units>().unwrap(), Units::Metric);
    }
}
