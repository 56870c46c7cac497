//! Document representation shared by every store adapter.
//!
//! A document is a JSON object keyed by field name. Entity models convert to
//! and from documents with serde; partial updates are merged one top-level
//! field at a time.

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use hearth_core::constants::collections;
use hearth_core::error::{HearthError, HearthResult};

/// A stored document: top-level field name to JSON value.
pub type Document = Map<String, Value>;

/// Collections known to the store, one per entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Collection {
    Families,
    Residences,
    Vehicles,
    Profiles,
}

impl Collection {
    /// Persisted collection name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Families => collections::FAMILIES,
            Self::Residences => collections::RESIDENCES,
            Self::Vehicles => collections::VEHICLES,
            Self::Profiles => collections::PROFILES,
        }
    }

    /// Every collection, in a stable order.
    pub fn all() -> [Collection; 4] {
        [Self::Families, Self::Residences, Self::Vehicles, Self::Profiles]
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Collection {
    type Err = HearthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            collections::FAMILIES => Ok(Self::Families),
            collections::RESIDENCES => Ok(Self::Residences),
            collections::VEHICLES => Ok(Self::Vehicles),
            collections::PROFILES => Ok(Self::Profiles),
            other => Err(HearthError::Validation(format!("unknown collection `{other}`"))),
        }
    }
}

/// Serialize an entity into a document.
pub fn to_document<T: Serialize>(entity: &T) -> HearthResult<Document> {
    match serde_json::to_value(entity)? {
        Value::Object(map) => Ok(map),
        other => Err(HearthError::Serialization(format!(
            "entity serialized to {} instead of an object",
            value_kind(&other)
        ))),
    }
}

/// Deserialize an entity from a document.
pub fn from_document<T: DeserializeOwned>(document: Document) -> HearthResult<T> {
    Ok(serde_json::from_value(Value::Object(document))?)
}

/// Apply a partial update: each top-level field in `partial` replaces the
/// field of the same name in `target`. Fields not named are left untouched.
pub fn merge_fields(target: &mut Document, partial: &Document) {
    for (key, value) in partial {
        target.insert(key.clone(), value.clone());
    }
}

/// Build a one-field partial document.
pub fn single_field(field: &str, value: impl Into<Value>) -> Document {
    let mut doc = Document::new();
    doc.insert(field.to_string(), value.into());
    doc
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    #[serde(rename_all = "camelCase")]
    struct Sample {
        id: String,
        display_name: String,
    }

    #[test]
    fn test_document_roundtrip_uses_camel_case() {
        let sample = Sample { id: "s1".into(), display_name: "Garage".into() };
        let doc = to_document(&sample).unwrap();
        assert_eq!(doc.get("displayName"), Some(&json!("Garage")));
        let back: Sample = from_document(doc).unwrap();
        assert_eq!(back, sample);
    }

    #[test]
    fn test_non_object_is_rejected() {
        let err = to_document(&vec![1, 2, 3]).unwrap_err();
        assert!(err.to_string().contains("an array"));
    }

    #[test]
    fn test_merge_only_touches_named_fields() {
        let mut doc = single_field("name", "Smiths");
        doc.insert("vehicles".into(), json!(["veh1"]));
        merge_fields(&mut doc, &single_field("vehicles", json!(["veh1", "veh2"])));
        assert_eq!(doc.get("name"), Some(&json!("Smiths")));
        assert_eq!(doc.get("vehicles"), Some(&json!(["veh1", "veh2"])));
    }

    #[test]
    fn test_collection_parse() {
        assert_eq!("vehicles".parse::<Collection>().unwrap(), Collection::Vehicles);
        assert!("boats".parse::<Collection>().is_err());
        assert_eq!(Collection::Profiles.to_string(), "profiles");
    }
}
