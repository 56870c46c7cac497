//! Entity model definitions.
//!
//! Families own ordered id lists of their residences, vehicles and members.
//! Children never point back at their family.

pub mod family;
pub mod residence;
pub mod vehicle;
pub mod profile;
pub mod upkeep;

use std::fmt;

use hearth_core::constants::fields;

use crate::document::Collection;

/// Kind of child entity linked into a family membership list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChildKind {
    Residence,
    Vehicle,
}

impl ChildKind {
    /// Collection the child documents live in.
    pub fn collection(&self) -> Collection {
        match self {
            Self::Residence => Collection::Residences,
            Self::Vehicle => Collection::Vehicles,
        }
    }

    /// Family field holding the ids of this kind of child.
    pub fn list_field(&self) -> &'static str {
        match self {
            Self::Residence => fields::RESIDENCES,
            Self::Vehicle => fields::VEHICLES,
        }
    }

    /// Singular label for logs and CLI output.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Residence => "residence",
            Self::Vehicle => "vehicle",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Image bytes waiting to be uploaded as part of creating a child.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingBlob {
    /// Original file name, kept as the last segment of the blob key.
    pub file_name: String,
    /// Raw bytes.
    pub bytes: Vec<u8>,
}

impl PendingBlob {
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self { file_name: file_name.into(), bytes }
    }

    /// File name reduced to characters that are safe inside a blob key.
    pub fn safe_file_name(&self) -> String {
        let cleaned: String = self
            .file_name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
            .collect();
        if cleaned.trim_matches('.').is_empty() {
            "upload".to_string()
        } else {
            cleaned
        }
    }
}
