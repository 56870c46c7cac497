//! User profile entity model.

use serde::{Deserialize, Serialize};

use hearth_core::error::{HearthError, HearthResult};

use crate::id::EntityId;

/// A signed-in user. The id is the identity provider's user id.
///
/// `family_id` is `None` until the user creates or joins a household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: EntityId,
    #[serde(default)]
    pub family_id: Option<EntityId>,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl UserProfile {
    pub fn new(id: impl Into<EntityId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            family_id: None,
            display_name: display_name.into(),
            email: None,
            avatar_url: None,
        }
    }

    pub fn has_family(&self) -> bool {
        self.family_id.is_some()
    }

    pub fn validate(&self) -> HearthResult<()> {
        if self.id.as_str().trim().is_empty() {
            return Err(HearthError::Validation("profile id cannot be empty".into()));
        }
        if self.display_name.trim().is_empty() {
            return Err(HearthError::Validation("display name cannot be empty".into()));
        }
        Ok(())
    }
}
