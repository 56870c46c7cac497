//! Household service.
//!
//! The operations behind the family, residence, vehicle and profile screens.
//! Anything that links or unlinks entities goes through the
//! [`LinkedEntityTransactionManager`]; single-document edits (service logs,
//! markers, grocery list, board text) are one-op batches on the store.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};

use hearth_core::config::HouseholdConfig;
use hearth_core::constants::fields;
use hearth_core::error::{HearthError, HearthResult};
use hearth_models::document::{from_document, single_field, to_document, Document};
use hearth_models::{
    ChildKind, Collection, EntityId, EntityStore, Family, FamilySettings, MaintenanceMarker,
    NewFamily, PendingBlob, Residence, ResidenceDraft, ServiceLogEntry, Units, UserProfile,
    Vehicle, VehicleDraft,
};

use crate::event_bus::{AppEvent, EventBus};
use crate::reconciler;
use crate::service::{Service, ServiceState};
use crate::transaction::{ChildDraft, LinkedEntityTransactionManager};

/// Household operations over an injected store.
pub struct HouseholdService {
    state: ServiceState,
    manager: LinkedEntityTransactionManager,
    event_bus: EventBus,
    defaults: HouseholdConfig,
}

impl HouseholdService {
    pub fn new(
        manager: LinkedEntityTransactionManager,
        event_bus: EventBus,
        defaults: HouseholdConfig,
    ) -> Self {
        Self {
            state: ServiceState::Created,
            manager,
            event_bus,
            defaults,
        }
    }

    pub fn manager(&self) -> &LinkedEntityTransactionManager {
        &self.manager
    }

    fn store(&self) -> &Arc<dyn EntityStore> {
        self.manager.store()
    }

    // ---- Profiles ----

    /// Store a profile as delivered by the identity provider on first
    /// sign-in. Overwrites any existing profile with the same id.
    pub async fn register_profile(&self, profile: &UserProfile) -> HearthResult<()> {
        profile.validate()?;
        let mut batch = self.store().begin_batch();
        batch.set(Collection::Profiles, profile.id.clone(), to_document(profile)?);
        self.store().commit(batch).await?;
        info!("registered profile {}", profile.id);
        Ok(())
    }

    pub async fn load_profile(&self, id: &EntityId) -> HearthResult<Option<UserProfile>> {
        self.load(Collection::Profiles, id).await
    }

    // ---- Families ----

    pub async fn load_family(&self, id: &EntityId) -> HearthResult<Option<Family>> {
        self.load(Collection::Families, id).await
    }

    /// Load a family that must exist.
    pub async fn require_family(&self, id: &EntityId) -> HearthResult<Family> {
        self.load_family(id).await?.ok_or_else(|| HearthError::NotFound {
            collection: Collection::Families.to_string(),
            id: id.to_string(),
        })
    }

    /// A `NewFamily` carrying the configured default settings.
    pub fn family_template(&self, name: impl Into<String>) -> NewFamily {
        let units = self.defaults.default_units.parse::<Units>().unwrap_or_else(|e| {
            warn!("ignoring configured default units: {e}");
            Units::default()
        });
        let weather_location = Some(self.defaults.weather_location.trim())
            .filter(|loc| !loc.is_empty())
            .map(str::to_string);

        NewFamily {
            name: name.into(),
            settings: FamilySettings { units, weather_location },
        }
    }

    /// Found a family headed by `profile_id`.
    pub async fn create_family(
        &self,
        profile_id: &EntityId,
        new_family: NewFamily,
    ) -> HearthResult<Family> {
        new_family.validate()?;
        let family_id = self
            .manager
            .create_family_and_bind_profile(profile_id, new_family)
            .await?;
        self.require_family(&family_id).await
    }

    /// Add `profile_id` to `family`'s members and bind the profile to it.
    pub async fn join_family(&self, profile_id: &EntityId, family: &Family) -> HearthResult<()> {
        if family.has_member(profile_id) {
            debug!("{profile_id} is already a member of {}; appending again", family.id);
        }
        self.manager.join_family_and_bind_profile(family, profile_id).await?;
        Ok(())
    }

    /// Append an item to the family grocery list. Returns the new list.
    pub async fn add_grocery_item(&self, family: &Family, item: &str) -> HearthResult<Vec<String>> {
        let item = item.trim();
        if item.is_empty() {
            return Err(HearthError::Validation("grocery item cannot be empty".into()));
        }
        let next = reconciler::append(&family.grocery_list, item.to_string());
        self.update_family_field(family, fields::GROCERY_LIST, Value::from(next.clone()))
            .await?;
        Ok(next)
    }

    /// Drop the first matching item from the grocery list. Returns the new
    /// list.
    pub async fn remove_grocery_item(&self, family: &Family, item: &str) -> HearthResult<Vec<String>> {
        let next = reconciler::remove_first(&family.grocery_list, &item.trim().to_string());
        self.update_family_field(family, fields::GROCERY_LIST, Value::from(next.clone()))
            .await?;
        Ok(next)
    }

    /// Replace the family message board text.
    pub async fn set_board_markdown(&self, family: &Family, markdown: &str) -> HearthResult<()> {
        self.update_family_field(family, fields::BOARD_MARKDOWN, Value::from(markdown))
            .await
    }

    async fn update_family_field(
        &self,
        family: &Family,
        field: &'static str,
        value: Value,
    ) -> HearthResult<()> {
        let mut batch = self.store().begin_batch();
        batch.update(Collection::Families, family.id.clone(), single_field(field, value));
        self.store().commit(batch).await?;

        self.event_bus.emit(AppEvent::FamilyUpdated {
            family_id: family.id.clone(),
            field,
        });
        self.event_bus.emit(AppEvent::FamilyRefreshRequested {
            family_id: family.id.clone(),
        });
        Ok(())
    }

    // ---- Residences and vehicles ----

    pub async fn load_residence(&self, id: &EntityId) -> HearthResult<Option<Residence>> {
        self.load(Collection::Residences, id).await
    }

    pub async fn load_vehicle(&self, id: &EntityId) -> HearthResult<Option<Vehicle>> {
        self.load(Collection::Vehicles, id).await
    }

    pub async fn add_residence(&self, family: &Family, draft: ResidenceDraft) -> HearthResult<EntityId> {
        draft.validate()?;
        let child = child_draft(to_document(&draft)?, draft.image);
        Ok(self
            .manager
            .create_linked_child(family, ChildKind::Residence, child)
            .await?)
    }

    pub async fn add_vehicle(&self, family: &Family, draft: VehicleDraft) -> HearthResult<EntityId> {
        draft.validate()?;
        let child = child_draft(to_document(&draft)?, draft.image);
        Ok(self
            .manager
            .create_linked_child(family, ChildKind::Vehicle, child)
            .await?)
    }

    pub async fn remove_residence(&self, family: &Family, id: &EntityId) -> HearthResult<()> {
        Ok(self
            .manager
            .remove_linked_child(family, ChildKind::Residence, id)
            .await?)
    }

    pub async fn remove_vehicle(&self, family: &Family, id: &EntityId) -> HearthResult<()> {
        Ok(self
            .manager
            .remove_linked_child(family, ChildKind::Vehicle, id)
            .await?)
    }

    /// Append an entry to a residence or vehicle service log.
    pub async fn log_service(
        &self,
        kind: ChildKind,
        child_id: &EntityId,
        entry: ServiceLogEntry,
    ) -> HearthResult<Vec<ServiceLogEntry>> {
        entry.validate()?;
        let document = self.require_child(kind, child_id).await?;
        let entries = reconciler::append(&list_field(&document, fields::SERVICE_LOG)?, entry);
        self.update_child_field(kind, child_id, fields::SERVICE_LOG, serde_json::to_value(&entries)?)
            .await?;
        Ok(entries)
    }

    /// Attach a maintenance rule to a residence or vehicle.
    pub async fn add_maintenance_marker(
        &self,
        kind: ChildKind,
        child_id: &EntityId,
        marker: MaintenanceMarker,
    ) -> HearthResult<Vec<MaintenanceMarker>> {
        marker.validate()?;
        let document = self.require_child(kind, child_id).await?;
        let markers = reconciler::append(&list_field(&document, fields::MAINTENANCE_MARKERS)?, marker);
        self.update_child_field(
            kind,
            child_id,
            fields::MAINTENANCE_MARKERS,
            serde_json::to_value(&markers)?,
        )
        .await?;
        Ok(markers)
    }

    /// Markers that have come due as of `today`. Vehicles are checked
    /// against their recorded odometer.
    pub async fn due_markers(
        &self,
        kind: ChildKind,
        child_id: &EntityId,
        today: NaiveDate,
    ) -> HearthResult<Vec<MaintenanceMarker>> {
        let document = self.require_child(kind, child_id).await?;
        let odometer = match kind {
            ChildKind::Vehicle => document.get("odometerMiles").and_then(Value::as_u64),
            ChildKind::Residence => None,
        };
        let markers: Vec<MaintenanceMarker> = list_field(&document, fields::MAINTENANCE_MARKERS)?;
        Ok(markers
            .into_iter()
            .filter(|m| m.is_due(today, odometer))
            .collect())
    }

    async fn require_child(&self, kind: ChildKind, id: &EntityId) -> HearthResult<Document> {
        self.store()
            .get(kind.collection(), id)
            .await?
            .ok_or_else(|| HearthError::NotFound {
                collection: kind.collection().to_string(),
                id: id.to_string(),
            })
    }

    async fn update_child_field(
        &self,
        kind: ChildKind,
        id: &EntityId,
        field: &str,
        value: Value,
    ) -> HearthResult<()> {
        let mut batch = self.store().begin_batch();
        batch.update(kind.collection(), id.clone(), single_field(field, value));
        self.store().commit(batch).await?;
        debug!("updated {field} on {kind} {id}");
        Ok(())
    }

    async fn load<T: DeserializeOwned>(
        &self,
        collection: Collection,
        id: &EntityId,
    ) -> HearthResult<Option<T>> {
        match self.store().get(collection, id).await? {
            Some(document) => Ok(Some(from_document(document)?)),
            None => Ok(None),
        }
    }
}

fn child_draft(document: Document, image: Option<PendingBlob>) -> ChildDraft {
    ChildDraft { document, pending_blob: image }
}

/// Deserialize an array field, treating a missing field as empty.
fn list_field<T: DeserializeOwned>(document: &Document, field: &str) -> HearthResult<Vec<T>> {
    match document.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => Ok(serde_json::from_value(value.clone())?),
    }
}

impl Service for HouseholdService {
    fn name(&self) -> &str {
        "household"
    }

    fn state(&self) -> ServiceState {
        self.state
    }

    fn init(&mut self) -> HearthResult<()> {
        self.state = ServiceState::Initializing;
        info!("household service initialized");
        self.state = ServiceState::Running;
        Ok(())
    }

    fn shutdown(&mut self) -> HearthResult<()> {
        self.state = ServiceState::Stopped;
        Ok(())
    }
}
