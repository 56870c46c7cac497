//! Linked-entity transactions.
//!
//! Every child residence or vehicle is referenced from exactly one family
//! through an ordered id list. Creating or removing a child therefore writes
//! two documents, and this module pairs those writes so the list never points
//! at a document that was not written in the same commit.
//!
//! Parent lists are computed from the snapshot the caller passes in. Nothing
//! is re-read before the commit, so two concurrent calls against the same
//! snapshot race and the later commit's list wins.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, warn};

use hearth_core::constants::fields;
use hearth_core::error::{TxError, TxResult};
use hearth_models::document::{single_field, to_document, Document};
use hearth_models::{
    new_id, BlobStore, ChildKind, Collection, EntityId, EntityStore, Family, NewFamily,
    PendingBlob,
};

use crate::event_bus::{AppEvent, EventBus};
use crate::reconciler;

/// A child document ready to be linked, plus an optional image to upload
/// first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildDraft {
    pub document: Document,
    pub pending_blob: Option<PendingBlob>,
}

impl ChildDraft {
    pub fn new(document: Document) -> Self {
        Self { document, pending_blob: None }
    }

    pub fn with_blob(mut self, blob: PendingBlob) -> Self {
        self.pending_blob = Some(blob);
        self
    }
}

/// JSON array of ids as stored in a membership list field.
pub fn id_list(ids: &[EntityId]) -> Value {
    Value::Array(ids.iter().map(|id| Value::String(id.as_str().to_string())).collect())
}

/// Storage key for an uploaded child image.
pub fn blob_key(kind: ChildKind, child_id: &EntityId, blob: &PendingBlob) -> String {
    format!("{}/{}/{}", kind.collection(), child_id, blob.safe_file_name())
}

/// Pairs child writes with parent list updates in one batch commit.
#[derive(Clone)]
pub struct LinkedEntityTransactionManager {
    store: Arc<dyn EntityStore>,
    blobs: Arc<dyn BlobStore>,
    event_bus: EventBus,
}

impl LinkedEntityTransactionManager {
    pub fn new(store: Arc<dyn EntityStore>, blobs: Arc<dyn BlobStore>, event_bus: EventBus) -> Self {
        Self { store, blobs, event_bus }
    }

    pub fn store(&self) -> &Arc<dyn EntityStore> {
        &self.store
    }

    /// Create a child document and append its id to the family's list for
    /// `kind`, returning the new id.
    ///
    /// A pending image is uploaded before anything is staged; if the upload
    /// fails no document is written. Otherwise the child `set` and the family
    /// list `update` commit together or not at all.
    pub async fn create_linked_child(
        &self,
        parent: &Family,
        kind: ChildKind,
        draft: ChildDraft,
    ) -> TxResult<EntityId> {
        let child_id = new_id();
        let ChildDraft { mut document, pending_blob } = draft;
        document.insert(fields::ID.to_string(), Value::String(child_id.to_string()));

        if let Some(blob) = pending_blob {
            let key = blob_key(kind, &child_id, &blob);
            match self.blobs.upload_blob(&key, &blob.bytes).await {
                Ok(url) => {
                    debug!("uploaded {} byte image for {kind} {child_id}", blob.bytes.len());
                    document.insert(fields::IMAGE_URL.to_string(), Value::String(url));
                }
                Err(e) => {
                    let err = TxError::BlobUploadFailed(e);
                    return Err(self.failed("create_linked_child", err));
                }
            }
        }

        let next = reconciler::append(parent.children(kind), child_id.clone());

        let mut batch = self.store.begin_batch();
        batch
            .set(kind.collection(), child_id.clone(), document)
            .update(
                Collection::Families,
                parent.id.clone(),
                single_field(kind.list_field(), id_list(&next)),
            );

        if let Err(e) = self.store.commit(batch).await {
            return Err(self.failed("create_linked_child", e.into()));
        }

        info!("created {kind} {child_id} in family {}", parent.id);
        self.event_bus.emit(AppEvent::ChildCreated {
            family_id: parent.id.clone(),
            kind,
            child_id: child_id.clone(),
        });
        self.refresh(&parent.id);
        Ok(child_id)
    }

    /// Delete a child document, then drop the first occurrence of its id from
    /// the family's list.
    ///
    /// The delete is not part of the batch. If it succeeds and the list update
    /// fails, the family keeps a reference to the deleted child until the
    /// removal is retried.
    pub async fn remove_linked_child(
        &self,
        parent: &Family,
        kind: ChildKind,
        child_id: &EntityId,
    ) -> TxResult<()> {
        if let Err(e) = self.store.delete(kind.collection(), child_id).await {
            return Err(self.failed("remove_linked_child", e.into()));
        }

        let next = reconciler::remove_first(parent.children(kind), child_id);

        let mut batch = self.store.begin_batch();
        batch.update(
            Collection::Families,
            parent.id.clone(),
            single_field(kind.list_field(), id_list(&next)),
        );

        if let Err(e) = self.store.commit(batch).await {
            warn!(
                "{kind} {child_id} deleted but family {} still lists it; retry the removal",
                parent.id
            );
            return Err(self.failed("remove_linked_child", e.into()));
        }

        info!("removed {kind} {child_id} from family {}", parent.id);
        self.event_bus.emit(AppEvent::ChildRemoved {
            family_id: parent.id.clone(),
            kind,
            child_id: child_id.clone(),
        });
        self.refresh(&parent.id);
        Ok(())
    }

    /// Found a family headed by `profile_id` and point the profile at it in
    /// the same commit.
    pub async fn create_family_and_bind_profile(
        &self,
        profile_id: &EntityId,
        new_family: NewFamily,
    ) -> TxResult<EntityId> {
        let family_id = new_id();
        let family = Family::founded_by(family_id.clone(), profile_id.clone(), new_family);
        let document = match to_document(&family) {
            Ok(doc) => doc,
            Err(e) => {
                let err = TxError::StoreRejected(e.to_string());
                return Err(self.failed("create_family_and_bind_profile", err));
            }
        };

        let mut batch = self.store.begin_batch();
        batch
            .set(Collection::Families, family_id.clone(), document)
            .update(
                Collection::Profiles,
                profile_id.clone(),
                single_field(fields::FAMILY_ID, Value::String(family_id.to_string())),
            );

        if let Err(e) = self.store.commit(batch).await {
            return Err(self.failed("create_family_and_bind_profile", e.into()));
        }

        info!("family {family_id} founded by {profile_id}");
        self.event_bus.emit(AppEvent::ProfileBound {
            profile_id: profile_id.clone(),
            family_id: family_id.clone(),
        });
        self.refresh(&family_id);
        Ok(family_id)
    }

    /// Append `profile_id` to the family's members and point the profile at
    /// the family in the same commit. Joining twice lists the member twice.
    pub async fn join_family_and_bind_profile(
        &self,
        family: &Family,
        profile_id: &EntityId,
    ) -> TxResult<()> {
        let members = reconciler::append(&family.members, profile_id.clone());

        let mut batch = self.store.begin_batch();
        batch
            .update(
                Collection::Families,
                family.id.clone(),
                single_field(fields::MEMBERS, id_list(&members)),
            )
            .update(
                Collection::Profiles,
                profile_id.clone(),
                single_field(fields::FAMILY_ID, Value::String(family.id.to_string())),
            );

        if let Err(e) = self.store.commit(batch).await {
            return Err(self.failed("join_family_and_bind_profile", e.into()));
        }

        info!("{profile_id} joined family {}", family.id);
        self.event_bus.emit(AppEvent::MemberJoined {
            profile_id: profile_id.clone(),
            family_id: family.id.clone(),
        });
        self.refresh(&family.id);
        Ok(())
    }

    fn refresh(&self, family_id: &EntityId) {
        self.event_bus.emit(AppEvent::FamilyRefreshRequested {
            family_id: family_id.clone(),
        });
    }

    fn failed(&self, operation: &'static str, err: TxError) -> TxError {
        warn!("{operation} failed ({}): {err}", err.kind());
        self.event_bus.emit(AppEvent::TransactionFailed {
            operation,
            kind: err.kind(),
            message: err.to_string(),
        });
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hearth_core::error::StoreError;
    use hearth_models::{BatchOp, MemoryStore};
    use serde_json::json;

    fn manager(store: &Arc<MemoryStore>) -> (LinkedEntityTransactionManager, EventBus) {
        let bus = EventBus::new(16);
        let mgr = LinkedEntityTransactionManager::new(store.clone(), store.clone(), bus.clone());
        (mgr, bus)
    }

    async fn seeded_family(store: &MemoryStore, vehicles: &[&str]) -> Family {
        let mut family = Family::founded_by("fam1".into(), "user1".into(), NewFamily::new("Smiths"));
        family.vehicles = vehicles.iter().map(|v| EntityId::from(*v)).collect();
        store.put(Collection::Families, "fam1".into(), to_document(&family).unwrap()).await;
        family
    }

    #[tokio::test]
    async fn test_create_stages_child_and_parent_list() {
        let store = Arc::new(MemoryStore::new());
        let (mgr, _bus) = manager(&store);
        let family = seeded_family(&store, &["veh1"]).await;

        let draft = ChildDraft::new(single_field("make", json!("Honda")));
        let id = mgr.create_linked_child(&family, ChildKind::Vehicle, draft).await.unwrap();

        let batches = store.committed_batches().await;
        assert_eq!(batches.len(), 1);
        match &batches[0].ops()[0] {
            BatchOp::Set { collection, id: set_id, document } => {
                assert_eq!(*collection, Collection::Vehicles);
                assert_eq!(set_id, &id);
                assert_eq!(document["id"], json!(id.as_str()));
            }
            other => panic!("expected set, got {other:?}"),
        }
        match &batches[0].ops()[1] {
            BatchOp::Update { fields, .. } => {
                assert_eq!(fields["vehicles"], json!(["veh1", id.as_str()]));
            }
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_upload_url_written_into_child() {
        let store = Arc::new(MemoryStore::new());
        let (mgr, _bus) = manager(&store);
        let family = seeded_family(&store, &[]).await;

        let draft = ChildDraft::new(single_field("name", json!("Cabin")))
            .with_blob(PendingBlob::new("front door.png", vec![9, 9]));
        let id = mgr.create_linked_child(&family, ChildKind::Residence, draft).await.unwrap();

        let doc = store.get(Collection::Residences, &id).await.unwrap().unwrap();
        let key = format!("residences/{id}/front_door.png");
        assert_eq!(doc["imageUrl"], json!(format!("memory://blobs/{key}")));
        assert_eq!(store.read_blob(&key).await, Some(vec![9, 9]));
    }

    #[tokio::test]
    async fn test_failures_emit_transaction_failed() {
        let store = Arc::new(MemoryStore::new());
        let (mgr, bus) = manager(&store);
        let mut rx = bus.subscribe();
        let family = seeded_family(&store, &[]).await;

        store.fail_next_commit(StoreError::Aborted).await;
        let err = mgr
            .create_linked_child(&family, ChildKind::Vehicle, ChildDraft::default())
            .await
            .unwrap_err();
        assert_eq!(err, TxError::Aborted);

        match rx.recv().await.unwrap() {
            AppEvent::TransactionFailed { operation, kind, .. } => {
                assert_eq!(operation, "create_linked_child");
                assert_eq!(kind, "aborted");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_join_family_appends_member_and_binds() {
        let store = Arc::new(MemoryStore::new());
        let (mgr, _bus) = manager(&store);
        let family = seeded_family(&store, &[]).await;
        store.put(Collection::Profiles, "user2".into(), single_field("displayName", json!("Bo"))).await;

        mgr.join_family_and_bind_profile(&family, &"user2".into()).await.unwrap();

        let fam = store.get(Collection::Families, &"fam1".into()).await.unwrap().unwrap();
        assert_eq!(fam["members"], json!(["user1", "user2"]));
        let profile = store.get(Collection::Profiles, &"user2".into()).await.unwrap().unwrap();
        assert_eq!(profile["familyId"], json!("fam1"));
    }

    #[test]
    fn test_blob_key_layout() {
        let blob = PendingBlob::new("car.jpg", vec![]);
        assert_eq!(blob_key(ChildKind::Vehicle, &"veh1".into(), &blob), "vehicles/veh1/car.jpg");
    }
}
