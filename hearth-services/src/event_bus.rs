//! Typed event bus for household state changes.
//!
//! Uses a tokio broadcast channel so the transaction layer can ask views to
//! refresh without knowing who is listening. Every subscriber receives every
//! event.

use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use hearth_models::models::ChildKind;
use hearth_models::EntityId;

/// Application-level events emitted after a store write resolves.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The family document changed and any view showing it should reload.
    FamilyRefreshRequested {
        family_id: EntityId,
    },
    /// A residence or vehicle was created and linked to its family.
    ChildCreated {
        family_id: EntityId,
        kind: ChildKind,
        child_id: EntityId,
    },
    /// A residence or vehicle was deleted and unlinked from its family.
    ChildRemoved {
        family_id: EntityId,
        kind: ChildKind,
        child_id: EntityId,
    },
    /// A profile was bound to a newly founded family.
    ProfileBound {
        profile_id: EntityId,
        family_id: EntityId,
    },
    /// A profile joined an existing family.
    MemberJoined {
        profile_id: EntityId,
        family_id: EntityId,
    },
    /// A family field outside the membership lists changed (grocery list,
    /// board text).
    FamilyUpdated {
        family_id: EntityId,
        field: &'static str,
    },
    /// A linked-entity transaction failed. `kind` is the `TxError` label.
    TransactionFailed {
        operation: &'static str,
        kind: &'static str,
        message: String,
    },
}

/// Application-wide event bus backed by a tokio broadcast channel.
///
/// Slow subscribers that fall behind receive a `Lagged` error and may miss
/// events, which is acceptable for refresh-style consumers.
#[derive(Clone)]
pub struct EventBus {
    sender: Arc<broadcast::Sender<AppEvent>>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Subscribe to receive application events.
    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Emit an event to all subscribers.
    pub fn emit(&self, event: AppEvent) {
        let label = event_label(&event);
        match self.sender.send(event) {
            Ok(count) => {
                debug!("event_bus: emitted {label} to {count} subscriber(s)");
            }
            Err(_) => {
                debug!("event_bus: no subscribers for {label}");
            }
        }
    }

    /// Get the current number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

fn event_label(event: &AppEvent) -> &'static str {
    match event {
        AppEvent::FamilyRefreshRequested { .. } => "FamilyRefreshRequested",
        AppEvent::ChildCreated { .. } => "ChildCreated",
        AppEvent::ChildRemoved { .. } => "ChildRemoved",
        AppEvent::ProfileBound { .. } => "ProfileBound",
        AppEvent::MemberJoined { .. } => "MemberJoined",
        AppEvent::FamilyUpdated { .. } => "FamilyUpdated",
        AppEvent::TransactionFailed { .. } => "TransactionFailed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_event_bus_emit_receive() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(AppEvent::FamilyRefreshRequested {
            family_id: "fam1".into(),
        });

        let event = rx.recv().await.unwrap();
        assert_eq!(
            event,
            AppEvent::FamilyRefreshRequested { family_id: "fam1".into() }
        );
    }

    #[tokio::test]
    async fn test_event_bus_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(AppEvent::FamilyUpdated {
            family_id: "fam1".into(),
            field: "groceryList",
        });

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.unwrap() {
                AppEvent::FamilyUpdated { field, .. } => assert_eq!(field, "groceryList"),
                other => panic!("unexpected event: {other:?}"),
            }
        }
    }

    #[test]
    fn test_emit_without_subscribers() {
        let bus = EventBus::new(0);
        bus.emit(AppEvent::TransactionFailed {
            operation: "create_linked_child",
            kind: "aborted",
            message: String::new(),
        });
        assert_eq!(bus.subscriber_count(), 0);
    }
}
