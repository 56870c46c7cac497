//! Optimistic UI state for one logical transaction.
//!
//! A form that submits a linked-entity transaction shows a spinner while the
//! commit is in flight and an error if it fails. The phase moves through an
//! explicit transition table and is published on a `watch` channel so any
//! number of views can render it.
//!
//! Each submission takes a [`Ticket`]. Only the ticket of the most recent
//! submission may complete the state; results for older tickets, or for any
//! ticket issued before [`UiStateController::abandon`], are dropped. The
//! commit itself is never cancelled.

use std::fmt;
use std::future::Future;

use tokio::sync::watch;
use tracing::debug;

use hearth_core::error::{TxError, TxResult};

/// Phase of a logical transaction as seen by the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxPhase {
    Idle,
    Pending,
    Success,
    Failed,
}

impl fmt::Display for TxPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Inputs driving [`TxPhase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiInput {
    Begin,
    Succeed,
    Fail,
    Acknowledge,
}

/// Transition table. `None` means the input is ignored in that phase.
pub fn transition(phase: TxPhase, input: UiInput) -> Option<TxPhase> {
    use TxPhase::*;
    use UiInput::*;

    match (phase, input) {
        (Idle | Pending | Success | Failed, Begin) => Some(Pending),
        (Pending, Succeed) => Some(Success),
        (Pending, Fail) => Some(Failed),
        (Success | Failed, Acknowledge) => Some(Idle),
        _ => None,
    }
}

/// Snapshot published to views.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    pub phase: TxPhase,
    pub in_flight: bool,
    pub last_error: Option<TxError>,
    /// Ticket generation this snapshot belongs to.
    pub generation: u64,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            phase: TxPhase::Idle,
            in_flight: false,
            last_error: None,
            generation: 0,
        }
    }
}

/// Handle for one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// In-flight and error state for one logical transaction.
pub struct UiStateController {
    name: String,
    state: watch::Sender<UiState>,
}

impl UiStateController {
    pub fn new(name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(UiState::default());
        Self { name: name.into(), state }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    /// Start a submission. A second call while one is pending supersedes it.
    pub fn begin(&self) -> Ticket {
        let mut ticket = Ticket(0);
        self.state.send_modify(|state| {
            state.generation += 1;
            ticket = Ticket(state.generation);
            if let Some(next) = transition(state.phase, UiInput::Begin) {
                state.phase = next;
            }
            state.in_flight = true;
            state.last_error = None;
        });
        debug!("{}: begin #{}", self.name, ticket.0);
        ticket
    }

    /// Record a successful commit. Returns false if the ticket is stale.
    pub fn succeed(&self, ticket: Ticket) -> bool {
        self.complete(ticket, UiInput::Succeed, None)
    }

    /// Record a failed commit. Returns false if the ticket is stale.
    pub fn fail(&self, ticket: Ticket, error: TxError) -> bool {
        self.complete(ticket, UiInput::Fail, Some(error))
    }

    /// Dismiss a shown result and return to `Idle`.
    pub fn acknowledge(&self) {
        self.state.send_if_modified(|state| match transition(state.phase, UiInput::Acknowledge) {
            Some(next) => {
                state.phase = next;
                state.last_error = None;
                true
            }
            None => false,
        });
    }

    /// The view went away. Any outstanding ticket becomes stale and the
    /// state resets to `Idle`.
    pub fn abandon(&self) {
        self.state.send_modify(|state| {
            let generation = state.generation + 1;
            *state = UiState { generation, ..UiState::default() };
        });
        debug!("{}: abandoned", self.name);
    }

    /// Run `fut` as a submission, completing the state with its result.
    pub async fn track<T, F>(&self, fut: F) -> TxResult<T>
    where
        F: Future<Output = TxResult<T>>,
    {
        let ticket = self.begin();
        let result = fut.await;
        match &result {
            Ok(_) => {
                self.succeed(ticket);
            }
            Err(e) => {
                self.fail(ticket, e.clone());
            }
        }
        result
    }

    fn complete(&self, ticket: Ticket, input: UiInput, error: Option<TxError>) -> bool {
        let name = &self.name;
        self.state.send_if_modified(|state| {
            if state.generation != ticket.0 {
                debug!("{name}: dropping result of stale ticket #{}", ticket.0);
                return false;
            }
            let Some(next) = transition(state.phase, input) else {
                return false;
            };
            state.phase = next;
            state.in_flight = false;
            state.last_error = error;
            true
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transition_table() {
        assert_eq!(transition(TxPhase::Idle, UiInput::Begin), Some(TxPhase::Pending));
        assert_eq!(transition(TxPhase::Pending, UiInput::Begin), Some(TxPhase::Pending));
        assert_eq!(transition(TxPhase::Pending, UiInput::Succeed), Some(TxPhase::Success));
        assert_eq!(transition(TxPhase::Pending, UiInput::Fail), Some(TxPhase::Failed));
        assert_eq!(transition(TxPhase::Failed, UiInput::Acknowledge), Some(TxPhase::Idle));
        assert_eq!(transition(TxPhase::Idle, UiInput::Succeed), None);
        assert_eq!(transition(TxPhase::Pending, UiInput::Acknowledge), None);
    }

    #[test]
    fn test_success_then_acknowledge() {
        let ui = UiStateController::new("add-vehicle");
        let ticket = ui.begin();
        assert!(ui.snapshot().in_flight);

        assert!(ui.succeed(ticket));
        let state = ui.snapshot();
        assert_eq!(state.phase, TxPhase::Success);
        assert!(!state.in_flight);

        ui.acknowledge();
        assert_eq!(ui.snapshot().phase, TxPhase::Idle);
    }

    #[test]
    fn test_failure_keeps_error_until_acknowledged() {
        let ui = UiStateController::new("add-vehicle");
        let ticket = ui.begin();
        ui.fail(ticket, TxError::StoreUnavailable("offline".into()));

        let state = ui.snapshot();
        assert_eq!(state.phase, TxPhase::Failed);
        assert!(!state.in_flight);
        assert_eq!(state.last_error, Some(TxError::StoreUnavailable("offline".into())));

        ui.acknowledge();
        assert!(ui.snapshot().last_error.is_none());
    }

    #[test]
    fn test_second_submission_supersedes_first() {
        let ui = UiStateController::new("add-vehicle");
        let first = ui.begin();
        let second = ui.begin();

        assert!(!ui.succeed(first));
        assert!(ui.snapshot().in_flight);

        assert!(ui.fail(second, TxError::Aborted));
        assert!(!ui.snapshot().in_flight);
        assert_eq!(ui.snapshot().phase, TxPhase::Failed);
    }

    #[test]
    fn test_abandon_hides_late_result() {
        let ui = UiStateController::new("add-residence");
        let ticket = ui.begin();
        ui.abandon();

        assert!(!ui.succeed(ticket));
        let state = ui.snapshot();
        assert_eq!(state.phase, TxPhase::Idle);
        assert!(!state.in_flight);
    }

    #[tokio::test]
    async fn test_track_clears_in_flight_on_error() {
        let ui = UiStateController::new("create-family");
        let mut rx = ui.subscribe();

        let result: TxResult<()> = ui.track(async { Err(TxError::StoreRejected("denied".into())) }).await;
        assert!(result.is_err());

        rx.changed().await.unwrap();
        let state = rx.borrow().clone();
        assert!(!state.in_flight);
        assert_eq!(state.phase, TxPhase::Failed);
    }
}
