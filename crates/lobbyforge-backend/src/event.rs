//! Completion events: how asynchronous backend outcomes reach the caller.
//!
//! Every provider operation is fire-and-register: the caller issues a
//! request, gets back a synchronous accepted/rejected bool, and the real
//! outcome arrives later as a [`CompletionEvent`] on a channel. The caller
//! drains that channel on its own control thread, so completion handling is
//! single-threaded and deterministic — a test can push an event and observe
//! the state change synchronously.
//!
//! Events are stamped with the [`BackendEpoch`] of the provider that emitted
//! them. When the active backend is swapped out, its epoch dies with it, and
//! any event still in flight from the old provider is recognizably stale.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::types::{JoinResult, PlayerId, SearchId, SearchResult, SessionName};

// ---------------------------------------------------------------------------
// Epochs
// ---------------------------------------------------------------------------

/// Generation stamp for a resolved backend.
///
/// One epoch is issued per resolve; it never repeats. An event whose epoch
/// doesn't match the currently active backend came from a torn-down provider
/// and must be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BackendEpoch(pub u64);

impl std::fmt::Display for BackendEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "E-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// The asynchronous outcome of one backend operation.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
    /// Outcome of [`IdentityService::auto_login`](crate::IdentityService::auto_login).
    LoginComplete {
        user: u32,
        success: bool,
        player_id: Option<PlayerId>,
        error: Option<String>,
    },

    /// Outcome of a create-session request.
    CreateSessionComplete {
        session: SessionName,
        success: bool,
    },

    /// Outcome of a start-session request.
    StartSessionComplete {
        session: SessionName,
        success: bool,
    },

    /// Outcome of an end-session request.
    EndSessionComplete {
        session: SessionName,
        success: bool,
    },

    /// Outcome of a discovery pass. `results` is the complete, ordered
    /// result sequence; order is the provider's, never re-sorted.
    FindSessionsComplete {
        search: SearchId,
        success: bool,
        results: Vec<SearchResult>,
    },

    /// Outcome of a join request.
    JoinSessionComplete {
        session: SessionName,
        result: JoinResult,
    },
}

impl CompletionEvent {
    /// Short name for logging.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::LoginComplete { .. } => "login",
            Self::CreateSessionComplete { .. } => "create-session",
            Self::StartSessionComplete { .. } => "start-session",
            Self::EndSessionComplete { .. } => "end-session",
            Self::FindSessionsComplete { .. } => "find-sessions",
            Self::JoinSessionComplete { .. } => "join-session",
        }
    }
}

/// A completion event stamped with the epoch of the backend that emitted it.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendEvent {
    pub epoch: BackendEpoch,
    pub event: CompletionEvent,
}

// ---------------------------------------------------------------------------
// Channel plumbing
// ---------------------------------------------------------------------------

/// The sending half handed to a provider at resolve time.
///
/// Wraps an unbounded channel sender and stamps every event with the
/// provider's epoch, so a provider cannot forge events on behalf of a newer
/// backend. Cloneable: providers may hand copies to internal tasks.
#[derive(Debug, Clone)]
pub struct CompletionSender {
    tx: UnboundedSender<BackendEvent>,
    epoch: BackendEpoch,
}

impl CompletionSender {
    /// Creates a sender that stamps events with `epoch`.
    pub fn new(tx: UnboundedSender<BackendEvent>, epoch: BackendEpoch) -> Self {
        Self { tx, epoch }
    }

    /// The epoch this sender stamps onto events.
    pub fn epoch(&self) -> BackendEpoch {
        self.epoch
    }

    /// Emits a completion event. Delivery is best-effort: if the receiving
    /// side is gone the event is dropped, which is exactly the behavior we
    /// want from a torn-down orchestrator.
    pub fn send(&self, event: CompletionEvent) {
        let _ = self.tx.send(BackendEvent {
            epoch: self.epoch,
            event,
        });
    }
}

/// Creates the completion channel: the receiver goes to the orchestrator,
/// the sender is wrapped per-backend via [`CompletionSender::new`].
pub fn completion_channel()
-> (UnboundedSender<BackendEvent>, UnboundedReceiver<BackendEvent>) {
    mpsc::unbounded_channel()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_sender_stamps_epoch() {
        let (tx, mut rx) = completion_channel();
        let sender = CompletionSender::new(tx, BackendEpoch(3));

        sender.send(CompletionEvent::FindSessionsComplete {
            search: SearchId(1),
            success: false,
            results: vec![],
        });

        let ev = rx.try_recv().expect("event should be queued");
        assert_eq!(ev.epoch, BackendEpoch(3));
    }

    #[test]
    fn test_completion_sender_send_after_receiver_dropped_is_silent() {
        let (tx, rx) = completion_channel();
        let sender = CompletionSender::new(tx, BackendEpoch(1));
        drop(rx);

        // Must not panic; a dead receiver means the orchestrator is gone
        // and the event is stale by definition.
        sender.send(CompletionEvent::LoginComplete {
            user: 0,
            success: true,
            player_id: Some(PlayerId(1)),
            error: None,
        });
    }

    #[test]
    fn test_event_kind_names() {
        let ev = CompletionEvent::CreateSessionComplete {
            session: SessionName::game(),
            success: true,
        };
        assert_eq!(ev.kind_name(), "create-session");
    }
}
