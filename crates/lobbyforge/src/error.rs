//! Unified error type for the Lobbyforge orchestrator.

use lobbyforge_backend::{BackendError, JoinResult};
use lobbyforge_identity::IdentityError;
use lobbyforge_session::SessionError;

use crate::orchestrator::OperationKind;

/// Top-level error covering every failure the orchestrator can report.
///
/// Layer-specific errors are wrapped transparently (the `#[from]` impls let
/// `?` convert them); the remaining variants are orchestration-level
/// conditions that don't belong to any single layer. Every failure is also
/// latched into the orchestrator's `last_error` so a polling caller (the
/// debug UI) can display it.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LobbyforgeError {
    /// A backend-layer error (provider resolution).
    #[error(transparent)]
    Backend(#[from] BackendError),

    /// An identity-layer error (capability, player id).
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// A session-layer error (search cache, join index).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The backend reported or synchronously rejected session creation.
    #[error("session create failed")]
    SessionCreateFailed,

    /// The backend reported or synchronously rejected session start.
    #[error("session start failed")]
    SessionStartFailed,

    /// The backend reported or synchronously rejected a discovery pass.
    #[error("session search failed")]
    FindSessionsFailed,

    /// The backend reported a non-success join outcome.
    #[error("join failed: {0}")]
    JoinFailed(JoinResult),

    /// A join completed but the backend could not resolve the address to
    /// connect to.
    #[error("connect string unavailable for joined session")]
    ConnectStringUnavailable,

    /// The operation conflicts with one already in flight.
    #[error("{0} operation already in flight")]
    OperationPending(OperationKind),
}
