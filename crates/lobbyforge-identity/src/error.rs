//! Error types for the identity layer.

/// Errors that can occur while resolving the local user's identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum IdentityError {
    /// The active provider has no identity capability.
    #[error("provider has no identity capability")]
    IdentityUnavailable,

    /// The local player's unique id could not be resolved.
    #[error("local player id is invalid or unavailable")]
    PlayerIdInvalid,
}
