//! Error types for the session layer.

/// Errors that can occur when working with session configuration and
/// discovery results.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// A join was requested before any discovery pass ran.
    #[error("no session search has been performed")]
    NoSearchPerformed,

    /// A join referenced a result index outside the cached snapshot.
    #[error("join index {index} out of range, {len} results cached")]
    JoinIndexOutOfRange { index: usize, len: usize },
}
