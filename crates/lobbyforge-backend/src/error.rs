//! Error types for the backend layer.

/// Errors that can occur while resolving or talking to a backend provider.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    /// No provider is registered under the requested name.
    #[error("backend provider '{0}' is unavailable")]
    ProviderUnavailable(String),
}
