//! Backend provider interface for Lobbyforge.
//!
//! This crate defines everything that crosses the seam between the session
//! orchestrator and a pluggable backend provider:
//!
//! 1. **Types** — player ids, session names/states, attribute bags, search
//!    queries and results ([`types`])
//! 2. **Traits** — [`BackendProvider`] with its [`IdentityService`] and
//!    [`SessionService`] capabilities
//! 3. **Completion events** — the one-shot asynchronous outcomes a provider
//!    emits ([`CompletionEvent`], epoch-stamped via [`CompletionSender`])
//! 4. **Registry** — name → provider resolution ([`BackendRegistry`])
//! 5. **Null provider** — the always-available in-process fallback
//!    ([`NullProvider`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Orchestrator (above)  ← drives Host/Find/Join against a resolved provider
//!     ↕
//! Backend seam (this crate)  ← traits, events, registry
//!     ↕
//! Provider impls (below)  ← Null here; platform lobby services elsewhere
//! ```

mod error;
mod event;
mod null;
mod provider;
mod registry;
mod types;

pub use error::BackendError;
pub use event::{
    completion_channel, BackendEpoch, BackendEvent, CompletionEvent,
    CompletionSender,
};
pub use null::NullProvider;
pub use provider::{
    BackendProvider, Capabilities, IdentityService, SessionService,
};
pub use registry::{BackendRegistry, ProviderFactory, NULL_PROVIDER};
pub use types::{
    AttributeBag, AttributeValue, JoinResult, NamedSession, PlayerId,
    SearchId, SearchQuery, SearchResult, SessionName, SessionState,
    LOCAL_USER,
};

/// Advertised attribute key for the human-readable server name.
pub const SETTING_SERVER_NAME: &str = "SERVER_NAME";

/// Advertised attribute key for the public-facing map name.
pub const SETTING_MAP_NAME: &str = "MAPNAME";
