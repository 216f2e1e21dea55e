//! Lobbyforge: multiplayer session orchestration over pluggable backends.
//!
//! Game code talks to one object, the [`SessionOrchestrator`]. It owns the
//! active [`BackendProvider`](lobbyforge_backend::BackendProvider), the
//! local identity state, the live [`SessionConfig`], and the latest search
//! results, and it drives the two big workflows:
//!
//! - **Hosting**: `host_game` creates a session from the live config, the
//!   create completion auto-chains into a start, and a started session
//!   travels the host to the target map.
//! - **Joining**: `find_sessions` fills the search cache, `join_session`
//!   joins one of its entries by index, and a successful join resolves the
//!   host's address and travels the client there.
//!
//! Backends are pluggable through a [`BackendRegistry`]; the in-process
//! `"Null"` provider is always registered and serves as the fallback when a
//! named backend fails to come up.
//!
//! ```no_run
//! use lobbyforge::{
//!     BackendRegistry, FindParams, NullTravel, SessionOrchestrator,
//! };
//!
//! let mut orchestrator =
//!     SessionOrchestrator::new(BackendRegistry::with_defaults(), NullTravel);
//! orchestrator.try_change_backend("Null");
//!
//! orchestrator.config_mut().server_name = "Friday Night".into();
//! orchestrator.host_game().unwrap();
//! orchestrator.pump();
//! assert!(orchestrator.is_hosting());
//! # let _ = orchestrator.find_sessions(FindParams::default());
//! ```

mod error;
mod orchestrator;
mod travel;

pub use error::LobbyforgeError;
pub use orchestrator::{FindParams, OperationKind, SessionOrchestrator};
pub use travel::{NullTravel, Travel};

// Re-export the layer crates so downstreams only depend on `lobbyforge`.
pub use lobbyforge_backend::{
    AttributeBag, AttributeValue, BackendEpoch, BackendError, BackendEvent,
    BackendProvider, BackendRegistry, Capabilities, CompletionEvent,
    CompletionSender, IdentityService, JoinResult, NamedSession, NullProvider,
    PlayerId, SearchId, SearchQuery, SearchResult, SessionName, SessionService,
    SessionState, LOCAL_USER, NULL_PROVIDER, SETTING_MAP_NAME,
    SETTING_SERVER_NAME,
};
pub use lobbyforge_identity::{IdentityError, IdentityManager, IdentityState};
pub use lobbyforge_session::{
    build_attributes, SearchResultCache, SessionConfig, SessionError,
};
