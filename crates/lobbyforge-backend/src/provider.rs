//! The provider traits: what a backend must implement to plug in.
//!
//! A backend provider is the platform-specific half of the system — a LAN
//! broadcaster, a platform lobby service, or the always-available Null
//! stand-in. The orchestrator talks to it exclusively through these traits,
//! which keeps the core testable: a scripted mock provider slots in the same
//! way a production one does.
//!
//! # Call contract
//!
//! Every `-> bool` method means *accepted synchronously*. `true` says the
//! provider took the request and will emit exactly one matching
//! [`CompletionEvent`](crate::CompletionEvent) later; `false` says the
//! request was rejected outright and no event will follow. Providers must
//! never invoke anything re-entrantly — completions go through the event
//! channel, never through a direct callback.

use crate::types::{
    AttributeBag, NamedSession, PlayerId, SearchQuery, SearchResult,
    SessionName,
};

/// What a resolved provider can do.
///
/// A provider may lack either capability (a bare LAN beacon has no identity
/// service, for example). Callers check before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    /// The provider can authenticate a local user and issue player ids.
    pub identity: bool,
    /// The provider can create, discover, and join sessions.
    pub sessions: bool,
}

/// A resolved backend provider.
///
/// `Send` so the owning orchestrator can live inside an async task, but all
/// calls happen from a single control thread — providers don't need interior
/// synchronization for these entry points.
pub trait BackendProvider: Send {
    /// The name this provider was registered under.
    fn name(&self) -> &str;

    /// Which capability handles this provider exposes.
    fn capabilities(&self) -> Capabilities;

    /// The identity capability, when present.
    fn identity(&mut self) -> Option<&mut dyn IdentityService>;

    /// The session capability, when present.
    fn sessions(&mut self) -> Option<&mut dyn SessionService>;
}

/// Local-user authentication against a provider.
pub trait IdentityService {
    /// Requests an asynchronous login for the given local user. Returns
    /// whether the attempt was accepted; the outcome arrives as
    /// [`CompletionEvent::LoginComplete`](crate::CompletionEvent::LoginComplete).
    fn auto_login(&mut self, user: u32) -> bool;

    /// The unique id of the given local user, once known.
    fn unique_player_id(&self, user: u32) -> Option<PlayerId>;

    /// Display name for the given local user. Providers that can't resolve
    /// one return the `"(unknown)"` sentinel rather than failing.
    fn player_nickname(&self, user: u32) -> String;
}

/// Session lifecycle, discovery, and join operations against a provider.
pub trait SessionService {
    /// Requests creation of a named session with the given settings.
    /// Completion: [`CompletionEvent::CreateSessionComplete`](crate::CompletionEvent::CreateSessionComplete).
    fn create_session(
        &mut self,
        owner: PlayerId,
        name: &SessionName,
        settings: &AttributeBag,
    ) -> bool;

    /// Requests that a pending session start.
    /// Completion: [`CompletionEvent::StartSessionComplete`](crate::CompletionEvent::StartSessionComplete).
    fn start_session(&mut self, name: &SessionName) -> bool;

    /// Requests that an active session end. Synchronous rejection means the
    /// session wasn't in a state that can end.
    /// Completion: [`CompletionEvent::EndSessionComplete`](crate::CompletionEvent::EndSessionComplete).
    fn end_session(&mut self, name: &SessionName) -> bool;

    /// Destroys a session outright. Accepted-synchronously only; no
    /// completion event follows.
    fn destroy_session(&mut self, name: &SessionName) -> bool;

    /// Requests a discovery pass for the given local user.
    /// Completion: [`CompletionEvent::FindSessionsComplete`](crate::CompletionEvent::FindSessionsComplete),
    /// echoing `query.id`.
    fn find_sessions(&mut self, user: u32, query: &SearchQuery) -> bool;

    /// Requests a join of the session described by `chosen`.
    /// Completion: [`CompletionEvent::JoinSessionComplete`](crate::CompletionEvent::JoinSessionComplete).
    fn join_session(
        &mut self,
        player: PlayerId,
        name: &SessionName,
        chosen: &SearchResult,
    ) -> bool;

    /// Registers players into a local session record. Synchronous.
    fn register_players(
        &mut self,
        name: &SessionName,
        players: &[PlayerId],
    ) -> bool;

    /// The address a client should connect to for a joined session.
    fn resolved_connect_string(&self, name: &SessionName) -> Option<String>;

    /// Read-only introspection of a locally tracked session.
    fn named_session(&self, name: &SessionName) -> Option<&NamedSession>;

    /// How many sessions this provider currently tracks locally.
    fn session_count(&self) -> usize;
}
