//! Core types shared across the backend seam.
//!
//! Everything in this module is provider-neutral: these are the shapes that
//! cross the boundary between the orchestrator and whichever backend
//! provider is currently active (Null/LAN, a platform lobby service, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The local user index this core drives. The orchestrator is written for a
/// single local player, so every identity and search call uses slot 0.
pub const LOCAL_USER: u32 = 0;

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player, as issued by a backend provider.
///
/// Newtype wrapper so a player id can't be confused with any other numeric
/// handle. Providers own the value; the orchestrator only passes it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// The local name of a session.
///
/// Sessions are addressed by name on the provider side. The orchestrator
/// always hosts and joins under the conventional [`SessionName::game`] name,
/// mirroring how a single client process has one game session at a time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionName(pub String);

impl SessionName {
    /// The conventional name for the one game session a process hosts or
    /// joins.
    pub fn game() -> Self {
        Self("GameSession".to_string())
    }

    /// Borrows the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SessionName {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The coarse lifecycle state of a named session, as reported by a provider.
///
/// ```text
/// NoSession → Creating → Pending → Starting → Active → Ending → Ended
///                                                         └→ Destroying
/// ```
///
/// Providers own the transitions; the orchestrator reads this for display
/// and for deciding whether a session can be started or ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// No session exists under this name.
    NoSession,
    /// A create request is being processed.
    Creating,
    /// Created but not started; players can be registered, but the match
    /// has not begun.
    Pending,
    /// A start request is being processed.
    Starting,
    /// The session is live and joinable (subject to its flags).
    Active,
    /// An end request is being processed.
    Ending,
    /// The session ended but still exists for inspection.
    Ended,
    /// The session is being torn down.
    Destroying,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoSession => "no session",
            Self::Creating => "creating",
            Self::Pending => "pending",
            Self::Starting => "starting",
            Self::Active => "active",
            Self::Ending => "ending",
            Self::Ended => "ended",
            Self::Destroying => "destroying",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A single advertised session attribute value.
///
/// Providers advertise a flat key/value map alongside a session so that
/// remote discovery can display server name, map, and any custom data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum AttributeValue {
    Text(String),
    Number(i64),
    Flag(bool),
}

impl AttributeValue {
    /// Returns the contained text, if this is a [`AttributeValue::Text`].
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// The provider-neutral settings bag a backend receives when creating a
/// session.
///
/// This is the flattened form of the caller's session configuration: every
/// visibility/join flag copied verbatim, the slot counts, and the advertised
/// key/value attributes visible to remote discovery. Providers must not
/// mutate it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeBag {
    /// Restrict discovery and connectivity to the local network.
    pub is_lan_match: bool,
    /// Number of publicly joinable slots.
    pub num_public_connections: u32,
    /// Number of invite/private slots.
    pub num_private_connections: u32,
    /// Advertise this session to discovery at all.
    pub should_advertise: bool,
    /// The host is a dedicated server process.
    pub is_dedicated: bool,
    /// Use the provider's presence channel for visibility.
    pub uses_presence: bool,
    /// Whether the provider's anti-cheat protection is requested.
    pub anti_cheat_protected: bool,
    /// Players may send invites for this session.
    pub allow_invites: bool,
    /// Players may join after the session has started.
    pub allow_join_in_progress: bool,
    /// Players may join through presence.
    pub allow_join_via_presence: bool,
    /// Presence joins are restricted to friends.
    pub allow_join_via_presence_friends_only: bool,
    /// Prefer lobby semantics when the provider supports them. Always set:
    /// lobby-capable providers give much better discovery behavior.
    pub use_lobbies_if_available: bool,
    /// Advertised key/value attributes, visible to remote discovery.
    /// `BTreeMap` keeps iteration order stable for display and tests.
    pub advertised: BTreeMap<String, AttributeValue>,
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Identifies one discovery pass.
///
/// The orchestrator stamps each search with a fresh id and the provider
/// echoes it back in the completion, so results from a search that has since
/// been replaced can be recognized and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchId(pub u64);

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}", self.0)
    }
}

/// Parameters for one session discovery pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Which search this is; echoed back in the completion.
    pub id: SearchId,
    /// Only query the local network.
    pub lan_only: bool,
    /// Query the provider's presence channel. You almost always want this
    /// on for lobby-style providers.
    pub via_presence: bool,
    /// Cap on the number of returned results.
    pub max_results: u32,
    /// Provider-side search deadline, in seconds. The orchestrator does not
    /// enforce this itself.
    pub timeout_secs: u32,
}

/// One discovered session, as returned by a provider search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// The provider-side session name; passed back verbatim when joining.
    pub session_name: SessionName,
    /// Display name of the owning user.
    pub owning_user_name: String,
    /// Round-trip estimate to the host, in milliseconds.
    pub ping_ms: u32,
    /// Public slots still open.
    pub open_public_connections: u32,
    /// Total public slots.
    pub num_public_connections: u32,
    /// The advertised attributes of the session.
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl SearchResult {
    /// The advertised server name, when present.
    pub fn server_name(&self) -> Option<&str> {
        self.attributes
            .get(crate::SETTING_SERVER_NAME)
            .and_then(AttributeValue::as_text)
    }

    /// The advertised map name, when present.
    pub fn map_name(&self) -> Option<&str> {
        self.attributes
            .get(crate::SETTING_MAP_NAME)
            .and_then(AttributeValue::as_text)
    }

    /// Public slots currently occupied.
    pub fn occupied_public_connections(&self) -> u32 {
        self.num_public_connections
            .saturating_sub(self.open_public_connections)
    }
}

// ---------------------------------------------------------------------------
// Named session introspection
// ---------------------------------------------------------------------------

/// A provider's read-only record of a session it is tracking locally.
///
/// Used for display and introspection (debug UI, tests). The orchestrator
/// never mutates one of these; all changes go through the
/// [`SessionService`](crate::SessionService) operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedSession {
    pub name: SessionName,
    pub state: SessionState,
    /// The player who created the session.
    pub owner: PlayerId,
    /// Whether this process is the host of the session.
    pub hosting: bool,
    pub open_public_connections: u32,
    pub open_private_connections: u32,
    /// Players explicitly registered into the session.
    pub registered_players: Vec<PlayerId>,
    /// The settings the session was created with.
    pub settings: AttributeBag,
}

// ---------------------------------------------------------------------------
// Join results
// ---------------------------------------------------------------------------

/// The outcome of an asynchronous join request.
///
/// Mirrors the result codes lobby-style providers report. Anything the
/// provider reports that we don't recognize maps to `UnknownError`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinResult {
    Success,
    SessionIsFull,
    SessionDoesNotExist,
    CouldNotRetrieveAddress,
    AlreadyInSession,
    UnknownError,
}

impl fmt::Display for JoinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::SessionIsFull => "session is full",
            Self::SessionDoesNotExist => "session does not exist",
            Self::CouldNotRetrieveAddress => "could not retrieve address",
            Self::AlreadyInSession => "already in session",
            Self::UnknownError => "unknown error",
        };
        write!(f, "{s}")
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&PlayerId(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn test_player_id_display() {
        assert_eq!(PlayerId(7).to_string(), "P-7");
    }

    #[test]
    fn test_session_name_game_is_conventional() {
        assert_eq!(SessionName::game().as_str(), "GameSession");
    }

    #[test]
    fn test_session_name_serializes_as_plain_string() {
        let json = serde_json::to_string(&SessionName::game()).unwrap();
        assert_eq!(json, "\"GameSession\"");
    }

    #[test]
    fn test_attribute_value_as_text() {
        assert_eq!(
            AttributeValue::Text("hi".into()).as_text(),
            Some("hi")
        );
        assert_eq!(AttributeValue::Number(3).as_text(), None);
        assert_eq!(AttributeValue::Flag(true).as_text(), None);
    }

    #[test]
    fn test_search_result_occupied_counts_from_open_slots() {
        let result = SearchResult {
            session_name: SessionName::game(),
            owning_user_name: "host".into(),
            ping_ms: 20,
            open_public_connections: 1,
            num_public_connections: 4,
            attributes: BTreeMap::new(),
        };
        assert_eq!(result.occupied_public_connections(), 3);
    }

    #[test]
    fn test_search_result_occupied_saturates_on_bad_provider_data() {
        // A provider reporting more open slots than total must not
        // underflow the occupancy count.
        let result = SearchResult {
            session_name: SessionName::game(),
            owning_user_name: "host".into(),
            ping_ms: 0,
            open_public_connections: 9,
            num_public_connections: 4,
            attributes: BTreeMap::new(),
        };
        assert_eq!(result.occupied_public_connections(), 0);
    }

    #[test]
    fn test_search_result_advertised_accessors() {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            crate::SETTING_SERVER_NAME.to_string(),
            AttributeValue::Text("My Server".into()),
        );
        attributes.insert(
            crate::SETTING_MAP_NAME.to_string(),
            AttributeValue::Text("Dummy Map".into()),
        );
        let result = SearchResult {
            session_name: SessionName::game(),
            owning_user_name: "host".into(),
            ping_ms: 0,
            open_public_connections: 4,
            num_public_connections: 4,
            attributes,
        };
        assert_eq!(result.server_name(), Some("My Server"));
        assert_eq!(result.map_name(), Some("Dummy Map"));
    }

    #[test]
    fn test_join_result_display() {
        assert_eq!(JoinResult::SessionIsFull.to_string(), "session is full");
        assert_eq!(JoinResult::UnknownError.to_string(), "unknown error");
    }
}
