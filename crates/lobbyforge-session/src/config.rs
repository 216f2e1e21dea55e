//! The caller-owned session configuration.
//!
//! One `SessionConfig` lives next to the orchestrator and is freely edited
//! by the caller (typically a debug/admin UI) between operations. It is read
//! exactly once, at the moment a host request is issued — which is also the
//! concurrency contract: don't mutate it while a host operation is in
//! flight. The orchestrator never writes to it except when a backend switch
//! resets everything to defaults.

use serde::{Deserialize, Serialize};

/// Separator used when joining travel arguments into one string.
const ARGUMENT_SEPARATOR: &str = "?";

/// Everything the caller can tune about a hosted session.
///
/// The defaults are a sensible public 4-slot presence-advertised game; a UI
/// only has to fill in `server_name` and pick maps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Human-readable server name, advertised to discovery.
    pub server_name: String,
    /// The map the host opens once the session starts.
    pub target_map: String,
    /// The map name advertised to discovery (display form of `target_map`).
    pub public_map_name: String,
    /// The map used for the pre-game lobby.
    pub lobby_map: String,
    /// Travel arguments, joined with `?` when opening the level. Should
    /// include `listen` for a listen server.
    pub map_arguments: Vec<String>,
    /// Publicly joinable slots.
    pub num_public_connections: u32,
    /// Invite-only slots.
    pub num_private_connections: u32,
    /// Restrict the session to the local network.
    pub is_lan_match: bool,
    /// Advertise the session to discovery.
    pub should_advertise: bool,
    /// Host as a dedicated server (no local player in the session).
    pub is_dedicated: bool,
    /// Publish through the provider's presence channel. On lobby-style
    /// providers this makes hosting create a lobby rather than a raw
    /// server session.
    pub uses_presence: bool,
    /// Request provider anti-cheat protection.
    pub anti_cheat_protected: bool,
    /// Allow players to send invites.
    pub allow_invites: bool,
    /// Allow joining after the match has started.
    pub allow_join_in_progress: bool,
    /// Allow joining through presence.
    pub allow_join_via_presence: bool,
    /// Restrict presence joins to friends.
    pub allow_join_via_presence_friends_only: bool,
    /// Whether host-side level travel is absolute.
    pub travel_absolute: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_name: String::new(),
            target_map: "MP_Dummy".to_string(),
            public_map_name: "Dummy Map".to_string(),
            lobby_map: "MP_Lobby".to_string(),
            map_arguments: Vec::new(),
            num_public_connections: 4,
            num_private_connections: 0,
            is_lan_match: false,
            should_advertise: true,
            is_dedicated: false,
            uses_presence: true,
            anti_cheat_protected: false,
            allow_invites: true,
            allow_join_in_progress: true,
            allow_join_via_presence: true,
            allow_join_via_presence_friends_only: false,
            travel_absolute: true,
        }
    }
}

impl SessionConfig {
    /// The travel argument string for opening the target level:
    /// the arguments joined with `?`.
    pub fn travel_arguments(&self) -> String {
        self.map_arguments.join(ARGUMENT_SEPARATOR)
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_public_presence_game() {
        let config = SessionConfig::default();

        assert_eq!(config.num_public_connections, 4);
        assert_eq!(config.num_private_connections, 0);
        assert!(!config.is_lan_match);
        assert!(config.should_advertise);
        assert!(!config.is_dedicated);
        assert!(config.uses_presence);
        assert!(config.allow_join_in_progress);
        assert!(config.allow_join_via_presence);
        assert!(!config.allow_join_via_presence_friends_only);
        assert!(config.allow_invites);
        assert!(!config.anti_cheat_protected);
        assert!(config.travel_absolute);
        assert_eq!(config.target_map, "MP_Dummy");
        assert_eq!(config.lobby_map, "MP_Lobby");
    }

    #[test]
    fn test_travel_arguments_joined_with_question_marks() {
        let config = SessionConfig {
            map_arguments: vec!["listen".into(), "bIsLobby=1".into()],
            ..SessionConfig::default()
        };
        assert_eq!(config.travel_arguments(), "listen?bIsLobby=1");
    }

    #[test]
    fn test_travel_arguments_empty_when_no_arguments() {
        assert_eq!(SessionConfig::default().travel_arguments(), "");
    }
}
