//! The settings builder: `SessionConfig` → provider-neutral attribute bag.
//!
//! A pure transform with no failure mode. Every flag is copied verbatim,
//! the fixed advertised keys (server name, map name) are filled in, and
//! lobby semantics are always requested when the provider supports them.

use std::collections::BTreeMap;

use lobbyforge_backend::{
    AttributeBag, AttributeValue, SETTING_MAP_NAME, SETTING_SERVER_NAME,
};

use crate::SessionConfig;

/// Builds the attribute bag a backend expects from the caller's config.
///
/// Deterministic: the same config always produces the same bag, and the bag
/// carries every flag field-for-field.
pub fn build_attributes(config: &SessionConfig) -> AttributeBag {
    let mut advertised = BTreeMap::new();
    advertised.insert(
        SETTING_SERVER_NAME.to_string(),
        AttributeValue::Text(config.server_name.clone()),
    );
    advertised.insert(
        SETTING_MAP_NAME.to_string(),
        AttributeValue::Text(config.public_map_name.clone()),
    );

    AttributeBag {
        is_lan_match: config.is_lan_match,
        num_public_connections: config.num_public_connections,
        num_private_connections: config.num_private_connections,
        should_advertise: config.should_advertise,
        is_dedicated: config.is_dedicated,
        uses_presence: config.uses_presence,
        anti_cheat_protected: config.anti_cheat_protected,
        allow_invites: config.allow_invites,
        allow_join_in_progress: config.allow_join_in_progress,
        allow_join_via_presence: config.allow_join_via_presence,
        allow_join_via_presence_friends_only: config
            .allow_join_via_presence_friends_only,
        use_lobbies_if_available: true,
        advertised,
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_copies_every_flag_field_for_field() {
        let config = SessionConfig {
            is_lan_match: true,
            should_advertise: false,
            is_dedicated: true,
            uses_presence: false,
            anti_cheat_protected: true,
            allow_invites: false,
            allow_join_in_progress: false,
            allow_join_via_presence: false,
            allow_join_via_presence_friends_only: true,
            num_public_connections: 12,
            num_private_connections: 3,
            ..SessionConfig::default()
        };

        let bag = build_attributes(&config);

        assert_eq!(bag.is_lan_match, config.is_lan_match);
        assert_eq!(bag.should_advertise, config.should_advertise);
        assert_eq!(bag.is_dedicated, config.is_dedicated);
        assert_eq!(bag.uses_presence, config.uses_presence);
        assert_eq!(bag.anti_cheat_protected, config.anti_cheat_protected);
        assert_eq!(bag.allow_invites, config.allow_invites);
        assert_eq!(
            bag.allow_join_in_progress,
            config.allow_join_in_progress
        );
        assert_eq!(
            bag.allow_join_via_presence,
            config.allow_join_via_presence
        );
        assert_eq!(
            bag.allow_join_via_presence_friends_only,
            config.allow_join_via_presence_friends_only
        );
        assert_eq!(bag.num_public_connections, 12);
        assert_eq!(bag.num_private_connections, 3);
    }

    #[test]
    fn test_build_advertises_server_and_map_names() {
        let config = SessionConfig {
            server_name: "Friday Night Lobby".into(),
            public_map_name: "Canyon".into(),
            ..SessionConfig::default()
        };

        let bag = build_attributes(&config);

        assert_eq!(
            bag.advertised.get(SETTING_SERVER_NAME),
            Some(&AttributeValue::Text("Friday Night Lobby".into()))
        );
        assert_eq!(
            bag.advertised.get(SETTING_MAP_NAME),
            Some(&AttributeValue::Text("Canyon".into()))
        );
    }

    #[test]
    fn test_build_always_prefers_lobbies() {
        // Set regardless of any config field.
        assert!(build_attributes(&SessionConfig::default()).use_lobbies_if_available);

        let dedicated = SessionConfig {
            is_dedicated: true,
            uses_presence: false,
            ..SessionConfig::default()
        };
        assert!(build_attributes(&dedicated).use_lobbies_if_available);
    }

    #[test]
    fn test_build_is_deterministic() {
        let config = SessionConfig::default();
        assert_eq!(build_attributes(&config), build_attributes(&config));
    }
}
