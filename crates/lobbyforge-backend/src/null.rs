//! The Null provider: the always-available, in-process fallback backend.
//!
//! It behaves like a LAN provider whose network happens to be this process:
//! sessions it hosts are the sessions it can discover and join. That makes
//! it useful for three things:
//!
//! 1. The fallback target when a platform provider fails to initialize.
//! 2. Offline development — the full host/find/join flow works end to end
//!    without any service running.
//! 3. Deterministic tests of anything driving the provider traits.
//!
//! Requests complete "asynchronously" in the sense of the call contract:
//! the call returns accepted/rejected immediately and the outcome is pushed
//! onto the completion channel, to be observed when the caller next drains
//! it. Nothing here ever invokes the caller re-entrantly.

use std::collections::HashMap;

use rand::Rng;

use crate::event::{CompletionEvent, CompletionSender};
use crate::provider::{
    BackendProvider, Capabilities, IdentityService, SessionService,
};
use crate::registry::NULL_PROVIDER;
use crate::types::{
    AttributeBag, JoinResult, NamedSession, PlayerId, SearchQuery,
    SearchResult, SessionName, SessionState, LOCAL_USER,
};

/// The address handed out for sessions hosted by this process.
const LOOPBACK_CONNECT: &str = "127.0.0.1:7777";

/// The in-process fallback provider. Both capabilities present.
pub struct NullProvider {
    events: CompletionSender,
    local_player: PlayerId,
    /// Sessions hosted by this process, keyed by name.
    sessions: HashMap<SessionName, NamedSession>,
}

impl NullProvider {
    /// Creates a provider wired to `events`. The local player id is
    /// generated fresh per instance, like a LAN guest identity.
    pub fn new(events: CompletionSender) -> Self {
        let mut rng = rand::rng();
        Self {
            events,
            local_player: PlayerId(rng.random()),
            sessions: HashMap::new(),
        }
    }

    fn advertised_results(&self, max_results: u32) -> Vec<SearchResult> {
        self.sessions
            .values()
            .filter(|s| s.settings.should_advertise)
            .take(max_results as usize)
            .map(|s| SearchResult {
                session_name: s.name.clone(),
                owning_user_name: self.nickname(),
                ping_ms: 0,
                open_public_connections: s.open_public_connections,
                num_public_connections: s.settings.num_public_connections,
                attributes: s.settings.advertised.clone(),
            })
            .collect()
    }

    fn nickname(&self) -> String {
        format!("NullPlayer-{}", self.local_player.0 % 10_000)
    }
}

impl BackendProvider for NullProvider {
    fn name(&self) -> &str {
        NULL_PROVIDER
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            identity: true,
            sessions: true,
        }
    }

    fn identity(&mut self) -> Option<&mut dyn IdentityService> {
        Some(self)
    }

    fn sessions(&mut self) -> Option<&mut dyn SessionService> {
        Some(self)
    }
}

impl IdentityService for NullProvider {
    fn auto_login(&mut self, user: u32) -> bool {
        // The Null identity always succeeds; there is no service to talk to.
        self.events.send(CompletionEvent::LoginComplete {
            user,
            success: true,
            player_id: Some(self.local_player),
            error: None,
        });
        true
    }

    fn unique_player_id(&self, user: u32) -> Option<PlayerId> {
        (user == LOCAL_USER).then_some(self.local_player)
    }

    fn player_nickname(&self, user: u32) -> String {
        if user == LOCAL_USER {
            self.nickname()
        } else {
            "(unknown)".to_string()
        }
    }
}

impl SessionService for NullProvider {
    fn create_session(
        &mut self,
        owner: PlayerId,
        name: &SessionName,
        settings: &AttributeBag,
    ) -> bool {
        if self.sessions.contains_key(name) {
            tracing::warn!(%name, "create rejected, session already exists");
            return false;
        }

        self.sessions.insert(
            name.clone(),
            NamedSession {
                name: name.clone(),
                state: SessionState::Pending,
                owner,
                hosting: true,
                open_public_connections: settings.num_public_connections,
                open_private_connections: settings.num_private_connections,
                registered_players: Vec::new(),
                settings: settings.clone(),
            },
        );
        tracing::debug!(%name, "session created");
        self.events.send(CompletionEvent::CreateSessionComplete {
            session: name.clone(),
            success: true,
        });
        true
    }

    fn start_session(&mut self, name: &SessionName) -> bool {
        let Some(session) = self.sessions.get_mut(name) else {
            return false;
        };
        if !matches!(session.state, SessionState::Pending | SessionState::Ended)
        {
            tracing::warn!(%name, state = %session.state, "start rejected");
            return false;
        }

        session.state = SessionState::Active;
        self.events.send(CompletionEvent::StartSessionComplete {
            session: name.clone(),
            success: true,
        });
        true
    }

    fn end_session(&mut self, name: &SessionName) -> bool {
        let Some(session) = self.sessions.get_mut(name) else {
            return false;
        };
        if session.state != SessionState::Active {
            tracing::warn!(%name, state = %session.state, "end rejected");
            return false;
        }

        session.state = SessionState::Ended;
        self.events.send(CompletionEvent::EndSessionComplete {
            session: name.clone(),
            success: true,
        });
        true
    }

    fn destroy_session(&mut self, name: &SessionName) -> bool {
        self.sessions.remove(name).is_some()
    }

    fn find_sessions(&mut self, _user: u32, query: &SearchQuery) -> bool {
        let results = self.advertised_results(query.max_results);
        tracing::debug!(search = %query.id, count = results.len(), "find complete");
        self.events.send(CompletionEvent::FindSessionsComplete {
            search: query.id,
            success: true,
            results,
        });
        true
    }

    fn join_session(
        &mut self,
        _player: PlayerId,
        name: &SessionName,
        chosen: &SearchResult,
    ) -> bool {
        let result = match self.sessions.get(&chosen.session_name) {
            Some(session) if session.open_public_connections == 0 => {
                JoinResult::SessionIsFull
            }
            Some(_) => JoinResult::Success,
            None => JoinResult::SessionDoesNotExist,
        };
        self.events.send(CompletionEvent::JoinSessionComplete {
            session: name.clone(),
            result,
        });
        true
    }

    fn register_players(
        &mut self,
        name: &SessionName,
        players: &[PlayerId],
    ) -> bool {
        let Some(session) = self.sessions.get_mut(name) else {
            return false;
        };
        for player in players {
            if !session.registered_players.contains(player) {
                session.registered_players.push(*player);
                session.open_public_connections =
                    session.open_public_connections.saturating_sub(1);
            }
        }
        true
    }

    fn resolved_connect_string(&self, name: &SessionName) -> Option<String> {
        self.sessions
            .contains_key(name)
            .then(|| LOOPBACK_CONNECT.to_string())
    }

    fn named_session(&self, name: &SessionName) -> Option<&NamedSession> {
        self.sessions.get(name)
    }

    fn session_count(&self) -> usize {
        self.sessions.len()
    }
}
