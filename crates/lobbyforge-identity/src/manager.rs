//! The identity manager: tracks local-user login against the active backend.
//!
//! Login is the one identity operation this core drives: request it, wait
//! for the completion, remember the outcome. The state is scoped to the
//! currently resolved backend — switching backends resets it to `LoggedOut`,
//! and nothing else ever leaves the terminal states.

use lobbyforge_backend::{BackendProvider, PlayerId};

use crate::IdentityError;

/// Login state for the local user against the active backend.
///
/// ```text
/// LoggedOut ──(login)──→ LoggingIn ──→ LoggedIn(id)
///     ↑                      └───────→ LoginFailed
///     └──────────(backend switch / reset)──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityState {
    LoggedOut,
    LoggingIn,
    LoggedIn(PlayerId),
    LoginFailed,
}

/// Drives and tracks the asynchronous login flow.
#[derive(Debug)]
pub struct IdentityManager {
    state: IdentityState,
    /// Whether our login-completion callback is currently registered with
    /// the backend. Set when a login attempt starts; cleared on success or
    /// reset. A failed login leaves it set — see `on_login_complete`.
    callback_registered: bool,
}

impl IdentityManager {
    /// Creates a manager in the `LoggedOut` state.
    pub fn new() -> Self {
        Self {
            state: IdentityState::LoggedOut,
            callback_registered: false,
        }
    }

    /// Requests an asynchronous login for `user` against `backend`.
    ///
    /// Returns whether an attempt was started. When the provider lacks an
    /// identity capability no callback is registered and no state changes;
    /// the condition is [`IdentityError::IdentityUnavailable`], logged here
    /// and reported via the `false` return.
    pub fn login(
        &mut self,
        backend: &mut dyn BackendProvider,
        user: u32,
    ) -> bool {
        let Some(identity) = backend.identity() else {
            tracing::error!(
                error = %IdentityError::IdentityUnavailable,
                "cannot log in"
            );
            return false;
        };

        self.callback_registered = true;
        self.state = IdentityState::LoggingIn;
        if identity.auto_login(user) {
            tracing::info!(user, "login requested");
            true
        } else {
            tracing::error!(user, "login request rejected by provider");
            false
        }
    }

    /// Applies a login completion.
    ///
    /// On success the registered callback is cleared — exactly once; a
    /// duplicate completion finds nothing registered and is ignored by the
    /// caller's token bookkeeping. On failure the registration is left in
    /// place and no retry is attempted; an explicit `login` call replaces
    /// it. (Carrying that asymmetry is deliberate; see DESIGN.md.)
    pub fn on_login_complete(
        &mut self,
        user: u32,
        success: bool,
        player_id: Option<PlayerId>,
        error: Option<&str>,
    ) {
        if success {
            match player_id {
                Some(id) => {
                    self.state = IdentityState::LoggedIn(id);
                    self.callback_registered = false;
                    tracing::info!(user, player = %id, "login complete");
                }
                None => {
                    // A success without an id is a provider bug; treat it
                    // as a failed login rather than trusting the backend.
                    self.state = IdentityState::LoginFailed;
                    tracing::error!(user, "login succeeded without a player id");
                }
            }
        } else {
            self.state = IdentityState::LoginFailed;
            tracing::error!(
                user,
                error = error.unwrap_or("unspecified"),
                "login failed"
            );
        }
    }

    /// Current login state.
    pub fn state(&self) -> IdentityState {
        self.state
    }

    /// The logged-in player id, when available.
    pub fn player_id(&self) -> Option<PlayerId> {
        match self.state {
            IdentityState::LoggedIn(id) => Some(id),
            _ => None,
        }
    }

    /// Whether the login-completion callback is registered with the backend.
    pub fn is_callback_registered(&self) -> bool {
        self.callback_registered
    }

    /// Forgets everything: back to `LoggedOut`, callback registration
    /// dropped. Called on backend switch and shutdown.
    pub fn reset(&mut self) {
        self.state = IdentityState::LoggedOut;
        self.callback_registered = false;
    }
}

impl Default for IdentityManager {
    fn default() -> Self {
        Self::new()
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use lobbyforge_backend::{
        completion_channel, BackendEpoch, Capabilities, CompletionSender,
        IdentityService, NullProvider, SessionService, LOCAL_USER,
    };

    use super::*;

    fn null_backend() -> NullProvider {
        let (tx, _rx) = completion_channel();
        NullProvider::new(CompletionSender::new(tx, BackendEpoch(1)))
    }

    /// A discovery-only provider: no identity service to log into.
    struct BeaconBackend;

    impl lobbyforge_backend::BackendProvider for BeaconBackend {
        fn name(&self) -> &str {
            "Beacon"
        }

        fn capabilities(&self) -> Capabilities {
            Capabilities {
                identity: false,
                sessions: false,
            }
        }

        fn identity(&mut self) -> Option<&mut dyn IdentityService> {
            None
        }

        fn sessions(&mut self) -> Option<&mut dyn SessionService> {
            None
        }
    }

    #[test]
    fn test_new_manager_is_logged_out() {
        let mgr = IdentityManager::new();
        assert_eq!(mgr.state(), IdentityState::LoggedOut);
        assert!(!mgr.is_callback_registered());
        assert!(mgr.player_id().is_none());
    }

    #[test]
    fn test_login_transitions_to_logging_in_and_registers_callback() {
        let mut mgr = IdentityManager::new();
        let mut backend = null_backend();

        assert!(mgr.login(&mut backend, LOCAL_USER));

        assert_eq!(mgr.state(), IdentityState::LoggingIn);
        assert!(mgr.is_callback_registered());
    }

    #[test]
    fn test_login_without_identity_capability_registers_nothing() {
        let mut mgr = IdentityManager::new();
        let mut backend = BeaconBackend;

        assert!(!mgr.login(&mut backend, LOCAL_USER));

        assert_eq!(mgr.state(), IdentityState::LoggedOut);
        assert!(!mgr.is_callback_registered());
    }

    #[test]
    fn test_successful_completion_logs_in_and_clears_callback() {
        let mut mgr = IdentityManager::new();
        let mut backend = null_backend();
        mgr.login(&mut backend, LOCAL_USER);

        mgr.on_login_complete(LOCAL_USER, true, Some(PlayerId(9)), None);

        assert_eq!(mgr.state(), IdentityState::LoggedIn(PlayerId(9)));
        assert_eq!(mgr.player_id(), Some(PlayerId(9)));
        assert!(!mgr.is_callback_registered());
    }

    #[test]
    fn test_failed_completion_leaves_callback_registered() {
        // Observed provider-wrapper behavior, carried deliberately: a
        // failed login parks in LoginFailed with the callback still
        // registered, until an explicit re-login or a backend switch.
        let mut mgr = IdentityManager::new();
        let mut backend = null_backend();
        mgr.login(&mut backend, LOCAL_USER);

        mgr.on_login_complete(LOCAL_USER, false, None, Some("no ticket"));

        assert_eq!(mgr.state(), IdentityState::LoginFailed);
        assert!(mgr.is_callback_registered());
        assert!(mgr.player_id().is_none());
    }

    #[test]
    fn test_success_without_player_id_is_treated_as_failure() {
        let mut mgr = IdentityManager::new();
        let mut backend = null_backend();
        mgr.login(&mut backend, LOCAL_USER);

        mgr.on_login_complete(LOCAL_USER, true, None, None);

        assert_eq!(mgr.state(), IdentityState::LoginFailed);
    }

    #[test]
    fn test_reset_returns_to_logged_out() {
        let mut mgr = IdentityManager::new();
        let mut backend = null_backend();
        mgr.login(&mut backend, LOCAL_USER);
        mgr.on_login_complete(LOCAL_USER, true, Some(PlayerId(4)), None);

        mgr.reset();

        assert_eq!(mgr.state(), IdentityState::LoggedOut);
        assert!(!mgr.is_callback_registered());
    }

    #[test]
    fn test_relogin_after_failure_replaces_registration() {
        let mut mgr = IdentityManager::new();
        let mut backend = null_backend();
        mgr.login(&mut backend, LOCAL_USER);
        mgr.on_login_complete(LOCAL_USER, false, None, None);

        assert!(mgr.login(&mut backend, LOCAL_USER));

        assert_eq!(mgr.state(), IdentityState::LoggingIn);
        assert!(mgr.is_callback_registered());
    }
}
