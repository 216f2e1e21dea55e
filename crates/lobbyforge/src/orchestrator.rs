//! The session orchestrator: the state machine behind Host/Find/Join.
//!
//! This is the central piece of the crate. It is responsible for:
//! - Switching between backend providers, with fallback to `"Null"`
//! - Driving the hosting chain (create → start → travel) and the joining
//!   chain (find → join → connect)
//! - Keeping exactly-once semantics on every asynchronous completion
//! - Leaving the system in a well-defined state after partial failure
//!
//! # Completion bookkeeping
//!
//! Every in-flight backend call is represented by an [`OperationToken`]
//! stored in a per-kind slot. A token is created immediately before the
//! backend call and cleared exactly once — either when its completion is
//! processed or when the backend is torn down. A completion is applied only
//! if all of these hold:
//!
//! 1. its epoch matches the active backend (late events from a torn-down
//!    provider fail this),
//! 2. a token is present in the matching slot (duplicates fail this),
//! 3. for discovery, the echoed search id matches the token's (completions
//!    of a replaced search fail this).
//!
//! Anything else is logged and dropped. The backend is never trusted to
//! get this right on its own.
//!
//! # Concurrency contract
//!
//! Single control thread. Operations are fire-and-register: they issue a
//! request and return; outcomes arrive on the completion channel and are
//! applied by [`SessionOrchestrator::pump`] (or, deterministically in
//! tests, [`SessionOrchestrator::handle_event`]). The live
//! [`SessionConfig`] is read once, at the moment `host_game` is called;
//! mutating it while a host operation is in flight is a caller error.

use std::fmt;

use lobbyforge_backend::{
    completion_channel, BackendEpoch, BackendError, BackendEvent,
    BackendProvider, BackendRegistry, CompletionEvent, CompletionSender,
    JoinResult, NamedSession, PlayerId, SearchId, SearchQuery, SearchResult,
    SessionName, NULL_PROVIDER, LOCAL_USER,
};
use lobbyforge_identity::{IdentityError, IdentityManager, IdentityState};
use lobbyforge_session::{
    build_attributes, SearchResultCache, SessionConfig, SessionError,
};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

use crate::error::LobbyforgeError;
use crate::travel::Travel;

/// Fallback nickname when no backend or identity is available.
const UNKNOWN_NICKNAME: &str = "(unknown)";

// ---------------------------------------------------------------------------
// Operation tokens
// ---------------------------------------------------------------------------

/// The kinds of asynchronous backend operations the orchestrator drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Login,
    Create,
    Start,
    End,
    Find,
    Join,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Login => "login",
            Self::Create => "create",
            Self::Start => "start",
            Self::End => "end",
            Self::Find => "find",
            Self::Join => "join",
        };
        write!(f, "{s}")
    }
}

/// One in-flight backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct OperationToken {
    kind: OperationKind,
    epoch: BackendEpoch,
    /// For Find tokens: which search this token belongs to.
    search: Option<SearchId>,
}

/// One slot per operation kind; at most one outstanding call of each kind.
#[derive(Debug, Default)]
struct PendingOps {
    login: Option<OperationToken>,
    create: Option<OperationToken>,
    start: Option<OperationToken>,
    end: Option<OperationToken>,
    find: Option<OperationToken>,
    join: Option<OperationToken>,
}

impl PendingOps {
    fn slot_mut(&mut self, kind: OperationKind) -> &mut Option<OperationToken> {
        match kind {
            OperationKind::Login => &mut self.login,
            OperationKind::Create => &mut self.create,
            OperationKind::Start => &mut self.start,
            OperationKind::End => &mut self.end,
            OperationKind::Find => &mut self.find,
            OperationKind::Join => &mut self.join,
        }
    }

    fn register(&mut self, kind: OperationKind, epoch: BackendEpoch) {
        *self.slot_mut(kind) = Some(OperationToken {
            kind,
            epoch,
            search: None,
        });
    }

    /// Takes the token for `kind`, if one is registered. The caller has
    /// already verified the epoch at event level.
    fn take(&mut self, kind: OperationKind) -> Option<OperationToken> {
        let token = self.slot_mut(kind).take();
        debug_assert!(token.is_none_or(|t| t.kind == kind));
        token
    }

    fn is_pending(&mut self, kind: OperationKind) -> bool {
        self.slot_mut(kind).is_some()
    }

    /// Invalidates every token. Part of backend teardown; after this no
    /// completion can match.
    fn clear_all(&mut self) {
        *self = Self::default();
    }

    /// The first in-flight kind among `kinds`, if any.
    fn first_pending(
        &mut self,
        kinds: &[OperationKind],
    ) -> Option<OperationKind> {
        kinds.iter().copied().find(|k| self.is_pending(*k))
    }
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// The currently resolved backend plus its generation stamp.
struct ActiveBackend {
    provider: Box<dyn BackendProvider>,
    epoch: BackendEpoch,
    name: String,
}

/// Parameters for a discovery pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FindParams {
    /// Only query the local network.
    pub lan_only: bool,
    /// Query through the provider's presence channel. You almost certainly
    /// want this on.
    pub via_presence: bool,
    /// Cap on returned results.
    pub max_results: u32,
    /// Provider-side search deadline, in seconds.
    pub timeout_secs: u32,
}

impl Default for FindParams {
    fn default() -> Self {
        Self {
            lan_only: false,
            via_presence: true,
            max_results: 10,
            timeout_secs: 10,
        }
    }
}

/// Drives the Host/Find/Join workflows against the active backend.
///
/// Constructed from a [`BackendRegistry`] (so tests can register scripted
/// providers) and a [`Travel`] collaborator. No backend is active until the
/// first [`try_change_backend`](Self::try_change_backend) call.
pub struct SessionOrchestrator<T: Travel> {
    registry: BackendRegistry,
    travel: T,
    events_tx: UnboundedSender<BackendEvent>,
    events_rx: UnboundedReceiver<BackendEvent>,
    backend: Option<ActiveBackend>,
    identity: IdentityManager,
    config: SessionConfig,
    cache: SearchResultCache,
    pending: PendingOps,
    /// Source for backend generation stamps; bumped on every resolve.
    next_epoch: u64,
    /// Source for search ids; bumped on every discovery pass.
    next_search: u64,
    /// Whether any discovery pass has been issued against this backend.
    search_issued: bool,
    hosting: bool,
    ending_hosting: bool,
    joined: bool,
    last_error: Option<LobbyforgeError>,
}

impl<T: Travel> SessionOrchestrator<T> {
    /// Creates an orchestrator with no active backend.
    pub fn new(registry: BackendRegistry, travel: T) -> Self {
        let (events_tx, events_rx) = completion_channel();
        Self {
            registry,
            travel,
            events_tx,
            events_rx,
            backend: None,
            identity: IdentityManager::new(),
            config: SessionConfig::default(),
            cache: SearchResultCache::new(),
            pending: PendingOps::default(),
            next_epoch: 0,
            next_search: 0,
            search_issued: false,
            hosting: false,
            ending_hosting: false,
            joined: false,
            last_error: None,
        }
    }

    // -- Backend switching --------------------------------------------------

    /// Switches the active backend to `name`, tearing down all current
    /// state first. On resolve failure, falls back to the `"Null"` provider
    /// (best-effort; its own failure is only logged) and returns `false`.
    ///
    /// After this returns, at most one backend is active and no completion
    /// from a previous backend can ever be applied again.
    pub fn try_change_backend(&mut self, name: &str) -> bool {
        self.reset_state();

        if self.initialize_backend(name) {
            tracing::info!(backend = name, "backend initialized");
            true
        } else {
            tracing::error!(
                backend = name,
                fallback = NULL_PROVIDER,
                "backend failed to initialize, falling back"
            );
            self.initialize_backend(NULL_PROVIDER);
            false
        }
    }

    /// Tears down every piece of per-backend state: all operation tokens,
    /// the identity state, the search cache, the session flags, the live
    /// config (back to defaults), and the backend itself. The old backend's
    /// session, if any, is destroyed best-effort on the way out.
    fn reset_state(&mut self) {
        self.pending.clear_all();

        if let Some(active) = self.backend.as_mut() {
            if let Some(sessions) = active.provider.sessions() {
                sessions.destroy_session(&SessionName::game());
            }
        }
        self.backend = None;

        self.identity.reset();
        self.cache.clear();
        self.config = SessionConfig::default();
        self.search_issued = false;
        self.hosting = false;
        self.ending_hosting = false;
        self.joined = false;
    }

    /// Resolves and activates `name`, requesting an auto-login for any
    /// provider other than `"Null"` (the Null identity has nothing to log
    /// into). Returns whether the provider resolved.
    fn initialize_backend(&mut self, name: &str) -> bool {
        self.next_epoch += 1;
        let sender = CompletionSender::new(
            self.events_tx.clone(),
            BackendEpoch(self.next_epoch),
        );
        let epoch = sender.epoch();

        let provider = match self.registry.resolve(name, sender) {
            Ok(provider) => provider,
            Err(err) => {
                tracing::error!(backend = name, error = %err, "resolve failed");
                self.last_error = Some(err.into());
                return false;
            }
        };

        let capabilities = provider.capabilities();
        tracing::debug!(
            provider = provider.name(),
            %epoch,
            identity = capabilities.identity,
            sessions = capabilities.sessions,
            "provider resolved"
        );

        let mut active = ActiveBackend {
            // The provider's canonical name, not the requested casing.
            name: provider.name().to_string(),
            provider,
            epoch,
        };

        if !name.eq_ignore_ascii_case(NULL_PROVIDER) {
            self.pending.register(OperationKind::Login, epoch);
            if !self.identity.login(active.provider.as_mut(), LOCAL_USER) {
                // No identity capability or rejected attempt: the backend
                // stays usable for anything not requiring a player id.
                self.pending.take(OperationKind::Login);
            }
        }

        self.backend = Some(active);
        true
    }

    // -- Hosting ------------------------------------------------------------

    /// Builds session settings from the live config and requests session
    /// creation under the conventional game-session name. On success the
    /// create completion auto-chains into a start request.
    ///
    /// Fails fast — no backend call, hosting flag untouched — when there is
    /// no usable backend, the provider lacks identity, the local player id
    /// can't be resolved, or a Create/Find/Join operation is already in
    /// flight.
    pub fn host_game(&mut self) -> Result<(), LobbyforgeError> {
        if let Some(kind) = self.pending.first_pending(&[
            OperationKind::Create,
            OperationKind::Join,
            OperationKind::Find,
        ]) {
            return self.fail(LobbyforgeError::OperationPending(kind));
        }

        let Some(active) = self.backend.as_mut() else {
            return self.fail(
                BackendError::ProviderUnavailable("<none>".into()).into(),
            );
        };
        let epoch = active.epoch;

        if active.provider.sessions().is_none() {
            let name = active.name.clone();
            return self
                .fail(BackendError::ProviderUnavailable(name).into());
        }
        let Some(identity) = active.provider.identity() else {
            return self.fail(IdentityError::IdentityUnavailable.into());
        };
        let Some(player) = identity.unique_player_id(LOCAL_USER) else {
            return self.fail(IdentityError::PlayerIdInvalid.into());
        };

        let settings = build_attributes(&self.config);
        let session = SessionName::game();

        self.pending.register(OperationKind::Create, epoch);
        let accepted = match active.provider.sessions() {
            Some(sessions) => {
                sessions.create_session(player, &session, &settings)
            }
            None => false,
        };

        self.hosting = accepted;
        if accepted {
            tracing::info!(%session, "hosting requested");
            Ok(())
        } else {
            self.pending.take(OperationKind::Create);
            self.fail(LobbyforgeError::SessionCreateFailed)
        }
    }

    /// Requests that the hosted session end. If the backend rejects the
    /// end synchronously, falls back to destroying the session outright.
    pub fn cancel_hosting_game(&mut self) {
        tracing::info!("cancel hosting requested");
        let Some(active) = self.backend.as_mut() else {
            return;
        };
        let epoch = active.epoch;
        let Some(sessions) = active.provider.sessions() else {
            return;
        };

        let session = SessionName::game();
        if sessions.end_session(&session) {
            self.pending.register(OperationKind::End, epoch);
            self.ending_hosting = true;
        } else {
            sessions.destroy_session(&session);
            self.hosting = false;
        }
    }

    // -- Discovery and joining ----------------------------------------------

    /// Starts a discovery pass with a fresh search id, replacing any search
    /// still in flight (whose completion then no longer matches and is
    /// dropped).
    pub fn find_sessions(
        &mut self,
        params: FindParams,
    ) -> Result<(), LobbyforgeError> {
        let Some(active) = self.backend.as_mut() else {
            return self.fail(
                BackendError::ProviderUnavailable("<none>".into()).into(),
            );
        };
        let epoch = active.epoch;
        let Some(sessions) = active.provider.sessions() else {
            let name = active.name.clone();
            return self
                .fail(BackendError::ProviderUnavailable(name).into());
        };

        self.next_search += 1;
        let query = SearchQuery {
            id: SearchId(self.next_search),
            lan_only: params.lan_only,
            via_presence: params.via_presence,
            max_results: params.max_results,
            timeout_secs: params.timeout_secs,
        };

        *self.pending.slot_mut(OperationKind::Find) = Some(OperationToken {
            kind: OperationKind::Find,
            epoch,
            search: Some(query.id),
        });
        self.search_issued = true;

        tracing::info!(search = %query.id, lan = query.lan_only, "finding sessions");
        if sessions.find_sessions(LOCAL_USER, &query) {
            Ok(())
        } else {
            self.pending.take(OperationKind::Find);
            self.fail(LobbyforgeError::FindSessionsFailed)
        }
    }

    /// Requests a join of the cached discovery result at `index`.
    ///
    /// Fails fast — no backend call — when no search was ever issued, the
    /// index is outside the cached snapshot, the player id is unavailable,
    /// or a join is already in flight.
    pub fn join_session(
        &mut self,
        index: usize,
    ) -> Result<(), LobbyforgeError> {
        tracing::info!(index, "join session requested");

        if !self.search_issued {
            return self.fail(SessionError::NoSearchPerformed.into());
        }
        let len = self.cache.len();
        let Some(chosen) = self.cache.get(index).cloned() else {
            return self
                .fail(SessionError::JoinIndexOutOfRange { index, len }.into());
        };
        if self.pending.is_pending(OperationKind::Join) {
            return self
                .fail(LobbyforgeError::OperationPending(OperationKind::Join));
        }

        let Some(active) = self.backend.as_mut() else {
            return self.fail(
                BackendError::ProviderUnavailable("<none>".into()).into(),
            );
        };
        let epoch = active.epoch;
        let player = active
            .provider
            .identity()
            .and_then(|identity| identity.unique_player_id(LOCAL_USER));
        let Some(player) = player else {
            return self.fail(IdentityError::PlayerIdInvalid.into());
        };
        let Some(sessions) = active.provider.sessions() else {
            let name = active.name.clone();
            return self
                .fail(BackendError::ProviderUnavailable(name).into());
        };

        let session = SessionName::game();
        self.pending.register(OperationKind::Join, epoch);
        if sessions.join_session(player, &session, &chosen) {
            tracing::info!(%session, "join requested");
            Ok(())
        } else {
            self.pending.take(OperationKind::Join);
            self.fail(LobbyforgeError::JoinFailed(JoinResult::UnknownError))
        }
    }

    // -- Completion dispatch ------------------------------------------------

    /// Drains and applies all queued completion events. Non-blocking; call
    /// from the control thread whenever outcomes should be observed.
    pub fn pump(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Applies a single completion event. This is the deterministic
    /// delivery entry point — tests call it directly.
    ///
    /// Events whose epoch doesn't match the active backend are dropped
    /// here, before any per-operation handling: a torn-down backend cannot
    /// mutate orchestrator state, no matter what it still has queued.
    pub fn handle_event(&mut self, event: BackendEvent) {
        let Some(active_epoch) = self.backend.as_ref().map(|b| b.epoch)
        else {
            tracing::debug!(
                kind = event.event.kind_name(),
                "completion dropped, no active backend"
            );
            return;
        };
        if event.epoch != active_epoch {
            tracing::debug!(
                kind = event.event.kind_name(),
                epoch = %event.epoch,
                active = %active_epoch,
                "stale completion dropped"
            );
            return;
        }

        match event.event {
            CompletionEvent::LoginComplete {
                user,
                success,
                player_id,
                error,
            } => self.on_login_complete(user, success, player_id, error),
            CompletionEvent::CreateSessionComplete { session, success } => {
                self.on_create_session_complete(session, success)
            }
            CompletionEvent::StartSessionComplete { session, success } => {
                self.on_start_session_complete(session, success)
            }
            CompletionEvent::EndSessionComplete { session, success } => {
                self.on_end_session_complete(session, success)
            }
            CompletionEvent::FindSessionsComplete {
                search,
                success,
                results,
            } => self.on_find_sessions_complete(search, success, results),
            CompletionEvent::JoinSessionComplete { session, result } => {
                self.on_join_session_complete(session, result)
            }
        }
    }

    fn on_login_complete(
        &mut self,
        user: u32,
        success: bool,
        player_id: Option<PlayerId>,
        error: Option<String>,
    ) {
        if self.pending.slot_mut(OperationKind::Login).is_none() {
            tracing::debug!("login completion without pending token, ignored");
            return;
        }
        // The token is consumed only on success, mirroring the identity
        // manager's callback registration staying latched on failure.
        if success {
            self.pending.take(OperationKind::Login);
        }
        self.identity
            .on_login_complete(user, success, player_id, error.as_deref());
    }

    fn on_create_session_complete(
        &mut self,
        session: SessionName,
        success: bool,
    ) {
        let Some(token) = self.pending.take(OperationKind::Create) else {
            tracing::debug!(%session, "create completion without token, ignored");
            return;
        };
        tracing::info!(%session, success, "create session complete");

        if !success {
            self.hosting = false;
            self.report(LobbyforgeError::SessionCreateFailed);
            return;
        }

        // Auto-chain: a created session is not usable until started.
        tracing::info!(%session, "automatically starting session");
        let Some(active) = self.backend.as_mut() else {
            return;
        };
        let Some(sessions) = active.provider.sessions() else {
            return;
        };
        self.pending.register(OperationKind::Start, token.epoch);
        if !sessions.start_session(&session) {
            self.pending.take(OperationKind::Start);
            self.report(LobbyforgeError::SessionStartFailed);
        }
    }

    fn on_start_session_complete(
        &mut self,
        session: SessionName,
        success: bool,
    ) {
        if self.pending.take(OperationKind::Start).is_none() {
            tracing::debug!(%session, "start completion without token, ignored");
            return;
        }
        tracing::info!(%session, success, "start session complete");

        if success {
            let arguments = self.config.travel_arguments();
            tracing::info!(
                map = %self.config.target_map,
                %arguments,
                "travelling to target map"
            );
            self.travel.open_level(
                &self.config.target_map,
                &arguments,
                self.config.travel_absolute,
            );
        } else {
            // The session stays in whatever state the backend left it; no
            // automatic teardown.
            self.report(LobbyforgeError::SessionStartFailed);
        }
    }

    fn on_end_session_complete(&mut self, session: SessionName, success: bool) {
        if self.pending.take(OperationKind::End).is_none() {
            tracing::debug!(%session, "end completion without token, ignored");
            return;
        }
        tracing::info!(%session, success, "end session complete");
        self.ending_hosting = false;
        self.hosting = false;
    }

    fn on_find_sessions_complete(
        &mut self,
        search: SearchId,
        success: bool,
        results: Vec<SearchResult>,
    ) {
        let matches_current = self
            .pending
            .slot_mut(OperationKind::Find)
            .is_some_and(|token| token.search == Some(search));
        if !matches_current {
            tracing::debug!(%search, "completion for replaced search, ignored");
            return;
        }
        self.pending.take(OperationKind::Find);

        if success {
            tracing::info!(%search, count = results.len(), "find sessions complete");
            self.cache.replace(results);
        } else {
            // Previous snapshot stays put.
            tracing::error!(%search, "find sessions failed");
            self.report(LobbyforgeError::FindSessionsFailed);
        }
    }

    fn on_join_session_complete(
        &mut self,
        session: SessionName,
        result: JoinResult,
    ) {
        if self.pending.take(OperationKind::Join).is_none() {
            tracing::debug!(%session, "join completion without token, ignored");
            return;
        }
        tracing::info!(%session, %result, "join session complete");

        if result != JoinResult::Success {
            self.joined = false;
            self.report(LobbyforgeError::JoinFailed(result));
            return;
        }

        self.joined = true;
        let connect = self
            .backend
            .as_mut()
            .and_then(|active| active.provider.sessions())
            .and_then(|sessions| sessions.resolved_connect_string(&session));
        match connect {
            Some(address) => {
                tracing::info!(%address, "travelling client");
                self.travel.connect(&address, true);
            }
            None => {
                self.report(LobbyforgeError::ConnectStringUnavailable);
            }
        }
    }

    // -- Introspection (debug UI surface) -------------------------------------

    /// The active backend's name, if one is resolved.
    pub fn backend_name(&self) -> Option<&str> {
        self.backend.as_ref().map(|active| active.name.as_str())
    }

    pub fn is_hosting(&self) -> bool {
        self.hosting
    }

    pub fn is_ending_hosting(&self) -> bool {
        self.ending_hosting
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    /// The live session configuration, read at host time.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Mutable access for the caller/UI. Not to be used while a host
    /// operation is in flight.
    pub fn config_mut(&mut self) -> &mut SessionConfig {
        &mut self.config
    }

    /// The latest discovery snapshot, in backend order.
    pub fn search_results(&self) -> &[SearchResult] {
        self.cache.results()
    }

    /// Current identity state for the local user.
    pub fn identity_state(&self) -> IdentityState {
        self.identity.state()
    }

    /// Display name of the local user, or `"(unknown)"`.
    pub fn player_nickname(&mut self) -> String {
        self.backend
            .as_mut()
            .and_then(|active| active.provider.identity())
            .map(|identity| identity.player_nickname(LOCAL_USER))
            .unwrap_or_else(|| UNKNOWN_NICKNAME.to_string())
    }

    /// Read-only snapshot of the backend's record of the game session.
    pub fn named_session(&mut self) -> Option<NamedSession> {
        self.backend
            .as_mut()
            .and_then(|active| active.provider.sessions())
            .and_then(|sessions| {
                sessions.named_session(&SessionName::game()).cloned()
            })
    }

    /// How many sessions the active backend tracks locally.
    pub fn session_count(&mut self) -> usize {
        self.backend
            .as_mut()
            .and_then(|active| active.provider.sessions())
            .map(|sessions| sessions.session_count())
            .unwrap_or(0)
    }

    /// Registers the local player into the game session's record.
    pub fn register_local_player(&mut self) -> bool {
        let Some(active) = self.backend.as_mut() else {
            return false;
        };
        let Some(player) = active
            .provider
            .identity()
            .and_then(|identity| identity.unique_player_id(LOCAL_USER))
        else {
            return false;
        };
        active
            .provider
            .sessions()
            .map(|sessions| {
                sessions.register_players(&SessionName::game(), &[player])
            })
            .unwrap_or(false)
    }

    /// The most recently reported failure, if any.
    pub fn last_error(&self) -> Option<&LobbyforgeError> {
        self.last_error.as_ref()
    }

    // -- Failure reporting ----------------------------------------------------

    /// Logs a failure, latches it for polling callers, and returns it.
    fn fail(&mut self, error: LobbyforgeError) -> Result<(), LobbyforgeError> {
        tracing::error!(%error, "operation failed");
        self.last_error = Some(error.clone());
        Err(error)
    }

    /// Same as [`fail`](Self::fail) for completion handlers, which have no
    /// caller to return an error to.
    fn report(&mut self, error: LobbyforgeError) {
        tracing::error!(%error, "operation failed");
        self.last_error = Some(error);
    }
}
