//! services/operator_app/src/session/manager.rs
//!
//! The session state manager: owns the in-memory `Session`, moves it between
//! Anonymous and Authenticated, and mirrors it into durable storage.

use spio_core::domain::{Credentials, OperatorProfile, Session};
use spio_core::ports::{AuthProvider, KeyValueStore, PortError};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::persistence::{self, LoadOutcome};

/// Greeting name used when nobody is signed in.
const FALLBACK_FIRST_NAME: &str = "Operador";

/// Tracks the single login allowed in flight.
struct LoginTicket {
    generation: u64,
    cancel: CancellationToken,
}

/// Owns the session for the lifetime of the process.
///
/// Create one at startup, call [`SessionManager::restore`], and share it by
/// `Arc` with anything that needs to read the session or end it.
pub struct SessionManager {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn KeyValueStore>,
    state: watch::Sender<Session>,
    pending_login: Mutex<LoginTicket>,
    // Serializes commits to `state` and the store so they never interleave.
    transition: tokio::sync::Mutex<()>,
}

impl SessionManager {
    pub fn new(auth: Arc<dyn AuthProvider>, store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            auth,
            store,
            state: watch::Sender::new(Session::anonymous()),
            pending_login: Mutex::new(LoginTicket {
                generation: 0,
                cancel: CancellationToken::new(),
            }),
            transition: tokio::sync::Mutex::new(()),
        }
    }

    //=====================================================================================
    // Transitions
    //=====================================================================================

    /// Rebuilds the session from durable storage at startup.
    ///
    /// Never fails. An unreadable store leaves the session anonymous. A corrupt
    /// record, or a store whose contents no longer parse, is wiped and the
    /// session stays anonymous.
    pub async fn restore(&self) -> Session {
        let _transition = self.transition.lock().await;

        if self.is_authenticated() {
            debug!("Session already active, skipping restore");
            return self.session();
        }

        match persistence::load_record(self.store.as_ref()).await {
            Ok(LoadOutcome::Restored(record)) => {
                let session = Session::from_record(record);
                if let Some(operator) = session.current_operator() {
                    info!(employee_number = %operator.employee_number, "Session restored");
                }
                self.state.send_replace(session.clone());
                session
            }
            Ok(LoadOutcome::Empty) => {
                debug!("No stored session");
                self.session()
            }
            Ok(LoadOutcome::Corrupt(reason)) => {
                warn!(%reason, "Discarding corrupt stored session");
                if let Err(e) = persistence::clear_record(self.store.as_ref()).await {
                    warn!("Failed to delete corrupt stored session: {}", e);
                }
                self.session()
            }
            Err(PortError::Corrupt(reason)) => {
                warn!(%reason, "Session storage is corrupt, resetting it");
                if let Err(e) = self.store.reset().await {
                    warn!("Failed to reset corrupt session storage: {}", e);
                }
                self.session()
            }
            Err(e) => {
                warn!("Session storage unavailable, starting anonymous: {}", e);
                self.session()
            }
        }
    }

    /// Signs in through the authentication provider.
    ///
    /// Rejected while a session is active. A newer `login` or a `logout`
    /// supersedes this one; a superseded login never touches the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, AuthError> {
        if self.is_authenticated() {
            return Err(AuthError::AlreadyAuthenticated);
        }

        let (generation, cancel) = self.begin_login();
        let credentials = Credentials::new(username, password);

        let outcome = tokio::select! {
            _ = cancel.cancelled() => {
                debug!(generation, "Login cancelled while in flight");
                return Err(AuthError::Superseded);
            }
            outcome = self.auth.authenticate(&credentials) => outcome,
        };

        let grant = outcome.map_err(|e| {
            let err = match e {
                PortError::InvalidCredentials => AuthError::InvalidCredentials,
                PortError::Unauthorized => AuthError::Unauthorized,
                other => AuthError::Provider(other.to_string()),
            };
            info!(username = %credentials.username, error = %err, "Login failed");
            err
        })?;

        let _transition = self.transition.lock().await;
        if !self.is_current_login(generation) {
            debug!(generation, "Discarding superseded login result");
            return Err(AuthError::Superseded);
        }
        if self.is_authenticated() {
            return Err(AuthError::AlreadyAuthenticated);
        }

        let session = Session::from_grant(grant);
        self.state.send_replace(session.clone());
        if let Some(operator) = session.current_operator() {
            info!(employee_number = %operator.employee_number, "Login succeeded");
        }

        if let Some(record) = session.to_record() {
            if let Err(e) = persistence::save_record(self.store.as_ref(), &record).await {
                warn!("Session will not survive a restart: {}", e);
            }
        }

        Ok(session)
    }

    /// Ends the session. Always leaves the manager anonymous with nothing stored.
    pub async fn logout(&self) {
        self.supersede_pending_login();
        let _transition = self.transition.lock().await;

        let previous = self.state.send_replace(Session::anonymous());

        if let Some(token) = previous.access_token() {
            if let Err(e) = self.auth.revoke(token).await {
                warn!("Token revocation failed: {}", e);
            }
        }
        if let Err(e) = persistence::clear_record(self.store.as_ref()).await {
            warn!("Failed to delete stored session: {}", e);
        }

        if previous.is_authenticated() {
            info!("Logged out");
        }
    }

    /// Called by an HTTP collaborator that received a 401 for `rejected_token`.
    ///
    /// Ends the session only if it still holds that token. A late 401 for a
    /// token that was already replaced by a newer login is ignored.
    pub async fn handle_unauthorized(&self, rejected_token: &str) {
        if self.current_token().as_deref() != Some(rejected_token) {
            debug!("Ignoring unauthorized response for a token no longer in use");
            return;
        }
        warn!("Unauthorized response received, ending session");
        self.logout().await;
    }

    //=====================================================================================
    // Reads
    //=====================================================================================

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    /// The access token to attach to outgoing requests.
    pub fn current_token(&self) -> Option<String> {
        self.state.borrow().access_token().map(str::to_string)
    }

    /// `Authorization` header value for the current token.
    pub fn bearer_header(&self) -> Option<String> {
        self.state
            .borrow()
            .access_token()
            .map(|token| format!("Bearer {}", token))
    }

    pub fn session(&self) -> Session {
        self.state.borrow().clone()
    }

    pub fn current_operator(&self) -> Option<OperatorProfile> {
        self.state.borrow().current_operator().cloned()
    }

    pub fn operator_first_name(&self) -> String {
        self.state
            .borrow()
            .current_operator()
            .map(|operator| operator.first_name.clone())
            .unwrap_or_else(|| FALLBACK_FIRST_NAME.to_string())
    }

    /// A receiver that observes every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    //=====================================================================================
    // In-flight login bookkeeping
    //=====================================================================================

    fn begin_login(&self) -> (u64, CancellationToken) {
        let mut ticket = self
            .pending_login
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ticket.cancel.cancel();
        ticket.generation += 1;
        ticket.cancel = CancellationToken::new();
        (ticket.generation, ticket.cancel.clone())
    }

    fn supersede_pending_login(&self) {
        let mut ticket = self
            .pending_login
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        ticket.cancel.cancel();
        ticket.generation += 1;
    }

    fn is_current_login(&self, generation: u64) -> bool {
        self.pending_login
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .generation
            == generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::demo_auth::{demo_operator, DemoAuthProvider, DEMO_PASSWORD, DEMO_USERNAME};
    use crate::adapters::storage::{FileStore, MemoryStore};
    use crate::session::persistence::{ACCESS_TOKEN_KEY, OPERATOR_KEY, REFRESH_TOKEN_KEY};
    use async_trait::async_trait;
    use spio_core::domain::{AuthGrant, PersistedRecord};
    use spio_core::ports::PortResult;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Accepts any credentials after `delay`, numbering each grant.
    struct SlowAuth {
        delay: Duration,
        issued: AtomicUsize,
        revoked: AtomicUsize,
    }

    impl SlowAuth {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                issued: AtomicUsize::new(0),
                revoked: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthProvider for SlowAuth {
        async fn authenticate(&self, credentials: &Credentials) -> PortResult<AuthGrant> {
            tokio::time::sleep(self.delay).await;
            let n = self.issued.fetch_add(1, Ordering::SeqCst);
            let mut operator = demo_operator();
            operator.employee_number = credentials.username.clone();
            Ok(AuthGrant {
                access_token: format!("token-{}", n),
                refresh_token: None,
                expires_at: None,
                operator,
            })
        }

        async fn revoke(&self, _access_token: &str) -> PortResult<()> {
            self.revoked.fetch_add(1, Ordering::SeqCst);
            Err(PortError::Unexpected("revocation endpoint down".to_string()))
        }
    }

    /// A store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> PortResult<Option<String>> {
            Err(PortError::StorageUnavailable("disk gone".to_string()))
        }
        async fn set(&self, _key: &str, _value: &str) -> PortResult<()> {
            Err(PortError::StorageUnavailable("disk gone".to_string()))
        }
        async fn remove(&self, _key: &str) -> PortResult<()> {
            Err(PortError::StorageUnavailable("disk gone".to_string()))
        }
        async fn reset(&self) -> PortResult<()> {
            Err(PortError::StorageUnavailable("disk gone".to_string()))
        }
    }

    /// Fails every authentication with the given error.
    struct FailingAuth(PortError);

    #[async_trait]
    impl AuthProvider for FailingAuth {
        async fn authenticate(&self, _credentials: &Credentials) -> PortResult<AuthGrant> {
            Err(self.0.clone())
        }

        async fn revoke(&self, _access_token: &str) -> PortResult<()> {
            Ok(())
        }
    }

    fn demo_manager(store: Arc<dyn KeyValueStore>) -> SessionManager {
        let auth = DemoAuthProvider::new(Duration::ZERO, Duration::ZERO, chrono::Duration::hours(24))
            .unwrap();
        SessionManager::new(Arc::new(auth), store)
    }

    #[tokio::test]
    async fn starts_anonymous() {
        let manager = demo_manager(Arc::new(MemoryStore::new()));
        assert!(!manager.is_authenticated());
        assert_eq!(manager.current_token(), None);
        assert_eq!(manager.bearer_header(), None);
        assert_eq!(manager.operator_first_name(), "Operador");
    }

    #[tokio::test]
    async fn valid_login_authenticates_and_persists() {
        let store = Arc::new(MemoryStore::new());
        let manager = demo_manager(store.clone());

        let session = manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        assert!(session.is_authenticated());
        assert_eq!(session.current_operator().unwrap().employee_number, "TC-2024-0142");
        assert!(manager.is_authenticated());
        assert_eq!(manager.operator_first_name(), "Jorge");

        let token = manager.current_token().unwrap();
        assert_eq!(manager.bearer_header(), Some(format!("Bearer {}", token)));
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), Some(token));
        assert!(store.get(OPERATOR_KEY).await.unwrap().is_some());
        assert!(store.get(REFRESH_TOKEN_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn invalid_login_leaves_session_untouched() {
        let store = Arc::new(MemoryStore::new());
        let manager = demo_manager(store.clone());

        let err = manager.login(DEMO_USERNAME, "wrong").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
        assert_eq!(manager.session(), Session::anonymous());
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn login_while_authenticated_is_rejected() {
        let manager = demo_manager(Arc::new(MemoryStore::new()));
        let first = manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();

        let err = manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap_err();
        assert_eq!(err, AuthError::AlreadyAuthenticated);
        assert_eq!(manager.session(), first);
    }

    #[tokio::test]
    async fn logout_clears_state_and_storage_from_any_state() {
        let store = Arc::new(MemoryStore::new());
        let manager = demo_manager(store.clone());

        manager.logout().await;
        assert!(!manager.is_authenticated());

        manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        manager.logout().await;
        assert_eq!(manager.session(), Session::anonymous());
        for key in [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, OPERATOR_KEY] {
            assert_eq!(store.get(key).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn unauthorized_forces_logout() {
        let manager = demo_manager(Arc::new(MemoryStore::new()));
        manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        let token = manager.current_token().unwrap();

        manager.handle_unauthorized(&token).await;
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn unauthorized_for_a_replaced_token_is_ignored() {
        let auth = Arc::new(SlowAuth::new(Duration::ZERO));
        let manager = SessionManager::new(auth, Arc::new(MemoryStore::new()));
        manager.login("TC-1", "pw").await.unwrap();
        let old_token = manager.current_token().unwrap();
        manager.logout().await;
        let current = manager.login("TC-1", "pw").await.unwrap();

        manager.handle_unauthorized(&old_token).await;
        assert_eq!(manager.session(), current);

        manager.logout().await;
        manager.handle_unauthorized(&old_token).await;
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn provider_failures_map_to_auth_errors() {
        let cases = [
            (PortError::InvalidCredentials, AuthError::InvalidCredentials),
            (PortError::Unauthorized, AuthError::Unauthorized),
            (
                PortError::Unexpected("boom".to_string()),
                AuthError::Provider("An unexpected error occurred: boom".to_string()),
            ),
        ];
        for (failure, expected) in cases {
            let store = Arc::new(MemoryStore::new());
            let manager = SessionManager::new(Arc::new(FailingAuth(failure)), store.clone());

            assert_eq!(manager.login("TC-1", "pw").await.unwrap_err(), expected);
            assert_eq!(manager.session(), Session::anonymous());
            assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        }
    }

    #[tokio::test]
    async fn broken_storage_is_swallowed() {
        let manager = demo_manager(Arc::new(BrokenStore));

        assert!(!manager.restore().await.is_authenticated());
        manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        assert!(manager.is_authenticated());
        manager.logout().await;
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn failed_revocation_still_logs_out() {
        let auth = Arc::new(SlowAuth::new(Duration::ZERO));
        let manager = SessionManager::new(auth.clone(), Arc::new(MemoryStore::new()));
        manager.login("TC-1", "pw").await.unwrap();

        manager.logout().await;
        assert_eq!(auth.revoked.load(Ordering::SeqCst), 1);
        assert!(!manager.is_authenticated());
    }

    #[tokio::test]
    async fn restore_with_corrupt_record_deletes_it() {
        let store = Arc::new(MemoryStore::new());
        store.set(ACCESS_TOKEN_KEY, "token").await.unwrap();
        store.set(OPERATOR_KEY, "not json").await.unwrap();

        let manager = demo_manager(store.clone());
        assert!(!manager.restore().await.is_authenticated());
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(store.get(OPERATOR_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn restore_while_authenticated_keeps_the_current_session() {
        let store = Arc::new(MemoryStore::new());
        let manager = demo_manager(store.clone());
        let current = manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        store.set(ACCESS_TOKEN_KEY, "someone-else").await.unwrap();

        assert_eq!(manager.restore().await, current);
        assert_eq!(manager.session(), current);
    }

    #[tokio::test(start_paused = true)]
    async fn restore_during_pending_login_wins() {
        let store = Arc::new(MemoryStore::new());
        let stored = PersistedRecord {
            access_token: "stored-token".to_string(),
            refresh_token: None,
            operator: demo_operator(),
        };
        persistence::save_record(store.as_ref(), &stored).await.unwrap();

        let auth = Arc::new(SlowAuth::new(Duration::from_millis(800)));
        let manager = Arc::new(SessionManager::new(auth, store.clone()));
        let pending = tokio::spawn({
            let manager = manager.clone();
            async move { manager.login("TC-1", "pw").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(manager.restore().await.is_authenticated());

        assert_eq!(
            pending.await.unwrap().unwrap_err(),
            AuthError::AlreadyAuthenticated
        );
        assert_eq!(manager.current_token().as_deref(), Some("stored-token"));
        assert_eq!(
            store.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
            Some("stored-token")
        );
    }

    #[tokio::test]
    async fn restore_resets_a_store_that_no_longer_parses() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, "{\"spio_access_token\": \"abc\", ").unwrap();
        let manager = demo_manager(Arc::new(FileStore::new(&path)));

        assert!(!manager.restore().await.is_authenticated());
        assert!(!path.exists());
        manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();

        let restarted = demo_manager(Arc::new(FileStore::new(&path)));
        assert!(restarted.restore().await.is_authenticated());
    }

    #[tokio::test]
    async fn restore_reproduces_a_previous_login() {
        let store = Arc::new(MemoryStore::new());
        let first = demo_manager(store.clone());
        let original = first.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();

        let second = demo_manager(store);
        let restored = second.restore().await;
        assert!(restored.is_authenticated());
        assert_eq!(restored.access_token(), original.access_token());
        assert_eq!(
            restored.current_operator().unwrap().id,
            original.current_operator().unwrap().id
        );
    }

    #[tokio::test(start_paused = true)]
    async fn newer_login_supersedes_pending_one() {
        let auth = Arc::new(SlowAuth::new(Duration::from_millis(800)));
        let manager = Arc::new(SessionManager::new(auth, Arc::new(MemoryStore::new())));

        let first = tokio::spawn({
            let manager = manager.clone();
            async move { manager.login("TC-first", "pw").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        let second = manager.login("TC-second", "pw").await.unwrap();

        assert_eq!(first.await.unwrap().unwrap_err(), AuthError::Superseded);
        assert_eq!(second.current_operator().unwrap().employee_number, "TC-second");
        assert_eq!(
            manager.current_operator().unwrap().employee_number,
            "TC-second"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn logout_cancels_pending_login() {
        let auth = Arc::new(SlowAuth::new(Duration::from_millis(800)));
        let store = Arc::new(MemoryStore::new());
        let manager = Arc::new(SessionManager::new(auth, store.clone()));

        let pending = tokio::spawn({
            let manager = manager.clone();
            async move { manager.login("TC-1", "pw").await }
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        manager.logout().await;

        assert_eq!(pending.await.unwrap().unwrap_err(), AuthError::Superseded);
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(!manager.is_authenticated());
        assert_eq!(store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn subscribers_see_transitions() {
        let manager = demo_manager(Arc::new(MemoryStore::new()));
        let mut rx = manager.subscribe();

        manager.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_authenticated());

        manager.logout().await;
        rx.changed().await.unwrap();
        assert!(!rx.borrow_and_update().is_authenticated());
    }
}
