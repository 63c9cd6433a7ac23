//! Session lifecycle: restore, verify, sign in, sign out

use super::store::SessionStore;
use super::types::{AuthState, User};
use crate::auth::{AuthClient, OneTimeCode, PhoneNumber};
use crate::error::{ErrorClass, MotofixError, MotofixResult};
use crate::events::{Event, EventBus};
use crate::recovery::{RetryPolicy, RetryResult};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Told to the user when the server could not confirm the cached session
const CACHED_SESSION_NOTICE: &str =
    "Could not reach Motofix to confirm your session; showing saved details";

/// Result of a verification pass
#[derive(Debug, Clone)]
pub enum VerifyOutcome {
    /// No token stored; nothing to verify
    NoSession,
    /// The server confirmed the session; the cached user was refreshed
    Verified(User),
    /// The server rejected the token; the session has been cleared
    Expired,
    /// The server could not confirm the session; the cached state was kept
    Unverified { error: MotofixError },
    /// Another verification is running; no request was made
    AlreadyInFlight,
    /// The caller cancelled; state unchanged
    Cancelled,
}

impl VerifyOutcome {
    pub fn is_verified(&self) -> bool {
        matches!(self, Self::Verified(_))
    }
}

/// Releases the single-flight flag when dropped
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Drives the session lifecycle against the auth service
pub struct SessionManager {
    store: Arc<SessionStore>,
    auth: AuthClient,
    events: EventBus,
    retry: RetryPolicy,
    country_code: String,
    verifying: AtomicBool,
}

impl SessionManager {
    pub fn new(
        store: Arc<SessionStore>,
        auth: AuthClient,
        events: EventBus,
        retry: RetryPolicy,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            store,
            auth,
            events,
            retry,
            country_code: country_code.into(),
            verifying: AtomicBool::new(false),
        }
    }

    /// Load the cached session for instant display, without network
    pub fn restore(&self) -> MotofixResult<AuthState> {
        let state = self.store.restore()?;
        tracing::debug!(
            authenticated = state.is_authenticated(),
            "session restored from storage"
        );
        Ok(state)
    }

    /// Confirm the stored session with the auth service
    pub async fn verify(&self) -> VerifyOutcome {
        self.verify_inner(None).await
    }

    /// Like [`verify`](Self::verify), abandoning the call when `cancel` fires
    pub async fn verify_with_cancel(&self, cancel: &CancellationToken) -> VerifyOutcome {
        self.verify_inner(Some(cancel)).await
    }

    async fn verify_inner(&self, cancel: Option<&CancellationToken>) -> VerifyOutcome {
        let Some(_guard) = InFlightGuard::acquire(&self.verifying) else {
            tracing::debug!("verification already in flight, skipping");
            return VerifyOutcome::AlreadyInFlight;
        };

        let Some(token) = self.store.token() else {
            if let Err(e) = self.store.clear() {
                tracing::warn!("failed to clear session state: {}", e);
            }
            return VerifyOutcome::NoSession;
        };

        // restored-but-unread state: make sure the cached session is visible
        if !self.store.state().is_authenticated() {
            if let Err(e) = self.store.restore() {
                tracing::warn!("failed to restore cached session: {}", e);
            }
        }

        let result = self
            .retry
            .execute(|| self.auth.current_user(), cancel)
            .await;

        match result {
            RetryResult::Success(user) => match self.store.confirm(&token, user.clone()) {
                Ok(true) => {
                    tracing::debug!(user_id = %user.id, "session verified");
                    self.events.publish(Event::SessionVerified {
                        user_id: user.id.clone(),
                    });
                    VerifyOutcome::Verified(user)
                }
                Ok(false) => {
                    tracing::debug!("session changed during verification, result discarded");
                    VerifyOutcome::Unverified {
                        error: MotofixError::other("session changed during verification"),
                    }
                }
                Err(error) => VerifyOutcome::Unverified { error },
            },
            RetryResult::Failed { error, attempts } => match error.class() {
                ErrorClass::CredentialInvalid => {
                    // the interceptor already cleared and notified; make sure
                    // nothing survives even if it raced with a new sign-in
                    if let Err(e) = self.store.clear_if_current(&token) {
                        tracing::warn!("failed to clear expired session: {}", e);
                    }
                    VerifyOutcome::Expired
                }
                _ => {
                    tracing::warn!(
                        attempts,
                        "could not verify session, keeping cached state: {}",
                        error
                    );
                    self.events.publish(Event::notice(CACHED_SESSION_NOTICE));
                    VerifyOutcome::Unverified { error }
                }
            },
            RetryResult::Cancelled => {
                tracing::debug!("verification cancelled");
                VerifyOutcome::Cancelled
            }
        }
    }

    /// Ask for a one-time code to be sent to `identifier`
    pub async fn request_code(&self, identifier: &str) -> MotofixResult<PhoneNumber> {
        let phone = PhoneNumber::parse(identifier, &self.country_code)?;
        self.auth.request_code(&phone).await?;
        Ok(phone)
    }

    /// Exchange a one-time code for a session and persist it
    ///
    /// Remote errors are returned unchanged.
    pub async fn sign_in(
        &self,
        identifier: &str,
        code: &str,
        display_name: Option<&str>,
    ) -> MotofixResult<User> {
        let phone = PhoneNumber::parse(identifier, &self.country_code)?;
        let code = OneTimeCode::parse(code)?;

        let session = self.auth.exchange_code(&phone, &code, display_name).await?;
        self.store.save(&session)?;

        tracing::info!(user_id = %session.user.id, "signed in");
        self.events.publish(Event::SignedIn {
            user_id: session.user.id.clone(),
        });
        Ok(session.user)
    }

    /// Drop the session locally and invalidate it remotely in the background
    ///
    /// The local clear happens before this returns. The returned handle
    /// resolves once the remote call finished; its outcome is only logged.
    /// Without a tokio runtime the remote call is skipped.
    pub fn sign_out(&self) -> MotofixResult<Option<JoinHandle<()>>> {
        let token = self.store.token();
        let cleared = self.store.clear();
        self.events.publish(Event::SignedOut);
        tracing::info!("signed out");
        cleared?;

        let Some(token) = token else {
            return Ok(None);
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::debug!("no runtime available, skipping remote token invalidation");
            return Ok(None);
        };

        let auth = self.auth.clone();
        Ok(Some(runtime.spawn(async move {
            if let Err(e) = auth.invalidate(&token).await {
                tracing::debug!("remote token invalidation failed: {}", e);
            }
        })))
    }

    /// Current in-memory state
    pub fn state(&self) -> AuthState {
        self.store.state()
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::ApiClient;
    use crate::session::{Role, Session};
    use crate::storage::{MemorySessionStorage, SessionStorage};
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct Fixture {
        manager: SessionManager,
        storage: Arc<MemorySessionStorage>,
        events: EventBus,
    }

    fn fixture(server: &MockServer, retries: u32) -> Fixture {
        let storage = Arc::new(MemorySessionStorage::new());
        let store = Arc::new(SessionStore::new(storage.clone()));
        let events = EventBus::default();
        let api = ApiClient::with_http_client(reqwest::Client::new(), store.clone(), events.clone());
        let auth = AuthClient::new(api, server.uri());
        let manager = SessionManager::new(
            store,
            auth,
            events.clone(),
            RetryPolicy::fixed(retries, Duration::from_millis(10)),
            "256",
        );
        Fixture {
            manager,
            storage,
            events,
        }
    }

    fn cached_session() -> Session {
        Session {
            token: "cached-token".to_string(),
            user: User {
                id: "u-1".to_string(),
                phone: "+256700000000".to_string(),
                display_name: Some("Amina".to_string()),
                role: Role::Driver,
            },
        }
    }

    fn seed(fx: &Fixture) {
        SessionStore::new(fx.storage.clone())
            .save(&cached_session())
            .unwrap();
        fx.manager.restore().unwrap();
    }

    #[tokio::test]
    async fn test_verify_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        assert!(matches!(fx.manager.verify().await, VerifyOutcome::NoSession));
        assert_eq!(fx.manager.state(), AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_verify_success_refreshes_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": {"id": "u-1", "phone": "+256700000000", "name": "Amina N.", "role": "driver"}
            })))
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        seed(&fx);
        assert!(matches!(fx.manager.state(), AuthState::Tentative(_)));

        let outcome = fx.manager.verify().await;
        assert!(outcome.is_verified());
        let state = fx.manager.state();
        assert!(state.is_confirmed());
        assert_eq!(
            state.user().unwrap().display_name.as_deref(),
            Some("Amina N.")
        );

        // the refreshed user is persisted too
        let persisted = fx.manager.store().read_persisted().unwrap().unwrap();
        assert_eq!(persisted.user.display_name.as_deref(), Some("Amina N."));
    }

    #[tokio::test]
    async fn test_verify_401_clears_everything() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        seed(&fx);
        let mut rx = fx.events.subscribe();

        assert!(matches!(fx.manager.verify().await, VerifyOutcome::Expired));
        assert!(fx.storage.is_empty());
        assert!(!fx.manager.state().is_authenticated());
        assert_eq!(rx.recv().await.unwrap(), Event::SessionExpired);
    }

    #[tokio::test]
    async fn test_verify_transient_failure_keeps_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(503))
            .expect(3)
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        seed(&fx);
        let before = fx.manager.state();
        let mut rx = fx.events.subscribe();

        let outcome = fx.manager.verify().await;
        assert!(matches!(outcome, VerifyOutcome::Unverified { ref error } if error.is_transient()));
        assert_eq!(fx.manager.state(), before);
        assert_eq!(fx.storage.len(), 2);
        assert_eq!(rx.recv().await.unwrap(), Event::notice(CACHED_SESSION_NOTICE));
    }

    #[tokio::test]
    async fn test_verify_recovers_after_transient_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "u-1", "phone": "+256700000000"
            })))
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        seed(&fx);
        assert!(fx.manager.verify().await.is_verified());
    }

    #[tokio::test]
    async fn test_concurrent_verify_is_single_flight() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "u-1", "phone": "+256700000000"}))
                    .set_delay(Duration::from_millis(200)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        seed(&fx);

        let (a, b) = tokio::join!(fx.manager.verify(), fx.manager.verify());
        let outcomes = [a, b];
        assert_eq!(outcomes.iter().filter(|o| o.is_verified()).count(), 1);
        assert_eq!(
            outcomes
                .iter()
                .filter(|o| matches!(o, VerifyOutcome::AlreadyInFlight))
                .count(),
            1
        );

        // the guard is released afterwards
        assert!(!fx.manager.verifying.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_cancelled_verify_keeps_state_and_releases_guard() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/auth/me"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"id": "u-1", "phone": "+256700000000"}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        seed(&fx);
        let before = fx.manager.state();

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let outcome = fx.manager.verify_with_cancel(&cancel).await;
        assert!(matches!(outcome, VerifyOutcome::Cancelled));
        assert_eq!(fx.manager.state(), before);
        assert!(!fx.manager.verifying.load(Ordering::Acquire));
    }

    #[tokio::test]
    async fn test_sign_in_persists_session() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/verify-otp"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "token": "fresh-token",
                "user": {"id": "u-2", "phone": "+256700000000", "role": "driver"}
            })))
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        let mut rx = fx.events.subscribe();

        let user = fx
            .manager
            .sign_in("+256700000000", "1234", None)
            .await
            .unwrap();
        assert_eq!(user.phone, "+256700000000");
        assert_eq!(
            fx.storage.get("token").unwrap().as_deref(),
            Some("fresh-token")
        );
        assert!(fx.manager.state().is_confirmed());
        assert_eq!(
            rx.recv().await.unwrap(),
            Event::SignedIn {
                user_id: "u-2".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_code_locally() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        let err = fx
            .manager
            .sign_in("+256700000000", "12", None)
            .await
            .unwrap_err();
        assert!(matches!(err, MotofixError::Validation { ref field, .. } if field.as_deref() == Some("code")));
    }

    #[tokio::test]
    async fn test_sign_out_clears_even_if_remote_fails() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/logout"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;

        let fx = fixture(&server, 2);
        seed(&fx);

        let handle = fx.manager.sign_out().unwrap().expect("remote call spawned");
        // local state is gone before the remote call completes
        assert!(fx.storage.is_empty());
        assert_eq!(fx.manager.state(), AuthState::Unauthenticated);

        handle.await.unwrap();
        assert!(fx.storage.is_empty());
    }

    #[tokio::test]
    async fn test_sign_out_without_session() {
        let server = MockServer::start().await;
        let fx = fixture(&server, 2);
        assert!(fx.manager.sign_out().unwrap().is_none());
    }
}
