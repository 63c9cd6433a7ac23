//! Persistent session store

use super::types::{AuthState, Session, User};
use crate::error::{MotofixError, MotofixResult};
use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Owner of the persisted session and the in-memory [`AuthState`]
///
/// The token and user record are always written and removed together.
/// Every mutation holds `write_gate` across its read-check-write sequence.
pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<AuthState>,
    write_gate: Mutex<()>,
}

impl SessionStore {
    /// Create a store over `storage`. The in-memory state starts unauthenticated
    /// until [`restore`](Self::restore) is called.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self {
            storage,
            state: RwLock::new(AuthState::Unauthenticated),
            write_gate: Mutex::new(()),
        }
    }

    /// Load the persisted session without touching the network
    ///
    /// Returns a tentative state when both keys are present. A half-written or
    /// unreadable session is removed.
    pub fn restore(&self) -> MotofixResult<AuthState> {
        let _gate = self.write_gate.lock();
        let state = match self.read_persisted_locked() {
            Ok(Some(session)) => AuthState::Tentative(session),
            Ok(None) => AuthState::Unauthenticated,
            Err(MotofixError::Json { message, .. }) => {
                tracing::warn!("discarding unreadable cached session: {}", message);
                self.remove_keys()?;
                AuthState::Unauthenticated
            }
            Err(e) => return Err(e),
        };

        *self.state.write() = state.clone();
        Ok(state)
    }

    /// Read the persisted session, if both keys are present
    pub fn read_persisted(&self) -> MotofixResult<Option<Session>> {
        let _gate = self.write_gate.lock();
        self.read_persisted_locked()
    }

    fn read_persisted_locked(&self) -> MotofixResult<Option<Session>> {
        let token = self.storage.get(TOKEN_KEY)?;
        let user = self.storage.get(USER_KEY)?;

        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                let user: User = serde_json::from_str(&user).map_err(|e| {
                    MotofixError::json_with_context(e.to_string(), "Reading cached user record")
                })?;
                Ok(Some(Session { token, user }))
            }
            (None, None) => Ok(None),
            _ => {
                tracing::debug!("incomplete cached session, removing both keys");
                self.remove_keys()?;
                Ok(None)
            }
        }
    }

    /// Persist a freshly issued session and mark it confirmed
    pub fn save(&self, session: &Session) -> MotofixResult<()> {
        let user = serde_json::to_string(&session.user)?;
        let _gate = self.write_gate.lock();
        self.storage.set(TOKEN_KEY, &session.token)?;
        if let Err(e) = self.storage.set(USER_KEY, &user) {
            // never leave a token without its user
            let _ = self.storage.remove(TOKEN_KEY);
            return Err(e);
        }

        *self.state.write() = AuthState::Authenticated(session.clone());
        Ok(())
    }

    /// Replace the cached user after a successful verification of `token`
    ///
    /// Returns `false` without writing if `token` is no longer the stored one,
    /// e.g. because the user signed out while verification was in flight.
    pub fn confirm(&self, token: &str, user: User) -> MotofixResult<bool> {
        let serialized = serde_json::to_string(&user)?;
        let _gate = self.write_gate.lock();
        if self.token().as_deref() != Some(token) {
            return Ok(false);
        }

        self.storage.set(USER_KEY, &serialized)?;
        *self.state.write() = AuthState::Authenticated(Session {
            token: token.to_string(),
            user,
        });
        Ok(true)
    }

    /// Remove the persisted session and reset the in-memory state
    ///
    /// The in-memory state is reset even if storage removal fails.
    pub fn clear(&self) -> MotofixResult<()> {
        let _gate = self.write_gate.lock();
        self.clear_locked()
    }

    /// Clear only if `token` is still the stored credential
    pub fn clear_if_current(&self, token: &str) -> MotofixResult<bool> {
        let _gate = self.write_gate.lock();
        match self.token() {
            Some(current) if current == token => {
                self.clear_locked()?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Bearer token currently persisted, if any
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token.filter(|t| !t.is_empty()),
            Err(e) => {
                tracing::warn!("failed to read session token: {}", e);
                None
            }
        }
    }

    /// Snapshot of the in-memory state
    pub fn state(&self) -> AuthState {
        self.state.read().clone()
    }

    fn clear_locked(&self) -> MotofixResult<()> {
        *self.state.write() = AuthState::Unauthenticated;
        self.remove_keys()
    }

    fn remove_keys(&self) -> MotofixResult<()> {
        let token = self.storage.remove(TOKEN_KEY);
        let user = self.storage.remove(USER_KEY);
        token.and(user)
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.state.read().is_authenticated())
            .finish()
    }
}
