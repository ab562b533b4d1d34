//! SessionContext - the single active session, shared by the API client,
//! the services and the shell.
//!
//! Lifecycle: `init` restores from storage at startup, `start` on login,
//! `set_access_token` on refresh, `clear` on logout or refresh failure.
//! Every transition is broadcast as a `SessionEvent`.

use super::model::{Session, User};
use super::storage::{LocalStorage, ACCESS_TOKEN_KEY, SESSION_KEYS, USER_KEY};
use anyhow::Result;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    /// The user asked to log out
    UserRequested,
    /// The access token expired and could not be refreshed
    RefreshFailed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    LoggedIn { user_id: String },
    TokenRefreshed,
    ProfileUpdated,
    /// Consumers should send the user back to the login entry point
    LoggedOut { reason: LogoutReason },
}

/// In-memory session state. The token is held on its own so that a refresh
/// without a known user still authenticates the requests that follow it.
#[derive(Debug, Default)]
struct SessionState {
    access_token: Option<String>,
    user: Option<User>,
}

impl SessionState {
    fn session(&self) -> Option<Session> {
        match (&self.user, &self.access_token) {
            (Some(user), Some(token)) => Some(Session::new(user.clone(), token.clone())),
            _ => None,
        }
    }
}

#[derive(Clone)]
pub struct SessionContext {
    state: Arc<RwLock<SessionState>>,
    storage: Arc<dyn LocalStorage>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionContext {
    /// Build a context and restore any session persisted in `storage`.
    ///
    /// Unreadable storage is logged and cleared; startup continues signed out.
    pub fn init(storage: Arc<dyn LocalStorage>) -> Result<Self> {
        let (events, _) = broadcast::channel(32);
        let restored = Self::restore(storage.as_ref());
        if let Some(session) = restored.session() {
            info!(target: "session", "Restored session for {}", session.email());
        }

        Ok(Self {
            state: Arc::new(RwLock::new(restored)),
            storage,
            events,
        })
    }

    fn restore(storage: &dyn LocalStorage) -> SessionState {
        let stored = storage
            .get(ACCESS_TOKEN_KEY)
            .and_then(|token| Ok((token, storage.get(USER_KEY)?)));
        let (token, user) = match stored {
            Ok(entries) => entries,
            Err(e) => {
                warn!(target: "session", "Discarding unreadable session storage: {:#}", e);
                Self::discard(storage);
                return SessionState::default();
            }
        };

        let access_token = token.filter(|t| !t.is_empty());
        let user = match user.map(|json| serde_json::from_str::<User>(&json)) {
            Some(Ok(user)) => Some(user),
            Some(Err(e)) => {
                warn!(target: "session", "Discarding unreadable stored user: {}", e);
                Self::discard(storage);
                return SessionState::default();
            }
            None => None,
        };

        SessionState { access_token, user }
    }

    fn discard(storage: &dyn LocalStorage) {
        if let Err(e) = storage.remove_many(&SESSION_KEYS) {
            warn!(target: "session", "Failed to clear stored session: {}", e);
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The signed-in session, present only when both user and token are known
    pub fn current(&self) -> Option<Session> {
        self.read().session()
    }

    /// The token sent as the bearer credential, with or without a known user
    pub fn access_token(&self) -> Option<String> {
        self.read().access_token.clone()
    }

    pub fn user(&self) -> Option<User> {
        self.current().map(|s| s.user)
    }

    pub fn user_id(&self) -> Option<String> {
        self.current().map(|s| s.user.id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.current().map_or(false, |s| s.is_admin())
    }

    /// Begin a session after login, registration or OAuth sign-in
    pub fn start(&self, session: Session) {
        let user_id = session.user.id.clone();
        self.persist(&[
            (ACCESS_TOKEN_KEY, session.access_token.clone()),
            (USER_KEY, Self::user_json(&session.user)),
        ]);
        *self.write() = SessionState {
            access_token: Some(session.access_token),
            user: Some(session.user),
        };

        info!(target: "session", "Session started for user {}", user_id);
        let _ = self.events.send(SessionEvent::LoggedIn { user_id });
    }

    /// Replace the access token after a successful refresh.
    ///
    /// Applies even with no user in memory (e.g. the cookie outlived the
    /// stored session); later requests carry the new token either way.
    pub fn set_access_token(&self, token: &str) {
        self.persist(&[(ACCESS_TOKEN_KEY, token.to_string())]);
        self.write().access_token = Some(token.to_string());
        let _ = self.events.send(SessionEvent::TokenRefreshed);
    }

    /// Swap in a user returned by a profile update, keeping the token
    pub fn set_user(&self, user: User) {
        let mut state = self.write();
        if state.session().is_none() {
            warn!(target: "session", "Ignoring profile update without an active session");
            return;
        }
        self.persist(&[(USER_KEY, Self::user_json(&user))]);
        state.user = Some(user);
        drop(state);

        let _ = self.events.send(SessionEvent::ProfileUpdated);
    }

    /// Drop the session from memory and storage in one step
    pub fn clear(&self, reason: LogoutReason) {
        Self::discard(self.storage.as_ref());
        *self.write() = SessionState::default();

        info!(target: "session", "Session cleared ({:?})", reason);
        let _ = self.events.send(SessionEvent::LoggedOut { reason });
    }

    fn persist(&self, entries: &[(&str, String)]) {
        if let Err(e) = self.storage.set_many(entries) {
            warn!(target: "session", "Failed to persist session: {}", e);
        }
    }

    fn user_json(user: &User) -> String {
        serde_json::to_string(user).unwrap_or_else(|_| "null".to_string())
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }
}
