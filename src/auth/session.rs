//! Session state and its bridge to persistent storage

use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

use crate::auth::types::User;
use crate::error::Error;
use crate::storage::{TokenStore, KEY_ACCESS_TOKEN, KEY_REFRESH_TOKEN, KEY_USER_DATA};

/// Session data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// The access token
    pub access_token: String,

    /// The refresh token; persisted but never exchanged automatically
    #[serde(default)]
    pub refresh_token: Option<String>,

    /// The cached user profile, best-effort
    #[serde(default)]
    pub user: Option<User>,
}

/// Authentication status as observed by consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// Persisted state has not been restored yet
    Unknown,
    /// No valid session is held
    SignedOut,
    /// A session with an access token is held
    SignedIn,
}

/// Single source of truth for authentication state.
///
/// Holds the current session in memory, mirrors every change to the backing
/// [`TokenStore`], and broadcasts status transitions over a watch channel so
/// consumers can react instead of polling.
pub struct SessionStore {
    session: RwLock<Option<Session>>,
    status_tx: watch::Sender<SessionStatus>,
    store: Arc<dyn TokenStore>,
}

impl SessionStore {
    /// Create a store backed by the given persistence layer.
    ///
    /// The status starts as [`SessionStatus::Unknown`] until [`restore`]
    /// has run.
    ///
    /// [`restore`]: SessionStore::restore
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        let (status_tx, _rx) = watch::channel(SessionStatus::Unknown);
        Self {
            session: RwLock::new(None),
            status_tx,
            store,
        }
    }

    /// The current status
    pub fn status(&self) -> SessionStatus {
        *self.status_tx.borrow()
    }

    // Subscribers are only woken on actual status changes; a repeated
    // sign-out or a re-installed session keeps the channel quiet.
    fn transition(&self, next: SessionStatus) {
        self.status_tx.send_if_modified(|status| {
            if *status == next {
                false
            } else {
                *status = next;
                true
            }
        });
    }

    /// Whether a session with an access token is held
    pub fn signed(&self) -> bool {
        self.status() == SessionStatus::SignedIn
    }

    /// Subscribe to status transitions
    pub fn subscribe(&self) -> watch::Receiver<SessionStatus> {
        self.status_tx.subscribe()
    }

    /// The current access token, if any
    pub fn access_token(&self) -> Option<String> {
        let guard = self.session.read().unwrap();
        guard.as_ref().map(|s| s.access_token.clone())
    }

    /// The cached user profile, if any
    pub fn current_user(&self) -> Option<User> {
        let guard = self.session.read().unwrap();
        guard.as_ref().and_then(|s| s.user.clone())
    }

    /// The current session, if any
    pub fn session(&self) -> Option<Session> {
        self.session.read().unwrap().clone()
    }

    /// Install a new session and persist it.
    ///
    /// Persisted values are written before the in-memory state changes.
    pub async fn set_session(&self, session: Session) -> Result<(), Error> {
        self.store
            .set(KEY_ACCESS_TOKEN, &session.access_token)
            .await?;
        if let Some(ref refresh) = session.refresh_token {
            self.store.set(KEY_REFRESH_TOKEN, refresh).await?;
        }
        if let Some(ref user) = session.user {
            let raw = serde_json::to_string(user)?;
            self.store.set(KEY_USER_DATA, &raw).await?;
        }

        {
            let mut guard = self.session.write().unwrap();
            *guard = Some(session);
        }
        self.transition(SessionStatus::SignedIn);
        tracing::debug!("session installed");
        Ok(())
    }

    /// Reload persisted state; invoked once at startup.
    ///
    /// A persisted access token re-establishes the session without any
    /// network call. Resolves the status out of `Unknown` either way.
    pub async fn restore(&self) {
        match self.store.get(KEY_ACCESS_TOKEN).await {
            Some(access_token) => {
                let refresh_token = self.store.get(KEY_REFRESH_TOKEN).await;
                let user = self
                    .store
                    .get(KEY_USER_DATA)
                    .await
                    .and_then(|raw| serde_json::from_str(&raw).ok());

                {
                    let mut guard = self.session.write().unwrap();
                    *guard = Some(Session {
                        access_token,
                        refresh_token,
                        user,
                    });
                }
                self.transition(SessionStatus::SignedIn);
                tracing::debug!("session restored from storage");
            }
            None => {
                self.transition(SessionStatus::SignedOut);
            }
        }
    }

    /// Clear the session; idempotent and never fails.
    ///
    /// Deletes from storage are best-effort.
    pub async fn clear(&self) {
        {
            let mut guard = self.session.write().unwrap();
            *guard = None;
        }
        self.store.delete(KEY_ACCESS_TOKEN).await;
        self.store.delete(KEY_REFRESH_TOKEN).await;
        self.store.delete(KEY_USER_DATA).await;
        self.transition(SessionStatus::SignedOut);
    }

    /// Handle an authorization expiry observed on an authenticated request.
    ///
    /// Returns `true` only when a session was actually dropped, so a burst
    /// of failing requests produces a single signed-out transition.
    pub async fn expire(&self) -> bool {
        let had_session = {
            let mut guard = self.session.write().unwrap();
            guard.take().is_some()
        };
        if had_session {
            self.store.delete(KEY_ACCESS_TOKEN).await;
            self.store.delete(KEY_REFRESH_TOKEN).await;
            self.store.delete(KEY_USER_DATA).await;
            self.transition(SessionStatus::SignedOut);
            tracing::debug!("session expired, signed out");
        }
        had_session
    }
}
