//! Authentication and session lifecycle

mod session;
mod types;

use std::sync::Arc;

use crate::error::Error;
use crate::fetch::ApiClient;

pub use session::*;
pub use types::*;

/// Client for authentication against the storefront backend
pub struct Auth {
    api: ApiClient,
    session: Arc<SessionStore>,
}

impl Auth {
    /// Create a new Auth client
    pub(crate) fn new(api: ApiClient) -> Self {
        let session = api.session().clone();
        Self { api, session }
    }

    /// The session store this client mutates
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Exchange credentials for a session.
    ///
    /// On success the tokens and a resolved user profile are installed and
    /// persisted. When the profile endpoint is unavailable the user is a
    /// placeholder derived from the submitted username. Every failure mode
    /// of the credential check surfaces as the same generic authentication
    /// error; a failed attempt never disturbs an existing session.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, Error> {
        let tokens = match self
            .api
            .post_public("/token/")
            .json(credentials)?
            .execute::<TokenPair>()
            .await
        {
            Ok(tokens) => tokens,
            Err(err) => {
                tracing::debug!("credential exchange rejected: {}", err);
                return Err(Error::auth("invalid credentials"));
            }
        };

        let user = match self
            .api
            .get_public("/auth/profile/")
            .bearer_auth(&tokens.access)
            .execute::<User>()
            .await
        {
            Ok(user) => user,
            Err(err) => {
                tracing::warn!("profile fetch failed, using placeholder: {}", err);
                User::placeholder(&credentials.username)
            }
        };

        let session = Session {
            access_token: tokens.access,
            refresh_token: tokens.refresh,
            user: Some(user),
        };
        self.session.set_session(session.clone()).await?;

        Ok(session)
    }

    /// Register a new account.
    ///
    /// Does not sign in; callers follow up with [`sign_in`].
    ///
    /// [`sign_in`]: Auth::sign_in
    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<User, Error> {
        let body = serde_json::json!({
            "username": username,
            "email": email,
            "password": password,
        });

        self.api
            .post_public("/register/")
            .json(&body)?
            .execute::<User>()
            .await
    }

    /// Fetch the authenticated user's profile
    pub async fn profile(&self) -> Result<User, Error> {
        self.api.get("/auth/profile/").execute::<User>().await
    }

    /// Update the authenticated user's profile
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, Error> {
        let user = self
            .api
            .put("/auth/profile/")
            .json(update)?
            .execute::<User>()
            .await?;

        // Keep the cached copy in step with the server.
        if let Some(mut session) = self.session.session() {
            session.user = Some(user.clone());
            self.session.set_session(session).await?;
        }

        Ok(user)
    }

    /// Sign out; idempotent and never fails
    pub async fn sign_out(&self) {
        self.session.clear().await;
    }

    /// Restore persisted session state; invoked once at process start
    pub async fn restore(&self) {
        self.session.restore().await;
    }
}
