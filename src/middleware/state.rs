use std::sync::Arc;

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::{AuthSettings, WebAuthConfig};
use super::tokens::SessionTokenAccess;
use super::traits::SessionStore;
use super::types::SessionId;
use crate::oauth::AuthClient;
use crate::pipeline::ApiClient;

/// Shared state for auth route handlers and the [`AuthSession`](super::AuthSession)
/// extractor.
pub struct AuthState<S> {
    pub(super) client: Arc<AuthClient>,
    pub(super) sessions: Arc<S>,
    pub(super) settings: AuthSettings,
}

impl<S: SessionStore> AuthState<S> {
    /// Build the runtime state from a config and a session store.
    #[must_use]
    pub fn new(config: WebAuthConfig, sessions: S) -> Self {
        Self {
            client: Arc::new(config.client),
            sessions: Arc::new(sessions),
            settings: config.settings,
        }
    }

    /// The identity-provider client.
    #[must_use]
    pub fn auth_client(&self) -> Arc<AuthClient> {
        self.client.clone()
    }

    /// [`TokenStore`](crate::token::TokenStore) view of one session's tokens.
    #[must_use]
    pub fn token_access(&self, session_id: SessionId) -> SessionTokenAccess<S> {
        SessionTokenAccess::new(self.sessions.clone(), session_id)
    }

    /// Protected-API client bound to one session: reads the session's tokens,
    /// refreshes them when expired, and writes renewals back.
    #[must_use]
    pub fn api_client(&self, session_id: &SessionId) -> ApiClient<Arc<AuthClient>, SessionTokenAccess<S>> {
        ApiClient::new(self.client.clone(), self.token_access(session_id.clone()))
    }
}

// Manual Clone: avoid derive adding an `S: Clone` bound.
impl<S> Clone for AuthState<S> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            sessions: self.sessions.clone(),
            settings: self.settings.clone(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl<S: SessionStore> FromRef<AuthState<S>> for Key {
    fn from_ref(state: &AuthState<S>) -> Self {
        state.settings.cookie_key.clone()
    }
}
