use std::sync::Arc;

use time::OffsetDateTime;

use super::traits::SessionStore;
use super::types::SessionId;
use crate::error::Error;
use crate::token::{SessionTokens, TokenStore};

/// Binds one session's ticket in a [`SessionStore`] to the pipeline's
/// [`TokenStore`] contract, so a refresh performed mid-request lands back in
/// the session for the rest of its lifetime.
pub struct SessionTokenAccess<S> {
    sessions: Arc<S>,
    session_id: SessionId,
}

impl<S> SessionTokenAccess<S> {
    /// Scope the given store to `session_id`.
    #[must_use]
    pub fn new(sessions: Arc<S>, session_id: SessionId) -> Self {
        Self {
            sessions,
            session_id,
        }
    }
}

impl<S: SessionStore> TokenStore for SessionTokenAccess<S> {
    async fn get(&self) -> Result<SessionTokens, Error> {
        self.sessions
            .find(&self.session_id)
            .await
            .map_err(|e| Error::Store(e.to_string()))?
            .map(|session| session.tokens)
            .ok_or(Error::NotAuthenticated)
    }

    async fn update(&self, access_token: String, expires_at: OffsetDateTime) -> Result<(), Error> {
        self.sessions
            .update_tokens(&self.session_id, access_token, expires_at)
            .await
            .map_err(|e| Error::Store(e.to_string()))
    }
}
