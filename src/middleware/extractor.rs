use std::collections::HashMap;

use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::http::request::Parts;
use axum_extra::extract::PrivateCookieJar;

use super::error::AuthError;
use super::state::AuthState;
use super::traits::SessionStore;
use super::types::SessionId;
use crate::token::SessionTokens;

/// Authenticated session extracted from the private session cookie.
///
/// Rejects with `401 Unauthorized` when no valid session exists. Use
/// `Option<AuthSession>` for pages that render for guests too:
///
/// ```rust,ignore
/// async fn index(session: Option<AuthSession>) -> impl IntoResponse {
///     match session {
///         Some(s) => render_profile(&s.claims),
///         None => render_guest(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthSession {
    /// Session ID (from the cookie).
    pub session_id: SessionId,
    /// Identity claims captured at login.
    pub claims: HashMap<String, String>,
    /// Tokens as currently stored; the pipeline refreshes them on use.
    pub tokens: SessionTokens,
}

impl<S: SessionStore> FromRequestParts<AuthState<S>> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<S>,
    ) -> Result<Self, Self::Rejection> {
        let jar: PrivateCookieJar = PrivateCookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthError::Unauthenticated)?;

        let session_id = jar
            .get(&state.settings.session_cookie_name)
            .map(|c| SessionId(c.value().to_string()))
            .ok_or(AuthError::Unauthenticated)?;

        let session = state
            .sessions
            .find(&session_id)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?
            .ok_or(AuthError::SessionExpired)?;

        Ok(Self {
            session_id,
            claims: session.claims,
            tokens: session.tokens,
        })
    }
}

impl<S: SessionStore> OptionalFromRequestParts<AuthState<S>> for AuthSession {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthState<S>,
    ) -> Result<Option<Self>, Self::Rejection> {
        match <Self as FromRequestParts<AuthState<S>>>::from_request_parts(parts, state).await {
            Ok(session) => Ok(Some(session)),
            Err(AuthError::Unauthenticated | AuthError::SessionExpired) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
