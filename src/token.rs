use std::future::Future;

use serde::{Deserialize, Serialize};
use time::{OffsetDateTime, UtcOffset};

use crate::error::Error;

/// Bearer credentials held by one authenticated session.
///
/// Created at login from the identity provider's token response, mutated on
/// each refresh, and destroyed with the session. `expires_at` is always
/// normalized to UTC so expiry checks never mix clocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    /// Opaque access token issued by the identity provider.
    pub access_token: String,
    /// When the access token stops being valid (UTC).
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,
    /// Long-lived credential for obtaining a new access token, if granted.
    pub refresh_token: Option<String>,
}

impl SessionTokens {
    /// Create session tokens, normalizing `expires_at` to UTC.
    #[must_use]
    pub fn new(
        access_token: impl Into<String>,
        expires_at: OffsetDateTime,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            expires_at: expires_at.to_offset(UtcOffset::UTC),
            refresh_token,
        }
    }

    /// Whether the access token is expired at `now`.
    ///
    /// `OffsetDateTime` comparison is instant-based, so a caller passing a
    /// non-UTC `now` still gets a correct answer.
    #[must_use]
    pub fn is_expired(&self, now: OffsetDateTime) -> bool {
        self.expires_at <= now
    }
}

/// Compute an expiry timestamp `expires_in_secs` seconds after `now`.
///
/// Saturates instead of overflowing on pathological lifetimes.
#[must_use]
pub fn expiry_from_now(now: OffsetDateTime, expires_in_secs: u64) -> OffsetDateTime {
    let secs = i64::try_from(expires_in_secs).unwrap_or(i64::MAX);
    now.to_offset(UtcOffset::UTC)
        .saturating_add(time::Duration::seconds(secs))
}

/// Session-scoped access to the stored tokens.
///
/// One session is read and written sequentially within a single request, so
/// implementations need no cross-request coordination beyond interior
/// per-operation locking.
pub trait TokenStore: Send + Sync {
    /// Read the current tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotAuthenticated`] if no session exists.
    fn get(&self) -> impl Future<Output = Result<SessionTokens, Error>> + Send;

    /// Overwrite the stored access token and expiry after a successful refresh.
    ///
    /// Subsequent [`get`](TokenStore::get) calls observe the new values for
    /// the remainder of the session's lifetime.
    fn update(
        &self,
        access_token: String,
        expires_at: OffsetDateTime,
    ) -> impl Future<Output = Result<(), Error>> + Send;
}
