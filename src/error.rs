/// Errors from the token lifecycle and authenticated request pipeline.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// No authenticated session exists.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The identity provider rejected the refresh call or was unreachable.
    ///
    /// `status` is the provider's HTTP status when one was received.
    #[error("token refresh failed: {detail}")]
    Refresh {
        status: Option<u16>,
        detail: String,
    },

    /// A non-refresh identity-provider operation failed (code exchange, userinfo).
    #[error("OAuth {operation} failed: {detail}")]
    OAuth {
        operation: &'static str,
        status: Option<u16>,
        detail: String,
    },

    /// Transport-level failure talking to the protected API.
    #[cfg(feature = "client")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A required identity claim is absent from the session.
    #[error("missing claim: {0}")]
    MissingClaim(&'static str),

    /// Session store operation failed.
    #[error("session store error: {0}")]
    Store(String),

    /// Missing or invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),
}
