use axum_extra::extract::cookie::Key;

use super::error::AuthError;
use crate::oauth::{AuthClient, OAuthConfig};

/// Shared auth settings used by both config and runtime state.
#[derive(Clone)]
pub(crate) struct AuthSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_days: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) auth_path: String,
    pub(crate) login_redirect: String,
    pub(crate) logout_redirect: String,
    pub(crate) error_redirect: String,
}

impl AuthSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "__gamelib_session".into(),
            session_ttl_days: 30,
            secure_cookies: true,
            auth_path: "/auth".into(),
            login_redirect: "/".into(),
            logout_redirect: "/".into(),
            error_redirect: "/login".into(),
        }
    }
}

/// Web-layer authentication configuration.
///
/// Wraps the identity-provider client with cookie and redirect settings.
/// Use [`from_env()`](WebAuthConfig::from_env) for convention-based setup, or
/// [`new()`](WebAuthConfig::new) with `with_*` methods for full control.
pub struct WebAuthConfig {
    pub(super) client: AuthClient,
    pub(super) settings: AuthSettings,
}

impl WebAuthConfig {
    /// Create config with the required [`AuthClient`].
    ///
    /// All optional fields use sensible defaults. Override with `with_*` methods.
    #[must_use]
    pub fn new(client: AuthClient) -> Self {
        Self {
            client,
            settings: AuthSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// Reads everything [`OAuthConfig::from_env`] reads, and additionally:
    /// - `GAMELIB_REDIRECT_URI` becomes required (the login flow needs it)
    /// - `GAMELIB_COOKIE_KEY` (optional): cookie encryption key, at least 64
    ///   bytes; an ephemeral key is generated when unset
    /// - `GAMELIB_DEV` (optional): `"1"` or `"true"` disables secure cookies
    ///   for plain-HTTP local development
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Config`] if required env vars are missing or invalid.
    pub fn from_env() -> Result<Self, AuthError> {
        let oauth = OAuthConfig::from_env().map_err(|e| AuthError::Config(e.to_string()))?;
        if oauth.redirect_uri.is_none() {
            return Err(AuthError::Config("GAMELIB_REDIRECT_URI is required".into()));
        }

        let dev_mode = matches!(
            std::env::var("GAMELIB_DEV").as_deref(),
            Ok("1") | Ok("true")
        );

        let cookie_key = match std::env::var("GAMELIB_COOKIE_KEY") {
            Ok(k) => Key::try_from(k.as_bytes()).map_err(|_| {
                AuthError::Config(
                    "GAMELIB_COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?,
            Err(_) => Key::generate(),
        };

        Ok(Self::new(AuthClient::new(oauth))
            .with_cookie_key(cookie_key)
            .with_secure_cookies(!dev_mode))
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_days(mut self, days: i64) -> Self {
        self.settings.session_ttl_days = days;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    /// Path prefix the auth routes are mounted under (default `/auth`).
    #[must_use]
    pub fn with_auth_path(mut self, path: impl Into<String>) -> Self {
        self.settings.auth_path = path.into();
        self
    }

    #[must_use]
    pub fn with_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.login_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_logout_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.logout_redirect = path.into();
        self
    }

    #[must_use]
    pub fn with_error_redirect(mut self, path: impl Into<String>) -> Self {
        self.settings.error_redirect = path.into();
        self
    }
}
