//! Identity-provider client: endpoint configuration, code exchange, and
//! refresh-token renewal.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::Error;

/// Identity-provider configuration for a confidential client.
///
/// Endpoint URLs derive from the tenant domain and can be overridden
/// individually:
///
/// ```rust,ignore
/// let config = OAuthConfig::new("tenant.auth.example", "client-id", "client-secret")?
///     .with_redirect_uri("https://my-app.com/auth/callback".parse()?);
/// ```
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct OAuthConfig {
    pub(crate) client_id: String,
    pub(crate) client_secret: String,
    pub(crate) authorize_url: Url,
    pub(crate) token_url: Url,
    pub(crate) userinfo_url: Url,
    pub(crate) redirect_uri: Option<Url>,
    pub(crate) scopes: Vec<String>,
}

impl OAuthConfig {
    /// Create a configuration for the given tenant domain.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the domain does not form valid
    /// `https://{domain}/...` endpoint URLs.
    pub fn new(
        domain: &str,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Result<Self, Error> {
        Ok(Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            authorize_url: endpoint(domain, "authorize")?,
            token_url: endpoint(domain, "oauth/token")?,
            userinfo_url: endpoint(domain, "userinfo")?,
            redirect_uri: None,
            // offline_access asks the provider to issue a refresh token
            scopes: vec!["openid".into(), "profile".into(), "offline_access".into()],
        })
    }

    /// Create a configuration from environment variables.
    ///
    /// # Required env vars
    /// - `GAMELIB_AUTH_DOMAIN`: identity-provider tenant domain
    /// - `GAMELIB_CLIENT_ID`: OAuth2 client ID
    /// - `GAMELIB_CLIENT_SECRET`: OAuth2 client secret
    ///
    /// # Optional env vars
    /// - `GAMELIB_REDIRECT_URI`: OAuth2 callback URI (must be a valid URL)
    /// - `GAMELIB_SCOPES`: comma-separated OAuth2 scopes
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if required vars are missing or URLs are invalid.
    pub fn from_env() -> Result<Self, Error> {
        let domain = std::env::var("GAMELIB_AUTH_DOMAIN")
            .map_err(|_| Error::Config("GAMELIB_AUTH_DOMAIN is required".into()))?;
        let client_id = std::env::var("GAMELIB_CLIENT_ID")
            .map_err(|_| Error::Config("GAMELIB_CLIENT_ID is required".into()))?;
        let client_secret = std::env::var("GAMELIB_CLIENT_SECRET")
            .map_err(|_| Error::Config("GAMELIB_CLIENT_SECRET is required".into()))?;

        let mut config = Self::new(&domain, client_id, client_secret)?;

        if let Ok(uri) = std::env::var("GAMELIB_REDIRECT_URI") {
            let uri: Url = uri
                .parse()
                .map_err(|e| Error::Config(format!("GAMELIB_REDIRECT_URI: {e}")))?;
            config = config.with_redirect_uri(uri);
        }
        if let Ok(scopes) = std::env::var("GAMELIB_SCOPES") {
            config = config.with_scopes(scopes.split(',').map(|s| s.trim().to_string()).collect());
        }

        Ok(config)
    }

    /// Override the authorization endpoint.
    #[must_use]
    pub fn with_authorize_url(mut self, url: Url) -> Self {
        self.authorize_url = url;
        self
    }

    /// Override the token endpoint.
    #[must_use]
    pub fn with_token_url(mut self, url: Url) -> Self {
        self.token_url = url;
        self
    }

    /// Override the userinfo endpoint.
    #[must_use]
    pub fn with_userinfo_url(mut self, url: Url) -> Self {
        self.userinfo_url = url;
        self
    }

    /// Set the OAuth2 redirect URI (required for the login flow, not for refresh).
    #[must_use]
    pub fn with_redirect_uri(mut self, uri: Url) -> Self {
        self.redirect_uri = Some(uri);
        self
    }

    /// Override the OAuth2 scopes (default: `openid profile offline_access`).
    #[must_use]
    pub fn with_scopes(mut self, scopes: Vec<String>) -> Self {
        self.scopes = scopes;
        self
    }

    /// OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &Url {
        &self.token_url
    }

    /// Authorization endpoint URL.
    #[must_use]
    pub fn authorize_url(&self) -> &Url {
        &self.authorize_url
    }

    /// Userinfo endpoint URL.
    #[must_use]
    pub fn userinfo_url(&self) -> &Url {
        &self.userinfo_url
    }
}

fn endpoint(domain: &str, path: &str) -> Result<Url, Error> {
    format!("https://{domain}/{path}")
        .parse()
        .map_err(|e| Error::Config(format!("invalid domain {domain:?}: {e}")))
}

/// Response from the provider's token endpoint.
///
/// Returned by both the authorization-code exchange and the refresh call.
/// `expires_in` is informational; the session tracks expiry through its own
/// stored timestamp.
#[derive(Debug, Clone, Deserialize)]
#[non_exhaustive]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
    #[serde(default)]
    pub id_token: Option<String>,
}

/// Refresh-token grant payload; the token endpoint expects a JSON body.
#[derive(Serialize)]
struct RefreshRequest<'a> {
    grant_type: &'static str,
    client_id: &'a str,
    client_secret: &'a str,
    refresh_token: &'a str,
}

/// Client for the identity provider's OAuth2 endpoints.
#[derive(Clone)]
pub struct AuthClient {
    config: OAuthConfig,
    http: reqwest::Client,
}

impl AuthClient {
    /// Create a new client.
    #[must_use]
    pub fn new(config: OAuthConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for timeouts, connection pool reuse, testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL the browser is redirected to at login.
    ///
    /// `state` is the caller-generated CSRF token, verified on callback.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no redirect URI is configured.
    pub fn authorization_url(&self, state: &str) -> Result<String, Error> {
        let redirect_uri = self.redirect_uri()?;
        let scope = self.config.scopes.join(" ");

        let mut url = self.config.authorize_url.clone();
        url.query_pairs_mut()
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", redirect_uri.as_str())
            .append_pair("scope", &scope)
            .append_pair("state", state);

        Ok(url.into())
    }

    /// Exchange an authorization code for tokens.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if no redirect URI is configured,
    /// [`Error::Http`] on network failure, or [`Error::OAuth`] if the token
    /// endpoint returns an error.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, Error> {
        let redirect_uri = self.redirect_uri()?.to_string();
        let params = [
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &redirect_uri),
            ("client_id", &self.config.client_id),
            ("client_secret", &self.config.client_secret),
        ];

        let response = self
            .http
            .post(self.config.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let response = ensure_success(response, "token exchange").await?;
        response.json::<TokenResponse>().await.map_err(Into::into)
    }

    /// Renew the access token with the stored refresh token.
    ///
    /// # Errors
    ///
    /// Every failure mode — unreachable provider, non-2xx response, malformed
    /// body — surfaces as [`Error::Refresh`]; nothing is retried.
    pub async fn refresh_tokens(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        let payload = RefreshRequest {
            grant_type: "refresh_token",
            client_id: &self.config.client_id,
            client_secret: &self.config.client_secret,
            refresh_token,
        };

        let response = self
            .http
            .post(self.config.token_url.clone())
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::Refresh {
                status: None,
                detail: e.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let detail = response.text().await.unwrap_or_default();
            return Err(Error::Refresh {
                status: Some(status),
                detail,
            });
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::Refresh {
                status: None,
                detail: format!("malformed token response: {e}"),
            })
    }

    /// Fetch the user's identity claims from the userinfo endpoint.
    ///
    /// Non-string claim values (arrays, booleans) are kept as their JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::OAuth`] if the
    /// userinfo endpoint returns an error.
    pub async fn user_claims(&self, access_token: &str) -> Result<HashMap<String, String>, Error> {
        let response = self
            .http
            .get(self.config.userinfo_url.clone())
            .bearer_auth(access_token)
            .send()
            .await?;

        let response = ensure_success(response, "userinfo request").await?;
        let raw: HashMap<String, serde_json::Value> = response.json().await?;

        Ok(raw
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect())
    }

    fn redirect_uri(&self) -> Result<&Url, Error> {
        self.config
            .redirect_uri
            .as_ref()
            .ok_or_else(|| Error::Config("redirect URI is not configured".into()))
    }
}

/// Checks HTTP response status; returns the response on success or an error with details.
async fn ensure_success(
    response: reqwest::Response,
    operation: &'static str,
) -> Result<reqwest::Response, Error> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status().as_u16();
    let detail = response.text().await.unwrap_or_default();
    Err(Error::OAuth {
        operation,
        status: Some(status),
        detail,
    })
}
