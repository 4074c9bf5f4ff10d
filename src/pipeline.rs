//! Authenticated request pipeline for the protected API.
//!
//! Guarantees every outbound call carries a currently-valid bearer token
//! (refreshing it first when the stored expiry has passed) and translates the
//! HTTP outcome into a human-readable status for display.

use std::future::Future;
use std::sync::Arc;

use reqwest::header::ACCEPT;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use time::OffsetDateTime;

use crate::error::Error;
use crate::oauth::{AuthClient, TokenResponse};
use crate::token::{TokenStore, expiry_from_now};

/// Renews an access token with a refresh token.
///
/// Implemented by [`AuthClient`]; test code substitutes stubs.
pub trait TokenRefresher: Send + Sync {
    /// Perform one `grant_type=refresh_token` call.
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send;
}

impl TokenRefresher for AuthClient {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send {
        self.refresh_tokens(refresh_token)
    }
}

impl<T: TokenRefresher> TokenRefresher for Arc<T> {
    fn refresh(
        &self,
        refresh_token: &str,
    ) -> impl Future<Output = Result<TokenResponse, Error>> + Send {
        (**self).refresh(refresh_token)
    }
}

/// Outcome of one protected-API call, reduced to what the UI shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCallOutcome {
    /// HTTP status, absent when the request never produced a response.
    pub status: Option<StatusCode>,
    /// `"Success"` for 2xx, the reason phrase otherwise, or the transport
    /// error's description.
    pub display: String,
}

impl ApiCallOutcome {
    fn from_status(status: StatusCode) -> Self {
        Self {
            status: Some(status),
            display: display_status(status),
        }
    }

    fn from_error(error: &Error) -> Self {
        Self {
            status: None,
            display: error.to_string(),
        }
    }

    /// Whether the call reached the API and got a 2xx response.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_some_and(|s| s.is_success())
    }
}

/// Map an HTTP status to its display string.
///
/// This mapping is purely for display; callers needing structured error
/// handling should inspect the status code itself.
#[must_use]
pub fn display_status(status: StatusCode) -> String {
    if status.is_success() {
        "Success".into()
    } else {
        status.canonical_reason().unwrap_or("Unknown").into()
    }
}

/// Client for the protected API.
///
/// Holds an immutable `reqwest::Client`; bearer and `Accept` headers are
/// attached per request, never as shared default headers, so concurrent use
/// cannot leak one session's credentials into another's requests.
pub struct ApiClient<R, S> {
    http: reqwest::Client,
    refresher: R,
    tokens: S,
}

impl<R: TokenRefresher, S: TokenStore> ApiClient<R, S> {
    /// Create a client over the given refresher and session token store.
    #[must_use]
    pub fn new(refresher: R, tokens: S) -> Self {
        Self {
            http: reqwest::Client::new(),
            refresher,
            tokens,
        }
    }

    /// Use a custom HTTP client (for timeouts or connection pool reuse).
    ///
    /// Request timeouts are deliberately not hardcoded here; configure them
    /// on the client passed in.
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Ensure the session's access token is valid, refreshing it if expired.
    ///
    /// Returns `Ok(None)` for unauthenticated callers — their calls proceed
    /// without a token and the API's 401 becomes the call's status.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Refresh`] when the token is expired and renewal fails;
    /// the store is left untouched in that case.
    pub async fn ensure_fresh_token(&self) -> Result<Option<String>, Error> {
        let tokens = match self.tokens.get().await {
            Ok(tokens) => tokens,
            Err(Error::NotAuthenticated) => return Ok(None),
            Err(e) => return Err(e),
        };

        if !tokens.is_expired(OffsetDateTime::now_utc()) {
            return Ok(Some(tokens.access_token));
        }

        let refresh_token = tokens.refresh_token.as_deref().ok_or(Error::Refresh {
            status: None,
            detail: "access token expired and no refresh token is stored".into(),
        })?;

        let renewed = self.refresher.refresh(refresh_token).await?;
        let expires_at = expiry_from_now(OffsetDateTime::now_utc(), renewed.expires_in);
        self.tokens
            .update(renewed.access_token.clone(), expires_at)
            .await?;

        tracing::debug!("access token refreshed");
        Ok(Some(renewed.access_token))
    }

    /// Issue a request without a body.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on transport failure. A failed token refresh is
    /// logged and the call still goes out, unauthenticated.
    pub async fn send(&self, method: Method, url: &str) -> Result<reqwest::Response, Error> {
        let token = self.current_token().await;
        self.request(method, url, token.as_deref())
            .send()
            .await
            .map_err(Error::Http)
    }

    /// Issue a request with a JSON body.
    ///
    /// # Errors
    ///
    /// Same as [`send`](ApiClient::send).
    pub async fn send_json<T: Serialize + Sync>(
        &self,
        method: Method,
        url: &str,
        body: &T,
    ) -> Result<reqwest::Response, Error> {
        let token = self.current_token().await;
        self.request(method, url, token.as_deref())
            .json(body)
            .send()
            .await
            .map_err(Error::Http)
    }

    /// Call the API and reduce the result to a display outcome.
    ///
    /// Never fails: transport errors become the outcome's display string.
    pub async fn invoke(&self, method: Method, url: &str) -> ApiCallOutcome {
        Self::outcome(self.send(method, url).await)
    }

    /// Call the API with a JSON body and reduce the result to a display outcome.
    pub async fn invoke_json<T: Serialize + Sync>(
        &self,
        method: Method,
        url: &str,
        body: &T,
    ) -> ApiCallOutcome {
        Self::outcome(self.send_json(method, url, body).await)
    }

    /// Best-effort token for an outgoing call.
    ///
    /// A refresh failure does not abort the call, but a token known to be
    /// expired is never attached: the request goes out unauthenticated and
    /// the API's 401 is surfaced as the call's status.
    async fn current_token(&self) -> Option<String> {
        match self.ensure_fresh_token().await {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "proceeding without a token");
                None
            }
        }
    }

    fn request(&self, method: Method, url: &str, token: Option<&str>) -> RequestBuilder {
        let mut request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/json");
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        request
    }

    fn outcome(result: Result<reqwest::Response, Error>) -> ApiCallOutcome {
        match result {
            Ok(response) => ApiCallOutcome::from_status(response.status()),
            Err(e) => {
                tracing::warn!(error = %e, "API call failed before a response was received");
                ApiCallOutcome::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use time::Duration;

    use super::*;
    use crate::token::SessionTokens;

    /// In-memory token store standing in for a session ticket.
    struct StubStore {
        tokens: Mutex<Option<SessionTokens>>,
    }

    impl StubStore {
        fn holding(tokens: SessionTokens) -> Self {
            Self {
                tokens: Mutex::new(Some(tokens)),
            }
        }

        fn empty() -> Self {
            Self {
                tokens: Mutex::new(None),
            }
        }

        fn snapshot(&self) -> Option<SessionTokens> {
            self.tokens.lock().unwrap().clone()
        }
    }

    impl TokenStore for &StubStore {
        async fn get(&self) -> Result<SessionTokens, Error> {
            self.tokens
                .lock()
                .unwrap()
                .clone()
                .ok_or(Error::NotAuthenticated)
        }

        async fn update(
            &self,
            access_token: String,
            expires_at: OffsetDateTime,
        ) -> Result<(), Error> {
            let mut guard = self.tokens.lock().unwrap();
            let tokens = guard.as_mut().ok_or(Error::NotAuthenticated)?;
            tokens.access_token = access_token;
            tokens.expires_at = expires_at;
            Ok(())
        }
    }

    /// Counts calls; answers with a fixed response or a fixed failure.
    struct StubRefresher {
        calls: AtomicUsize,
        fail: bool,
    }

    impl StubRefresher {
        fn succeeding() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: false,
            }
        }

        fn failing() -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail: true,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl TokenRefresher for &StubRefresher {
        async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(refresh_token, "rt-1");
            if self.fail {
                return Err(Error::Refresh {
                    status: Some(403),
                    detail: "invalid_grant".into(),
                });
            }
            Ok(serde_json::from_str(
                r#"{"access_token":"new123","token_type":"Bearer","expires_in":3600}"#,
            )
            .unwrap())
        }
    }

    fn valid_tokens() -> SessionTokens {
        SessionTokens::new(
            "old-token",
            OffsetDateTime::now_utc() + Duration::hours(1),
            Some("rt-1".into()),
        )
    }

    fn expired_tokens() -> SessionTokens {
        SessionTokens::new(
            "old-token",
            OffsetDateTime::now_utc() - Duration::hours(1),
            Some("rt-1".into()),
        )
    }

    #[tokio::test]
    async fn fresh_token_is_used_without_refreshing() {
        let store = StubStore::holding(valid_tokens());
        let refresher = StubRefresher::succeeding();
        let client = ApiClient::new(&refresher, &store);

        let token = client.ensure_fresh_token().await.unwrap();

        assert_eq!(token.as_deref(), Some("old-token"));
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn expired_token_is_refreshed_exactly_once() {
        let store = StubStore::holding(expired_tokens());
        let refresher = StubRefresher::succeeding();
        let client = ApiClient::new(&refresher, &store);

        let token = client.ensure_fresh_token().await.unwrap();

        assert_eq!(token.as_deref(), Some("new123"));
        assert_eq!(refresher.calls(), 1);

        let stored = store.snapshot().unwrap();
        assert_eq!(stored.access_token, "new123");
        assert!(stored.expires_at > OffsetDateTime::now_utc());
    }

    #[tokio::test]
    async fn failed_refresh_leaves_the_store_unchanged() {
        let original = expired_tokens();
        let store = StubStore::holding(original.clone());
        let refresher = StubRefresher::failing();
        let client = ApiClient::new(&refresher, &store);

        let result = client.ensure_fresh_token().await;

        assert!(matches!(
            result,
            Err(Error::Refresh {
                status: Some(403),
                ..
            })
        ));
        assert_eq!(store.snapshot().unwrap(), original);
    }

    #[tokio::test]
    async fn unauthenticated_caller_gets_no_token_and_no_refresh() {
        let store = StubStore::empty();
        let refresher = StubRefresher::succeeding();
        let client = ApiClient::new(&refresher, &store);

        let token = client.ensure_fresh_token().await.unwrap();

        assert!(token.is_none());
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn expired_token_without_refresh_token_is_a_refresh_failure() {
        let mut tokens = expired_tokens();
        tokens.refresh_token = None;
        let store = StubStore::holding(tokens);
        let refresher = StubRefresher::succeeding();
        let client = ApiClient::new(&refresher, &store);

        assert!(matches!(
            client.ensure_fresh_token().await,
            Err(Error::Refresh { status: None, .. })
        ));
        assert_eq!(refresher.calls(), 0);
    }

    #[tokio::test]
    async fn expired_token_is_never_attached_when_refresh_fails() {
        let store = StubStore::holding(expired_tokens());
        let refresher = StubRefresher::failing();
        let client = ApiClient::new(&refresher, &store);

        // The call proceeds, but unauthenticated.
        let token = client.current_token().await;

        assert!(token.is_none());
    }

    #[tokio::test]
    async fn refreshed_token_rides_as_bearer_with_json_accept() {
        // End-to-end up to the wire: expired session, refresh yields new123,
        // the outgoing DELETE must carry it.
        let store = StubStore::holding(expired_tokens());
        let refresher = StubRefresher::succeeding();
        let client = ApiClient::new(&refresher, &store);

        let token = client.current_token().await;
        let request = client
            .request(
                Method::DELETE,
                "https://localhost:44374/api/game/5",
                token.as_deref(),
            )
            .build()
            .unwrap();

        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(
            request.headers().get("authorization").unwrap(),
            "Bearer new123"
        );
        assert_eq!(request.headers().get("accept").unwrap(), "application/json");
    }

    #[tokio::test]
    async fn unauthenticated_request_has_no_authorization_header() {
        let store = StubStore::empty();
        let refresher = StubRefresher::succeeding();
        let client = ApiClient::new(&refresher, &store);

        let token = client.current_token().await;
        let request = client
            .request(Method::GET, "https://localhost:44374/api/game", token.as_deref())
            .build()
            .unwrap();

        assert!(request.headers().get("authorization").is_none());
    }

    #[test]
    fn success_statuses_display_as_success() {
        assert_eq!(display_status(StatusCode::OK), "Success");
        assert_eq!(display_status(StatusCode::CREATED), "Success");
        assert_eq!(display_status(StatusCode::NO_CONTENT), "Success");
    }

    #[test]
    fn failure_statuses_display_the_reason_phrase() {
        assert_eq!(display_status(StatusCode::UNAUTHORIZED), "Unauthorized");
        assert_eq!(display_status(StatusCode::FORBIDDEN), "Forbidden");
        assert_eq!(display_status(StatusCode::NOT_FOUND), "Not Found");
        assert_eq!(
            display_status(StatusCode::INTERNAL_SERVER_ERROR),
            "Internal Server Error"
        );
    }

    #[test]
    fn outcome_reports_success_only_for_2xx() {
        let ok = ApiCallOutcome::from_status(StatusCode::NO_CONTENT);
        assert!(ok.is_success());
        assert_eq!(ok.display, "Success");

        let unauthorized = ApiCallOutcome::from_status(StatusCode::UNAUTHORIZED);
        assert!(!unauthorized.is_success());
        assert_eq!(unauthorized.display, "Unauthorized");
    }

    #[test]
    fn transport_errors_become_a_display_string() {
        let outcome = ApiCallOutcome::from_error(&Error::NotAuthenticated);
        assert!(outcome.status.is_none());
        assert!(!outcome.is_success());
        assert_eq!(outcome.display, "not authenticated");
    }
}
