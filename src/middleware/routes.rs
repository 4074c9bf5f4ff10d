use axum::Router;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, header::USER_AGENT};
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use time::OffsetDateTime;

use super::config::WebAuthConfig;
use super::cookies;
use super::state::AuthState;
use super::traits::SessionStore;
use super::types::NewSession;
use crate::token::{SessionTokens, expiry_from_now};

/// Create the authentication router: `{auth_path}/login`,
/// `{auth_path}/callback` and `{auth_path}/logout`.
pub fn auth_routes<S: SessionStore>(config: WebAuthConfig, sessions: S) -> Router {
    let auth_path = config.settings.auth_path.clone();
    let state = AuthState::new(config, sessions);

    Router::new()
        .route(&format!("{auth_path}/login"), get(login::<S>))
        .route(&format!("{auth_path}/callback"), get(callback::<S>))
        .route(
            &format!("{auth_path}/logout"),
            get(logout::<S>).post(logout::<S>),
        )
        .with_state(state)
}

// ── Login ──────────────────────────────────────────────────────────

async fn login<S: SessionStore>(
    State(state): State<AuthState<S>>,
    jar: PrivateCookieJar,
) -> Result<(PrivateCookieJar, Redirect), Response> {
    let csrf_state = cookies::generate_state();

    let url = state
        .client
        .authorization_url(&csrf_state)
        .map_err(|e| {
            tracing::error!(error = %e, "Cannot build authorization URL");
            login_error(&state.settings.error_redirect, "misconfigured")
        })?;

    let cookie = cookies::state_cookie(
        &csrf_state,
        state.settings.secure_cookies,
        &state.settings.auth_path,
    );

    Ok((jar.add(cookie), Redirect::to(&url)))
}

// ── Callback ───────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

async fn callback<S: SessionStore>(
    State(state): State<AuthState<S>>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<(PrivateCookieJar, Redirect), Response> {
    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or("Unknown error");
        tracing::warn!(error = %error, description = %desc, "OAuth2 error from identity provider");
        return Err(login_error(&state.settings.error_redirect, desc));
    }

    let code = params
        .code
        .ok_or_else(|| login_error(&state.settings.error_redirect, "missing_code"))?;

    let received_state = params
        .state
        .ok_or_else(|| login_error(&state.settings.error_redirect, "state_mismatch"))?;

    let stored_state = cookies::get_state(&jar)
        .ok_or_else(|| login_error(&state.settings.error_redirect, "state_mismatch"))?;

    if received_state != stored_state {
        tracing::warn!("OAuth state mismatch");
        return Err(login_error(&state.settings.error_redirect, "state_mismatch"));
    }

    let token_response = state.client.exchange_code(&code).await.map_err(|e| {
        tracing::error!(error = %e, "Code exchange failed");
        login_error(&state.settings.error_redirect, "token_exchange_failed")
    })?;

    let claims = state
        .client
        .user_claims(&token_response.access_token)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Userinfo request failed");
            login_error(&state.settings.error_redirect, "userinfo_failed")
        })?;

    let expires_at = expiry_from_now(OffsetDateTime::now_utc(), token_response.expires_in);
    let session = NewSession {
        claims,
        tokens: SessionTokens::new(
            token_response.access_token,
            expires_at,
            token_response.refresh_token,
        ),
        user_agent: extract_user_agent(&headers),
        ip_address: extract_client_ip(&headers),
    };

    let session_id = state.sessions.create(session).await.map_err(|e| {
        tracing::error!(error = %e, "Session creation failed");
        login_error(&state.settings.error_redirect, "session_failed")
    })?;

    let session_cookie = cookies::session_cookie(
        &state.settings.session_cookie_name,
        &session_id.to_string(),
        state.settings.session_ttl_days,
        state.settings.secure_cookies,
    );

    let jar = jar
        .add(session_cookie)
        .add(cookies::clear_state_cookie(&state.settings.auth_path));

    tracing::info!(session_id = %session_id, "OAuth2 login successful");

    Ok((jar, Redirect::to(&state.settings.login_redirect)))
}

// ── Logout ─────────────────────────────────────────────────────────

async fn logout<S: SessionStore>(
    State(state): State<AuthState<S>>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Redirect) {
    if let Some(cookie) = jar.get(&state.settings.session_cookie_name) {
        let session_id = super::types::SessionId(cookie.value().to_string());
        if let Err(e) = state.sessions.delete(&session_id).await {
            tracing::warn!(error = %e, "Session deletion failed during logout");
        } else {
            tracing::info!(session_id = %session_id, "Logged out");
        }
    }

    let clear_cookie = cookies::clear_session_cookie(&state.settings.session_cookie_name);
    (
        jar.remove(clear_cookie),
        Redirect::to(&state.settings.logout_redirect),
    )
}

// ── Helpers ────────────────────────────────────────────────────────

fn login_error(error_redirect: &str, code: &str) -> Response {
    let encoded = urlencoding::encode(code);
    Redirect::to(&format!("{error_redirect}?error={encoded}")).into_response()
}

fn extract_user_agent(headers: &HeaderMap) -> Option<String> {
    headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim().to_string())
        .or_else(|| {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
        })
}
