use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use time::Duration;

const STATE_COOKIE_NAME: &str = "__gamelib_oauth_state";

/// Generate the random CSRF `state` parameter for an authorization request.
///
/// 16 random bytes, base64url: 22 URL-safe characters.
pub(super) fn generate_state() -> String {
    let random_bytes: [u8; 16] = rand::rng().random();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Cookie holding the `state` value between login and callback.
pub(super) fn state_cookie(state: &str, secure: bool, auth_path: &str) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE_NAME, state.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path(auth_path.to_string())
        .max_age(Duration::minutes(10))
        .build()
}

/// Removal cookie for the state value.
pub(super) fn clear_state_cookie(auth_path: &str) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE_NAME, ""))
        .path(auth_path.to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Session cookie carrying the opaque session ID.
pub(super) fn session_cookie(
    name: &str,
    session_id: &str,
    ttl_days: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), session_id.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::days(ttl_days))
        .build()
}

/// Removal cookie for the session.
pub(super) fn clear_session_cookie(name: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Read the stored `state` value back out of the jar.
pub(super) fn get_state(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(STATE_COOKIE_NAME).map(|c| c.value().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_values_are_unique_and_url_safe() {
        let a = generate_state();
        let b = generate_state();

        assert_ne!(a, b);
        assert_eq!(a.len(), 22);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn session_cookie_is_scoped_and_http_only() {
        let cookie = session_cookie("__gamelib_session", "sess-1", 30, true);

        assert_eq!(cookie.name(), "__gamelib_session");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::days(30)));
    }

    #[test]
    fn state_cookie_is_confined_to_the_auth_path() {
        let cookie = state_cookie("xyz", true, "/auth");
        assert_eq!(cookie.path(), Some("/auth"));
        assert_eq!(cookie.max_age(), Some(Duration::minutes(10)));
    }

    #[test]
    fn clear_cookies_expire_immediately() {
        assert_eq!(clear_state_cookie("/auth").max_age(), Some(Duration::ZERO));
        assert_eq!(
            clear_session_cookie("__gamelib_session").max_age(),
            Some(Duration::ZERO)
        );
    }
}
