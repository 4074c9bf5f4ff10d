//! Typed client for the protected Game API.
//!
//! The API enforces its own role-based authorization (`read` for listing,
//! `write` for creation, `delete` for removal); this client only attaches the
//! session's bearer token and reports the outcome.

use reqwest::Method;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::pipeline::{ApiCallOutcome, ApiClient, TokenRefresher};
use crate::token::TokenStore;

/// A game record as the API understands it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: u32,
    pub title: String,
    pub genre: String,
    pub cost: f64,
}

/// Game API endpoints over the authenticated pipeline.
pub struct GameApi<R, S> {
    client: ApiClient<R, S>,
    base_url: Url,
}

impl<R: TokenRefresher, S: TokenStore> GameApi<R, S> {
    /// Create a client for the API at `base_url`.
    #[must_use]
    pub fn new(client: ApiClient<R, S>, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// `GET /api/game` — list games (requires the `read` role).
    pub async fn list(&self) -> ApiCallOutcome {
        self.client.invoke(Method::GET, &self.games_url()).await
    }

    /// `POST /api/game` — create a game (requires the `write` role).
    pub async fn create(&self, game: &Game) -> ApiCallOutcome {
        self.client
            .invoke_json(Method::POST, &self.games_url(), game)
            .await
    }

    /// `DELETE /api/game/{id}` — remove a game (requires the `delete` role).
    pub async fn delete(&self, id: u32) -> ApiCallOutcome {
        self.client.invoke(Method::DELETE, &self.game_url(id)).await
    }

    fn games_url(&self) -> String {
        format!("{}/api/game", self.base_url.as_str().trim_end_matches('/'))
    }

    fn game_url(&self, id: u32) -> String {
        format!("{}/{id}", self.games_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::oauth::TokenResponse;
    use crate::token::SessionTokens;
    use time::OffsetDateTime;

    struct NoSession;

    impl TokenStore for NoSession {
        async fn get(&self) -> Result<SessionTokens, Error> {
            Err(Error::NotAuthenticated)
        }

        async fn update(&self, _: String, _: OffsetDateTime) -> Result<(), Error> {
            Err(Error::NotAuthenticated)
        }
    }

    struct NoRefresh;

    impl TokenRefresher for NoRefresh {
        async fn refresh(&self, _: &str) -> Result<TokenResponse, Error> {
            unreachable!("no session, nothing to refresh")
        }
    }

    fn api(base: &str) -> GameApi<NoRefresh, NoSession> {
        GameApi::new(
            ApiClient::new(NoRefresh, NoSession),
            base.parse().unwrap(),
        )
    }

    #[test]
    fn collection_url_is_stable_with_or_without_trailing_slash() {
        assert_eq!(
            api("https://localhost:44374").games_url(),
            "https://localhost:44374/api/game"
        );
        assert_eq!(
            api("https://localhost:44374/").games_url(),
            "https://localhost:44374/api/game"
        );
    }

    #[test]
    fn item_url_appends_the_id() {
        assert_eq!(
            api("https://localhost:44374").game_url(5),
            "https://localhost:44374/api/game/5"
        );
    }

    #[test]
    fn game_serializes_with_the_api_field_names() {
        let game = Game {
            id: 6,
            title: "Test Game".into(),
            genre: "puzzle".into(),
            cost: 59.99,
        };
        let json = serde_json::to_value(&game).unwrap();

        assert_eq!(json["id"], 6);
        assert_eq!(json["title"], "Test Game");
        assert_eq!(json["genre"], "puzzle");
        assert_eq!(json["cost"], 59.99);
    }
}
