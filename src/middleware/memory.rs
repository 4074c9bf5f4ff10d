use std::collections::HashMap;
use std::sync::Arc;

use time::{OffsetDateTime, UtcOffset};
use tokio::sync::RwLock;
use ulid::Ulid;

use super::traits::{BoxError, SessionStore};
use super::types::{NewSession, Session, SessionId};

/// In-memory session store for demos and tests.
///
/// Sessions live until deleted or the process exits; production apps back
/// [`SessionStore`] with real storage instead.
#[derive(Debug, Clone, Default)]
pub struct MemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Session>>>,
}

impl MemorySessionStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live sessions.
    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl SessionStore for MemorySessionStore {
    async fn create(&self, session: NewSession) -> Result<SessionId, BoxError> {
        let id = SessionId(Ulid::new().to_string());
        let mut sessions = self.sessions.write().await;
        sessions.insert(
            id.clone(),
            Session {
                claims: session.claims,
                tokens: session.tokens,
                user_agent: session.user_agent,
                ip_address: session.ip_address,
                created_at: OffsetDateTime::now_utc(),
            },
        );
        Ok(id)
    }

    async fn find(&self, session_id: &SessionId) -> Result<Option<Session>, BoxError> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(session_id).cloned())
    }

    async fn update_tokens(
        &self,
        session_id: &SessionId,
        access_token: String,
        expires_at: OffsetDateTime,
    ) -> Result<(), BoxError> {
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .get_mut(session_id)
            .ok_or_else(|| BoxError::from(format!("unknown session {session_id}")))?;
        session.tokens.access_token = access_token;
        session.tokens.expires_at = expires_at.to_offset(UtcOffset::UTC);
        Ok(())
    }

    async fn delete(&self, session_id: &SessionId) -> Result<(), BoxError> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(session_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use time::Duration;

    use super::*;
    use crate::token::SessionTokens;

    fn new_session() -> NewSession {
        NewSession {
            claims: [("name".to_string(), "Alice Doe".to_string())]
                .into_iter()
                .collect(),
            tokens: SessionTokens::new(
                "access-1",
                OffsetDateTime::now_utc() + Duration::hours(1),
                Some("rt-1".into()),
            ),
            user_agent: Some("test-agent".into()),
            ip_address: None,
        }
    }

    #[tokio::test]
    async fn created_sessions_are_findable() {
        let store = MemorySessionStore::new();
        let id = store.create(new_session()).await.unwrap();

        let session = store.find(&id).await.unwrap().unwrap();
        assert_eq!(session.tokens.access_token, "access-1");
        assert_eq!(session.claims["name"], "Alice Doe");
    }

    #[tokio::test]
    async fn session_ids_are_unique() {
        let store = MemorySessionStore::new();
        let a = store.create(new_session()).await.unwrap();
        let b = store.create(new_session()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn updated_tokens_are_observed_by_subsequent_finds() {
        let store = MemorySessionStore::new();
        let id = store.create(new_session()).await.unwrap();
        let new_expiry = OffsetDateTime::now_utc() + Duration::hours(2);

        store
            .update_tokens(&id, "access-2".into(), new_expiry)
            .await
            .unwrap();

        let session = store.find(&id).await.unwrap().unwrap();
        assert_eq!(session.tokens.access_token, "access-2");
        assert_eq!(session.tokens.expires_at, new_expiry);
        // refresh token survives the update
        assert_eq!(session.tokens.refresh_token.as_deref(), Some("rt-1"));
    }

    #[tokio::test]
    async fn updating_an_unknown_session_fails() {
        let store = MemorySessionStore::new();
        let result = store
            .update_tokens(
                &SessionId("missing".into()),
                "x".into(),
                OffsetDateTime::now_utc(),
            )
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn deleted_sessions_are_gone() {
        let store = MemorySessionStore::new();
        let id = store.create(new_session()).await.unwrap();

        store.delete(&id).await.unwrap();

        assert!(store.find(&id).await.unwrap().is_none());
        // deleting again is not an error
        store.delete(&id).await.unwrap();
    }
}
