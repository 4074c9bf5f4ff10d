use std::future::Future;

use time::OffsetDateTime;

use super::types::{NewSession, Session, SessionId};

/// Error type session stores report through.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Consumer-provided session persistence.
///
/// One session is read and written sequentially within a request, so
/// implementations need no per-session locking beyond what their backing
/// storage already provides. [`MemorySessionStore`](super::MemorySessionStore)
/// is a ready-made in-memory implementation.
///
/// # Example
///
/// ```rust,ignore
/// impl SessionStore for MyDb {
///     async fn create(&self, session: NewSession) -> Result<SessionId, BoxError> {
///         let id = SessionId(Ulid::new().to_string());
///         self.insert_session(&id, &session).await?;
///         Ok(id)
///     }
///     // ...
/// }
/// ```
pub trait SessionStore: Send + Sync + 'static {
    /// Persist a new session. Returns its ID.
    fn create(
        &self,
        session: NewSession,
    ) -> impl Future<Output = Result<SessionId, BoxError>> + Send;

    /// Look up a session by ID; `None` if it does not exist or has lapsed.
    fn find(
        &self,
        session_id: &SessionId,
    ) -> impl Future<Output = Result<Option<Session>, BoxError>> + Send;

    /// Replace the session's access token and expiry after a refresh.
    fn update_tokens(
        &self,
        session_id: &SessionId,
        access_token: String,
        expires_at: OffsetDateTime,
    ) -> impl Future<Output = Result<(), BoxError>> + Send;

    /// Remove a session (logout).
    fn delete(&self, session_id: &SessionId) -> impl Future<Output = Result<(), BoxError>> + Send;
}
