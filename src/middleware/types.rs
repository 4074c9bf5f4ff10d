use std::collections::HashMap;

use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::token::SessionTokens;

/// Opaque session identifier, held by the browser in a private cookie.
///
/// The store chooses the format (ULID, UUID, database key, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct SessionId(pub String);

/// Data captured at a successful login, passed to
/// [`SessionStore::create`](super::SessionStore::create).
#[derive(Debug, Clone)]
pub struct NewSession {
    /// Identity claims from the provider's userinfo endpoint.
    pub claims: HashMap<String, String>,
    /// Access/refresh tokens issued alongside the login.
    pub tokens: SessionTokens,
    /// Client `User-Agent` header value.
    pub user_agent: Option<String>,
    /// Client IP address.
    pub ip_address: Option<String>,
}

/// A stored session as returned by [`SessionStore::find`](super::SessionStore::find).
#[derive(Debug, Clone)]
pub struct Session {
    pub claims: HashMap<String, String>,
    pub tokens: SessionTokens,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
    pub created_at: OffsetDateTime,
}
