//! Cookie-backed session middleware for Axum.
//!
//! Wires the token lifecycle into a web app: login redirects the browser to
//! the identity provider, the callback exchanges the code and creates a
//! session holding the claims and tokens, and the [`AuthSession`] extractor
//! gives handlers access to both.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use gamelib_auth::middleware::{auth_routes, MemorySessionStore, WebAuthConfig};
//!
//! let config = WebAuthConfig::from_env()?;
//! let store = MemorySessionStore::new();
//! let app = axum::Router::new()
//!     .merge(auth_routes(config, store));
//! ```
//!
//! Handlers mounted with the same [`AuthState`] call the protected API via
//! `state.api_client(&session.session_id)`, which reads and refreshes the
//! session's tokens transparently.

mod config;
mod cookies;
mod error;
mod extractor;
mod memory;
mod routes;
mod state;
mod tokens;
mod traits;
mod types;

pub use config::WebAuthConfig;
pub use error::AuthError;
pub use extractor::AuthSession;
pub use memory::MemorySessionStore;
pub use routes::auth_routes;
pub use state::AuthState;
pub use tokens::SessionTokenAccess;
pub use traits::{BoxError, SessionStore};
pub use types::{NewSession, Session, SessionId};

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
