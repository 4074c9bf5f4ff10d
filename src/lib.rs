#![doc = include_str!("../README.md")]

pub mod claims;
pub mod error;
#[cfg(feature = "client")]
pub mod games;
#[cfg(feature = "axum")]
pub mod middleware;
#[cfg(feature = "client")]
pub mod oauth;
#[cfg(feature = "client")]
pub mod pipeline;
pub mod token;

// Re-exports for convenient access
pub use claims::Profile;
pub use error::Error;
#[cfg(feature = "client")]
pub use games::{Game, GameApi};
#[cfg(feature = "client")]
pub use oauth::{AuthClient, OAuthConfig, TokenResponse};
#[cfg(feature = "client")]
pub use pipeline::{ApiCallOutcome, ApiClient, TokenRefresher, display_status};
pub use token::{SessionTokens, TokenStore};
