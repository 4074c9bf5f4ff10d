//! Projection of identity claims into the displayable user profile.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::Error;

/// Claim keys required to build a [`Profile`].
pub mod claim {
    /// Short display handle.
    pub const NICKNAME: &str = "nickname";
    /// Avatar URL.
    pub const PICTURE: &str = "picture";
    /// Full display name.
    pub const NAME: &str = "name";
    /// Stable subject identifier.
    pub const NAME_IDENTIFIER: &str =
        "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/nameidentifier";
    /// Role granted by the identity provider.
    pub const ROLE: &str = "http://schemas.microsoft.com/ws/2008/06/identity/claims/roles";
    /// Application-specific role description.
    pub const ROLE_DESCRIPTION: &str = "https://gamelib.app/roleDescription";
}

/// Read-only projection of a session's identity claims, plus the outcome of
/// the most recent API call.
///
/// Recomputed on every page render; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[non_exhaustive]
pub struct Profile {
    pub nickname: String,
    pub picture: String,
    pub name: String,
    pub name_identifier: String,
    pub role: String,
    pub role_description: String,
    /// Display string from the last protected-API call; empty if none was made.
    pub api_call_status: String,
}

impl Profile {
    /// Build a profile from the session's claims.
    ///
    /// Field values are copied verbatim from the corresponding claims.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingClaim`] naming the first absent required key.
    pub fn from_claims(claims: &HashMap<String, String>) -> Result<Self, Error> {
        Ok(Self {
            nickname: required(claims, claim::NICKNAME)?,
            picture: required(claims, claim::PICTURE)?,
            name: required(claims, claim::NAME)?,
            name_identifier: required(claims, claim::NAME_IDENTIFIER)?,
            role: required(claims, claim::ROLE)?,
            role_description: required(claims, claim::ROLE_DESCRIPTION)?,
            api_call_status: String::new(),
        })
    }

    /// Attach the display status of the most recent API call.
    #[must_use]
    pub fn with_api_status(mut self, status: impl Into<String>) -> Self {
        self.api_call_status = status.into();
        self
    }
}

fn required(claims: &HashMap<String, String>, key: &'static str) -> Result<String, Error> {
    claims.get(key).cloned().ok_or(Error::MissingClaim(key))
}
