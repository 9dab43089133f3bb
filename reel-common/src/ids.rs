//! Validated identifier newtypes
//!
//! Identity and profile ids are interpolated into queries and change-feed
//! filters, so both are parse-validated up front. Malformed ids fail with
//! `Error::Validation` before anything is sent to a backend.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Length of an auth-provider user id (fixed-length alphanumeric)
pub const USER_ID_LEN: usize = 28;

/// Auth-provider identity id: exactly 28 ASCII alphanumeric characters
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    pub fn parse(s: &str) -> Result<Self> {
        if s.len() != USER_ID_LEN || !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::Validation(format!(
                "user id must be {} alphanumeric characters",
                USER_ID_LEN
            )));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for UserId {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        Self::parse(&s)
    }
}

impl From<UserId> for String {
    fn from(id: UserId) -> String {
        id.0
    }
}

/// Persistent-store profile id: canonical UUID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(Uuid);

impl ProfileId {
    /// Generate a new random profile id
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn parse(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| Error::Validation("profile id must be a canonical UUID".to_string()))
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
