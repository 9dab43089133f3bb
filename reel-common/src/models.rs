//! Domain models
//!
//! Records mirror the backing tables one-to-one. Timestamps are UTC and
//! persisted as RFC 3339 text.

use crate::{Error, ProfileId, Result, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Watched fraction at or above which a progress record counts as completed
pub const COMPLETION_THRESHOLD: f64 = 0.9;

/// Content kind tag for catalog items and per-profile records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Movie,
    Series,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Movie => "movie",
            ContentType::Series => "series",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "movie" => Ok(ContentType::Movie),
            "series" => Ok(ContentType::Series),
            other => Err(Error::Validation(format!("unknown content type: {other}"))),
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Age-rating tag on a viewing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeRating {
    Kids,
    Teen,
    Adult,
}

impl AgeRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeRating::Kids => "kids",
            AgeRating::Teen => "teen",
            AgeRating::Adult => "adult",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "kids" => Ok(AgeRating::Kids),
            "teen" => Ok(AgeRating::Teen),
            "adult" => Ok(AgeRating::Adult),
            other => Err(Error::Validation(format!("unknown age rating: {other}"))),
        }
    }
}

/// Authenticated end-user account, mirrored from the external auth provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub uid: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub email_verified: bool,
}

/// Named viewing persona under one identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub user_id: UserId,
    pub name: String,
    pub avatar: String,
    pub age_rating: AgeRating,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied when creating a profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewProfile {
    pub name: String,
    pub avatar: String,
    pub age_rating: AgeRating,
}

/// Partial update of an existing profile; `None` fields keep their value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub age_rating: Option<AgeRating>,
}

/// Saved intent-to-watch record for one profile and one content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchlistItem {
    pub id: Uuid,
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub content_id: u32,
    pub content_type: ContentType,
    pub added_at: DateTime<Utc>,
}

impl WatchlistItem {
    /// True when this entry refers to the given content item
    pub fn matches(&self, content_id: u32, content_type: ContentType) -> bool {
        self.content_id == content_id && self.content_type == content_type
    }
}

/// Natural composite key for a viewing-progress record
///
/// Season and episode are present together for episodic content and absent
/// for movies; the pair is part of the key either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProgressKey {
    pub content_id: u32,
    pub content_type: ContentType,
    pub season: Option<u32>,
    pub episode: Option<u32>,
}

/// Last-known playback position for one profile and one content item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewingProgress {
    pub id: Uuid,
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub content_id: u32,
    pub content_type: ContentType,
    pub elapsed_secs: f64,
    pub duration_secs: f64,
    pub season: Option<u32>,
    pub episode: Option<u32>,
    /// Derived at write time from elapsed/duration; never recomputed on read
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl ViewingProgress {
    /// Build a record from a playback heartbeat, deriving the completed flag
    #[allow(clippy::too_many_arguments)]
    pub fn from_heartbeat(
        user_id: UserId,
        profile_id: ProfileId,
        key: ProgressKey,
        elapsed_secs: f64,
        duration_secs: f64,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            profile_id,
            content_id: key.content_id,
            content_type: key.content_type,
            elapsed_secs,
            duration_secs,
            season: key.season,
            episode: key.episode,
            completed: is_complete(elapsed_secs, duration_secs),
            updated_at: at,
        }
    }

    pub fn key(&self) -> ProgressKey {
        ProgressKey {
            content_id: self.content_id,
            content_type: self.content_type,
            season: self.season,
            episode: self.episode,
        }
    }
}

/// Completion check applied when a progress record is written
pub fn is_complete(elapsed_secs: f64, duration_secs: f64) -> bool {
    duration_secs > 0.0 && elapsed_secs / duration_secs >= COMPLETION_THRESHOLD
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::parse("aB3dEfGhIjKlMnOpQrStUvWxYz12").unwrap()
    }

    #[test]
    fn content_type_round_trips() {
        assert_eq!(ContentType::parse("movie").unwrap(), ContentType::Movie);
        assert_eq!(ContentType::parse("series").unwrap(), ContentType::Series);
        assert!(ContentType::parse("tv").is_err());
    }

    #[test]
    fn completion_derived_at_write_time() {
        let key = ProgressKey {
            content_id: 42,
            content_type: ContentType::Movie,
            season: None,
            episode: None,
        };
        let almost = ViewingProgress::from_heartbeat(
            user(),
            ProfileId::generate(),
            key,
            89.0,
            100.0,
            Utc::now(),
        );
        assert!(!almost.completed);

        let done = ViewingProgress::from_heartbeat(
            user(),
            ProfileId::generate(),
            key,
            90.0,
            100.0,
            Utc::now(),
        );
        assert!(done.completed);
    }

    #[test]
    fn zero_duration_never_completes() {
        assert!(!is_complete(10.0, 0.0));
    }
}
