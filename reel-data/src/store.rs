//! Persistence operations
//!
//! All identifiers arrive as validated newtypes and free text is sanitized
//! before it reaches a query. Backend errors propagate unmodified; the one
//! exception is single-row lookups, where "no row" becomes `None` (or
//! `false`) rather than an error. Successful watchlist/progress writes are
//! echoed on the change feed.

use crate::realtime::{ChangeFeed, ScopedChange};
use crate::schema;
use chrono::{DateTime, Utc};
use reel_common::events::RowChange;
use reel_common::sanitize::{sanitize_profile_name, validate_content_id};
use reel_common::{
    AgeRating, ContentType, Error, Profile, ProfileId, ProgressKey, Result, UserId,
    ViewingProgress, WatchlistItem,
};
use reel_common::models::{NewProfile, ProfileUpdate};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use uuid::Uuid;

/// Sentinel stored in place of NULL season/episode so the upsert key is total
const NO_EPISODE: i64 = -1;

fn to_sentinel(value: Option<u32>) -> i64 {
    value.map(i64::from).unwrap_or(NO_EPISODE)
}

fn from_sentinel(value: i64) -> Option<u32> {
    u32::try_from(value).ok()
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("invalid stored timestamp: {e}")))
}

fn parse_row_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| Error::Internal(format!("invalid stored id: {e}")))
}

/// Typed data store over SQLite, with a change feed for subscribed tables
pub struct DataStore {
    pool: SqlitePool,
    feed: ChangeFeed,
}

impl DataStore {
    /// Connect to a database URL and ensure the schema exists
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;
        schema::init_schema(&pool).await?;
        Ok(Self {
            pool,
            feed: ChangeFeed::new(),
        })
    }

    /// Open (creating if needed) a database file
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Self::connect(&format!("sqlite://{}?mode=rwc", path.display())).await
    }

    /// In-memory database, used by tests and ephemeral sessions
    pub async fn in_memory() -> Result<Self> {
        Self::connect("sqlite::memory:").await
    }

    /// Change feed for real-time subscriptions
    pub fn feed(&self) -> &ChangeFeed {
        &self.feed
    }

    // ---- profiles ----

    /// All profiles for an identity, oldest first
    pub async fn profiles(&self, user_id: &UserId) -> Result<Vec<Profile>> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, avatar, age_rating, created_at, updated_at
             FROM profiles WHERE user_id = ? ORDER BY created_at ASC",
        )
        .bind(user_id.as_str())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_profile).collect()
    }

    pub async fn create_profile(&self, user_id: &UserId, new: NewProfile) -> Result<Profile> {
        let name = sanitize_profile_name(&new.name)?;
        let now = Utc::now();
        let profile = Profile {
            id: ProfileId::generate(),
            user_id: user_id.clone(),
            name,
            avatar: new.avatar,
            age_rating: new.age_rating,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            "INSERT INTO profiles (id, user_id, name, avatar, age_rating, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(profile.id.to_string())
        .bind(profile.user_id.as_str())
        .bind(&profile.name)
        .bind(&profile.avatar)
        .bind(profile.age_rating.as_str())
        .bind(profile.created_at.to_rfc3339())
        .bind(profile.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        tracing::info!(profile = %profile.id, "profile created");
        Ok(profile)
    }

    pub async fn update_profile(
        &self,
        profile_id: ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile> {
        let row = sqlx::query(
            "SELECT id, user_id, name, avatar, age_rating, created_at, updated_at
             FROM profiles WHERE id = ?",
        )
        .bind(profile_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let mut profile = match row {
            Some(row) => map_profile(&row)?,
            None => return Err(Error::NotFound(format!("profile {profile_id}"))),
        };

        if let Some(name) = update.name {
            profile.name = sanitize_profile_name(&name)?;
        }
        if let Some(avatar) = update.avatar {
            profile.avatar = avatar;
        }
        if let Some(age_rating) = update.age_rating {
            profile.age_rating = age_rating;
        }
        profile.updated_at = Utc::now();

        sqlx::query(
            "UPDATE profiles SET name = ?, avatar = ?, age_rating = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&profile.name)
        .bind(&profile.avatar)
        .bind(profile.age_rating.as_str())
        .bind(profile.updated_at.to_rfc3339())
        .bind(profile.id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(profile)
    }

    /// Delete a profile and its per-profile records
    pub async fn delete_profile(&self, profile_id: ProfileId) -> Result<()> {
        let id = profile_id.to_string();
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM watchlist WHERE profile_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM viewing_progress WHERE profile_id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM profiles WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(profile = %profile_id, "profile deleted");
        Ok(())
    }

    // ---- watchlist ----

    /// Watchlist for one (identity, profile) pair, newest first
    pub async fn watchlist(
        &self,
        user_id: &UserId,
        profile_id: ProfileId,
    ) -> Result<Vec<WatchlistItem>> {
        let rows = sqlx::query(
            "SELECT id, user_id, profile_id, content_id, content_type, added_at
             FROM watchlist WHERE user_id = ? AND profile_id = ? ORDER BY added_at DESC",
        )
        .bind(user_id.as_str())
        .bind(profile_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_watchlist_item).collect()
    }

    pub async fn add_watchlist(
        &self,
        user_id: &UserId,
        profile_id: ProfileId,
        content_id: u32,
        content_type: ContentType,
    ) -> Result<WatchlistItem> {
        let content_id = validate_content_id(content_id)?;
        let item = WatchlistItem {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            profile_id,
            content_id,
            content_type,
            added_at: Utc::now(),
        };

        sqlx::query(
            "INSERT INTO watchlist (id, user_id, profile_id, content_id, content_type, added_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(item.id.to_string())
        .bind(item.user_id.as_str())
        .bind(item.profile_id.to_string())
        .bind(i64::from(item.content_id))
        .bind(item.content_type.as_str())
        .bind(item.added_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        self.feed.publish_watchlist(ScopedChange {
            user_id: user_id.clone(),
            profile_id,
            change: RowChange::Inserted(item.clone()),
        });
        Ok(item)
    }

    /// Remove a watchlist entry; removing an absent entry is a no-op
    pub async fn remove_watchlist(
        &self,
        user_id: &UserId,
        profile_id: ProfileId,
        content_id: u32,
        content_type: ContentType,
    ) -> Result<()> {
        let content_id = validate_content_id(content_id)?;
        let row = sqlx::query(
            "SELECT id, user_id, profile_id, content_id, content_type, added_at
             FROM watchlist
             WHERE user_id = ? AND profile_id = ? AND content_id = ? AND content_type = ?",
        )
        .bind(user_id.as_str())
        .bind(profile_id.to_string())
        .bind(i64::from(content_id))
        .bind(content_type.as_str())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(());
        };
        let item = map_watchlist_item(&row)?;

        sqlx::query("DELETE FROM watchlist WHERE id = ?")
            .bind(item.id.to_string())
            .execute(&self.pool)
            .await?;

        self.feed.publish_watchlist(ScopedChange {
            user_id: user_id.clone(),
            profile_id,
            change: RowChange::Deleted(item),
        });
        Ok(())
    }

    /// Single-row membership lookup; no row means `false`, not an error
    pub async fn in_watchlist(
        &self,
        user_id: &UserId,
        profile_id: ProfileId,
        content_id: u32,
        content_type: ContentType,
    ) -> Result<bool> {
        let row = sqlx::query(
            "SELECT id FROM watchlist
             WHERE user_id = ? AND profile_id = ? AND content_id = ? AND content_type = ?",
        )
        .bind(user_id.as_str())
        .bind(profile_id.to_string())
        .bind(i64::from(content_id))
        .bind(content_type.as_str())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.is_some())
    }

    // ---- viewing progress ----

    /// Incomplete progress records for one pair, most recent first
    pub async fn progress(
        &self,
        user_id: &UserId,
        profile_id: ProfileId,
    ) -> Result<Vec<ViewingProgress>> {
        let rows = sqlx::query(
            "SELECT id, user_id, profile_id, content_id, content_type, elapsed_secs,
                    duration_secs, season, episode, completed, updated_at
             FROM viewing_progress
             WHERE user_id = ? AND profile_id = ? AND completed = 0
             ORDER BY updated_at DESC",
        )
        .bind(user_id.as_str())
        .bind(profile_id.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_progress).collect()
    }

    /// Upsert a progress record on its composite natural key
    ///
    /// Repeated heartbeats for the same viewing session overwrite in place;
    /// the row id of the first write is kept.
    pub async fn save_progress(
        &self,
        user_id: &UserId,
        profile_id: ProfileId,
        key: ProgressKey,
        elapsed_secs: f64,
        duration_secs: f64,
    ) -> Result<ViewingProgress> {
        validate_content_id(key.content_id)?;
        if key.season.is_some() != key.episode.is_some() {
            return Err(Error::Validation(
                "season and episode must be provided together".to_string(),
            ));
        }
        if !(elapsed_secs.is_finite() && duration_secs.is_finite())
            || elapsed_secs < 0.0
            || duration_secs <= 0.0
        {
            return Err(Error::Validation(
                "elapsed and duration must be positive seconds".to_string(),
            ));
        }

        let existing: Option<String> = sqlx::query_scalar(
            "SELECT id FROM viewing_progress
             WHERE user_id = ? AND profile_id = ? AND content_id = ? AND content_type = ?
               AND season = ? AND episode = ?",
        )
        .bind(user_id.as_str())
        .bind(profile_id.to_string())
        .bind(i64::from(key.content_id))
        .bind(key.content_type.as_str())
        .bind(to_sentinel(key.season))
        .bind(to_sentinel(key.episode))
        .fetch_optional(&self.pool)
        .await?;

        let record = ViewingProgress::from_heartbeat(
            user_id.clone(),
            profile_id,
            key,
            elapsed_secs,
            duration_secs,
            Utc::now(),
        );

        sqlx::query(
            "INSERT INTO viewing_progress
                (id, user_id, profile_id, content_id, content_type, elapsed_secs,
                 duration_secs, season, episode, completed, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(user_id, profile_id, content_id, content_type, season, episode)
             DO UPDATE SET
                elapsed_secs = excluded.elapsed_secs,
                duration_secs = excluded.duration_secs,
                completed = excluded.completed,
                updated_at = excluded.updated_at",
        )
        .bind(record.id.to_string())
        .bind(record.user_id.as_str())
        .bind(record.profile_id.to_string())
        .bind(i64::from(record.content_id))
        .bind(record.content_type.as_str())
        .bind(record.elapsed_secs)
        .bind(record.duration_secs)
        .bind(to_sentinel(record.season))
        .bind(to_sentinel(record.episode))
        .bind(i64::from(record.completed))
        .bind(record.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        // The conflict path keeps the original row id
        let was_update = existing.is_some();
        let stored = match existing {
            Some(id) => ViewingProgress {
                id: parse_row_uuid(&id)?,
                ..record
            },
            None => record,
        };

        let change = if was_update {
            RowChange::Updated(stored.clone())
        } else {
            RowChange::Inserted(stored.clone())
        };
        self.feed.publish_progress(ScopedChange {
            user_id: user_id.clone(),
            profile_id,
            change,
        });

        Ok(stored)
    }

    /// Single progress record for a composite key; no row means `None`
    pub async fn progress_for(
        &self,
        user_id: &UserId,
        profile_id: ProfileId,
        key: ProgressKey,
    ) -> Result<Option<ViewingProgress>> {
        let row = sqlx::query(
            "SELECT id, user_id, profile_id, content_id, content_type, elapsed_secs,
                    duration_secs, season, episode, completed, updated_at
             FROM viewing_progress
             WHERE user_id = ? AND profile_id = ? AND content_id = ? AND content_type = ?
               AND season = ? AND episode = ?",
        )
        .bind(user_id.as_str())
        .bind(profile_id.to_string())
        .bind(i64::from(key.content_id))
        .bind(key.content_type.as_str())
        .bind(to_sentinel(key.season))
        .bind(to_sentinel(key.episode))
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_progress).transpose()
    }
}

fn map_profile(row: &SqliteRow) -> Result<Profile> {
    Ok(Profile {
        id: ProfileId::parse(&row.try_get::<String, _>("id")?)?,
        user_id: UserId::parse(&row.try_get::<String, _>("user_id")?)?,
        name: row.try_get("name")?,
        avatar: row.try_get("avatar")?,
        age_rating: AgeRating::parse(&row.try_get::<String, _>("age_rating")?)?,
        created_at: parse_timestamp(&row.try_get::<String, _>("created_at")?)?,
        updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
    })
}

fn map_watchlist_item(row: &SqliteRow) -> Result<WatchlistItem> {
    Ok(WatchlistItem {
        id: parse_row_uuid(&row.try_get::<String, _>("id")?)?,
        user_id: UserId::parse(&row.try_get::<String, _>("user_id")?)?,
        profile_id: ProfileId::parse(&row.try_get::<String, _>("profile_id")?)?,
        content_id: u32::try_from(row.try_get::<i64, _>("content_id")?)
            .map_err(|_| Error::Internal("invalid stored content id".to_string()))?,
        content_type: ContentType::parse(&row.try_get::<String, _>("content_type")?)?,
        added_at: parse_timestamp(&row.try_get::<String, _>("added_at")?)?,
    })
}

fn map_progress(row: &SqliteRow) -> Result<ViewingProgress> {
    Ok(ViewingProgress {
        id: parse_row_uuid(&row.try_get::<String, _>("id")?)?,
        user_id: UserId::parse(&row.try_get::<String, _>("user_id")?)?,
        profile_id: ProfileId::parse(&row.try_get::<String, _>("profile_id")?)?,
        content_id: u32::try_from(row.try_get::<i64, _>("content_id")?)
            .map_err(|_| Error::Internal("invalid stored content id".to_string()))?,
        content_type: ContentType::parse(&row.try_get::<String, _>("content_type")?)?,
        elapsed_secs: row.try_get("elapsed_secs")?,
        duration_secs: row.try_get("duration_secs")?,
        season: from_sentinel(row.try_get::<i64, _>("season")?),
        episode: from_sentinel(row.try_get::<i64, _>("episode")?),
        completed: row.try_get::<i64, _>("completed")? != 0,
        updated_at: parse_timestamp(&row.try_get::<String, _>("updated_at")?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use reel_common::AgeRating;

    fn user(tag: char) -> UserId {
        UserId::parse(&tag.to_string().repeat(28)).unwrap()
    }

    fn new_profile(name: &str) -> NewProfile {
        NewProfile {
            name: name.to_string(),
            avatar: "avatar-1".to_string(),
            age_rating: AgeRating::Adult,
        }
    }

    fn movie_key(content_id: u32) -> ProgressKey {
        ProgressKey {
            content_id,
            content_type: ContentType::Movie,
            season: None,
            episode: None,
        }
    }

    #[tokio::test]
    async fn profile_crud_round_trip() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('a');

        let first = store.create_profile(&me, new_profile("First")).await.unwrap();
        let second = store.create_profile(&me, new_profile("Second")).await.unwrap();

        let profiles = store.profiles(&me).await.unwrap();
        assert_eq!(profiles.len(), 2);
        // Oldest first
        assert_eq!(profiles[0].id, first.id);
        assert_eq!(profiles[1].id, second.id);

        let updated = store
            .update_profile(
                first.id,
                ProfileUpdate {
                    name: Some("Renamed".to_string()),
                    avatar: None,
                    age_rating: Some(AgeRating::Kids),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.age_rating, AgeRating::Kids);
        assert_eq!(updated.avatar, "avatar-1");

        store.delete_profile(second.id).await.unwrap();
        let profiles = store.profiles(&me).await.unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].name, "Renamed");
    }

    #[tokio::test]
    async fn update_of_missing_profile_is_not_found() {
        let store = DataStore::in_memory().await.unwrap();
        let err = store
            .update_profile(ProfileId::generate(), ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn profile_name_is_sanitized_on_create() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('b');
        let profile = store
            .create_profile(&me, new_profile("  <b>Kids</b>  "))
            .await
            .unwrap();
        assert_eq!(profile.name, "&lt;b&gt;Kids&lt;/b&gt;");
    }

    #[tokio::test]
    async fn watchlist_add_remove_and_membership() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('c');
        let profile = store.create_profile(&me, new_profile("Main")).await.unwrap();

        store
            .add_watchlist(&me, profile.id, 550, ContentType::Movie)
            .await
            .unwrap();
        store
            .add_watchlist(&me, profile.id, 1399, ContentType::Series)
            .await
            .unwrap();

        assert!(store
            .in_watchlist(&me, profile.id, 550, ContentType::Movie)
            .await
            .unwrap());
        assert!(!store
            .in_watchlist(&me, profile.id, 550, ContentType::Series)
            .await
            .unwrap());

        store
            .remove_watchlist(&me, profile.id, 550, ContentType::Movie)
            .await
            .unwrap();
        // Removing again is a no-op
        store
            .remove_watchlist(&me, profile.id, 550, ContentType::Movie)
            .await
            .unwrap();

        let items = store.watchlist(&me, profile.id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content_id, 1399);
    }

    #[tokio::test]
    async fn zero_content_id_is_rejected() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('d');
        let profile = store.create_profile(&me, new_profile("Main")).await.unwrap();
        let err = store
            .add_watchlist(&me, profile.id, 0, ContentType::Movie)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn repeated_heartbeats_keep_a_single_row() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('e');
        let profile = store.create_profile(&me, new_profile("Main")).await.unwrap();
        let key = movie_key(550);

        let first = store
            .save_progress(&me, profile.id, key, 100.0, 7200.0)
            .await
            .unwrap();
        assert!(!first.completed);

        let second = store
            .save_progress(&me, profile.id, key, 7000.0, 7200.0)
            .await
            .unwrap();
        assert_eq!(second.id, first.id);
        assert!(second.completed);

        // Completed rows drop out of the resume list
        let incomplete = store.progress(&me, profile.id).await.unwrap();
        assert!(incomplete.is_empty());

        let stored = store
            .progress_for(&me, profile.id, key)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.id, first.id);
        assert!((stored.elapsed_secs - 7000.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn episodes_of_one_series_are_distinct_rows() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('f');
        let profile = store.create_profile(&me, new_profile("Main")).await.unwrap();

        let ep1 = ProgressKey {
            content_id: 1399,
            content_type: ContentType::Series,
            season: Some(1),
            episode: Some(1),
        };
        let ep2 = ProgressKey { episode: Some(2), ..ep1 };

        store.save_progress(&me, profile.id, ep1, 60.0, 3600.0).await.unwrap();
        store.save_progress(&me, profile.id, ep2, 60.0, 3600.0).await.unwrap();

        let rows = store.progress(&me, profile.id).await.unwrap();
        assert_eq!(rows.len(), 2);

        let stored = store.progress_for(&me, profile.id, ep1).await.unwrap().unwrap();
        assert_eq!(stored.season, Some(1));
        assert_eq!(stored.episode, Some(1));
    }

    #[tokio::test]
    async fn season_without_episode_is_rejected() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('g');
        let profile = store.create_profile(&me, new_profile("Main")).await.unwrap();

        let key = ProgressKey {
            content_id: 1399,
            content_type: ContentType::Series,
            season: Some(1),
            episode: None,
        };
        let err = store
            .save_progress(&me, profile.id, key, 60.0, 3600.0)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn writes_are_echoed_on_the_change_feed() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('h');
        let profile = store.create_profile(&me, new_profile("Main")).await.unwrap();

        let mut watchlist_sub = store.feed().subscribe_watchlist(me.clone(), profile.id);
        let mut progress_sub = store.feed().subscribe_progress(me.clone(), profile.id);

        store
            .add_watchlist(&me, profile.id, 550, ContentType::Movie)
            .await
            .unwrap();
        match watchlist_sub.recv().await.unwrap() {
            RowChange::Inserted(item) => assert_eq!(item.content_id, 550),
            other => panic!("unexpected change: {other:?}"),
        }

        store
            .remove_watchlist(&me, profile.id, 550, ContentType::Movie)
            .await
            .unwrap();
        assert!(matches!(
            watchlist_sub.recv().await.unwrap(),
            RowChange::Deleted(_)
        ));

        let key = movie_key(550);
        store.save_progress(&me, profile.id, key, 10.0, 7200.0).await.unwrap();
        assert!(matches!(
            progress_sub.recv().await.unwrap(),
            RowChange::Inserted(_)
        ));
        store.save_progress(&me, profile.id, key, 20.0, 7200.0).await.unwrap();
        assert!(matches!(
            progress_sub.recv().await.unwrap(),
            RowChange::Updated(_)
        ));
    }

    #[tokio::test]
    async fn deleting_a_profile_removes_its_records() {
        let store = DataStore::in_memory().await.unwrap();
        let me = user('i');
        let profile = store.create_profile(&me, new_profile("Main")).await.unwrap();

        store
            .add_watchlist(&me, profile.id, 550, ContentType::Movie)
            .await
            .unwrap();
        store
            .save_progress(&me, profile.id, movie_key(550), 10.0, 7200.0)
            .await
            .unwrap();

        store.delete_profile(profile.id).await.unwrap();

        assert!(store.watchlist(&me, profile.id).await.unwrap().is_empty());
        assert!(store.progress(&me, profile.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn opens_a_database_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reel.db");
        let store = DataStore::open(&path).await.unwrap();
        let me = user('j');
        store.create_profile(&me, new_profile("Main")).await.unwrap();
        assert!(path.exists());
    }
}
