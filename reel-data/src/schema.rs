//! Database schema
//!
//! Season/episode columns use a -1 sentinel instead of NULL so the
//! viewing-progress upsert key is total: SQLite treats NULLs as distinct in
//! unique indexes, which would let movie heartbeats accumulate rows.

use reel_common::Result;
use sqlx::SqlitePool;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS profiles (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        avatar TEXT NOT NULL,
        age_rating TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_profiles_user ON profiles(user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS watchlist (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        profile_id TEXT NOT NULL,
        content_id INTEGER NOT NULL,
        content_type TEXT NOT NULL,
        added_at TEXT NOT NULL,
        UNIQUE(profile_id, content_id, content_type)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_watchlist_scope ON watchlist(user_id, profile_id)",
    r#"
    CREATE TABLE IF NOT EXISTS viewing_progress (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        profile_id TEXT NOT NULL,
        content_id INTEGER NOT NULL,
        content_type TEXT NOT NULL,
        elapsed_secs REAL NOT NULL,
        duration_secs REAL NOT NULL,
        season INTEGER NOT NULL DEFAULT -1,
        episode INTEGER NOT NULL DEFAULT -1,
        completed INTEGER NOT NULL DEFAULT 0,
        updated_at TEXT NOT NULL,
        UNIQUE(user_id, profile_id, content_id, content_type, season, episode)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_progress_scope ON viewing_progress(user_id, profile_id)",
];

/// Create tables and indexes if they do not exist
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
