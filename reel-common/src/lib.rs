//! # Reel Common Library
//!
//! Shared code for all reel crates including:
//! - Domain models (identities, profiles, watchlist, viewing progress)
//! - Validated identifier newtypes
//! - Event types and the session EventBus
//! - Input sanitization and validation helpers
//! - Configuration loading
//! - Logging bootstrap

pub mod config;
pub mod error;
pub mod events;
pub mod ids;
pub mod logging;
pub mod models;
pub mod sanitize;

pub use error::{Error, Result};
pub use ids::{ProfileId, UserId};
pub use models::{AgeRating, ContentType, Identity, Profile, ProgressKey, ViewingProgress, WatchlistItem};
