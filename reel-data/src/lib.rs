//! # Reel Data Store
//!
//! Typed CRUD plus real-time change subscription for the three record
//! kinds the session layer owns: profiles, watchlist entries, and
//! viewing-progress rows. Writes that succeed are echoed on a change feed
//! scoped by (identity, profile), mirroring the backend's
//! `{eventType, new, old}` notification channel.

pub mod realtime;
pub mod schema;
pub mod store;

pub use realtime::{ChangeFeed, ScopedChange, Subscription};
pub use store::DataStore;
