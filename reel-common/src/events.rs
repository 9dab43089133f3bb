//! Event types for the reel session event system
//!
//! `SessionEvent` is the notification currency between stores: identity
//! changes flow to the profile store, profile selection flows to the content
//! store, and UI consumers observe everything through the same bus. Events
//! are broadcast via `EventBus`; emission never blocks.

use crate::{ContentType, Identity, Profile, ProgressKey};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Session event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// Authenticated identity changed (login, logout, session restore)
    IdentityChanged {
        identity: Option<Identity>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Profile list finished loading for the current identity
    ProfilesLoaded {
        count: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Selected profile changed (None when selection was cleared)
    ProfileSelected {
        profile: Option<Profile>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Watchlist contents changed for the active (identity, profile) pair
    WatchlistUpdated {
        entries: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A viewing-progress record was written
    ProgressRecorded {
        content_id: u32,
        content_type: ContentType,
        completed: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

/// Backend change notification for one row of a subscribed table
///
/// Mirrors the wire shape `{eventType: INSERT|UPDATE|DELETE, new, old}`:
/// inserts and updates carry the new row, deletes carry the old one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event_type", content = "row")]
pub enum RowChange<T> {
    #[serde(rename = "INSERT")]
    Inserted(T),
    #[serde(rename = "UPDATE")]
    Updated(T),
    #[serde(rename = "DELETE")]
    Deleted(T),
}

impl<T> RowChange<T> {
    pub fn row(&self) -> &T {
        match self {
            RowChange::Inserted(row) | RowChange::Updated(row) | RowChange::Deleted(row) => row,
        }
    }
}

/// Broadcast bus for session events
///
/// Thin wrapper over `tokio::sync::broadcast`: subscribers receive events
/// emitted after they subscribe; slow subscribers lag and skip.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns the subscriber count, or an error when nobody is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(
        &self,
        event: SessionEvent,
    ) -> Result<usize, broadcast::error::SendError<SessionEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring the case where no subscribers are listening
    pub fn emit_lossy(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
