//! Real-time change feed
//!
//! Every successful watchlist or progress write is published as a
//! `RowChange` tagged with its (identity, profile) scope. Subscriptions
//! filter to one scope and expose an idempotent `unsubscribe`; a dropped or
//! unsubscribed handle never blocks the publisher.

use reel_common::events::RowChange;
use reel_common::{ProfileId, UserId, ViewingProgress, WatchlistItem};
use tokio::sync::broadcast;
use tracing::warn;

const FEED_CAPACITY: usize = 256;

/// A row change tagged with the scope it belongs to
#[derive(Debug, Clone)]
pub struct ScopedChange<T> {
    pub user_id: UserId,
    pub profile_id: ProfileId,
    pub change: RowChange<T>,
}

/// Broadcast channels carrying change notifications for subscribed tables
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    watchlist_tx: broadcast::Sender<ScopedChange<WatchlistItem>>,
    progress_tx: broadcast::Sender<ScopedChange<ViewingProgress>>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        let (watchlist_tx, _) = broadcast::channel(FEED_CAPACITY);
        let (progress_tx, _) = broadcast::channel(FEED_CAPACITY);
        Self {
            watchlist_tx,
            progress_tx,
        }
    }

    /// Publish a watchlist change; no subscribers is not an error
    pub fn publish_watchlist(&self, change: ScopedChange<WatchlistItem>) {
        let _ = self.watchlist_tx.send(change);
    }

    /// Publish a progress change; no subscribers is not an error
    pub fn publish_progress(&self, change: ScopedChange<ViewingProgress>) {
        let _ = self.progress_tx.send(change);
    }

    /// Subscribe to watchlist changes for one (identity, profile) pair
    pub fn subscribe_watchlist(
        &self,
        user_id: UserId,
        profile_id: ProfileId,
    ) -> Subscription<WatchlistItem> {
        Subscription {
            rx: Some(self.watchlist_tx.subscribe()),
            user_id,
            profile_id,
        }
    }

    /// Subscribe to progress changes for one (identity, profile) pair
    pub fn subscribe_progress(
        &self,
        user_id: UserId,
        profile_id: ProfileId,
    ) -> Subscription<ViewingProgress> {
        Subscription {
            rx: Some(self.progress_tx.subscribe()),
            user_id,
            profile_id,
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Scope-filtered change subscription
pub struct Subscription<T> {
    rx: Option<broadcast::Receiver<ScopedChange<T>>>,
    user_id: UserId,
    profile_id: ProfileId,
}

impl<T: Clone> Subscription<T> {
    /// Receive the next change within this subscription's scope
    ///
    /// Returns `None` once unsubscribed or when the feed has shut down.
    /// Lagged events are logged and skipped.
    pub async fn recv(&mut self) -> Option<RowChange<T>> {
        let rx = self.rx.as_mut()?;
        loop {
            match rx.recv().await {
                Ok(scoped) => {
                    if scoped.user_id == self.user_id && scoped.profile_id == self.profile_id {
                        return Some(scoped.change);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "change feed subscription lagged, skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Detach from the feed; safe to call repeatedly
    pub fn unsubscribe(&mut self) {
        self.rx = None;
    }

    pub fn is_active(&self) -> bool {
        self.rx.is_some()
    }
}
