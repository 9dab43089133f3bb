//! Content/watchlist store
//!
//! Holds the watchlist and viewing-progress collections for the current
//! (identity, profile) pair. Local optimistic writes and remote change-feed
//! echoes converge through the same idempotent reducers in [`crate::merge`],
//! so a double-apply always lands on one entry per key.
//!
//! Scope teardown detaches listeners but never aborts in-flight backend
//! calls; an epoch counter guards every state application, so late responses
//! and stale feed events for a torn-down scope are discarded.

use crate::merge;
use reel_common::events::{EventBus, RowChange, SessionEvent};
use reel_common::{
    ContentType, Error, ProfileId, ProgressKey, Result, UserId, ViewingProgress, WatchlistItem,
};
use reel_data::realtime::Subscription;
use reel_data::DataStore;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::debug;

pub struct ContentStore {
    data: Arc<DataStore>,
    bus: EventBus,
    /// Bumped on every scope change; applications check it first
    epoch: AtomicU64,
    scope: RwLock<Option<(UserId, ProfileId)>>,
    watchlist: RwLock<Vec<WatchlistItem>>,
    progress: RwLock<Vec<ViewingProgress>>,
    listeners: Mutex<Vec<JoinHandle<()>>>,
}

impl ContentStore {
    pub fn new(data: Arc<DataStore>, bus: EventBus) -> Self {
        Self {
            data,
            bus,
            epoch: AtomicU64::new(0),
            scope: RwLock::new(None),
            watchlist: RwLock::new(Vec::new()),
            progress: RwLock::new(Vec::new()),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// React to a change of the (identity, profile) pair
    ///
    /// With both present: parallel initial loads, then two change-feed
    /// subscriptions scoped to the pair. With either absent: collections
    /// are cleared and listeners detached.
    pub async fn scope_changed(
        self: Arc<Self>,
        user: Option<UserId>,
        profile: Option<ProfileId>,
    ) -> Result<()> {
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;
        for handle in self.listeners.lock().await.drain(..) {
            handle.abort();
        }

        let (user, profile) = match (user, profile) {
            (Some(user), Some(profile)) => (user, profile),
            _ => {
                *self.scope.write().await = None;
                self.watchlist.write().await.clear();
                self.progress.write().await.clear();
                debug!("content scope cleared");
                return Ok(());
            }
        };
        *self.scope.write().await = Some((user.clone(), profile));

        let (watchlist, progress) = tokio::join!(
            self.data.watchlist(&user, profile),
            self.data.progress(&user, profile),
        );
        let (watchlist, progress) = (watchlist?, progress?);
        if !self.is_live(epoch) {
            debug!("discarding initial loads for a torn-down scope");
            return Ok(());
        }
        *self.watchlist.write().await = watchlist;
        *self.progress.write().await = progress;
        self.emit_watchlist().await;

        let watchlist_sub = self.data.feed().subscribe_watchlist(user.clone(), profile);
        let progress_sub = self.data.feed().subscribe_progress(user, profile);
        let mut listeners = self.listeners.lock().await;
        listeners.push(tokio::spawn(run_watchlist_listener(
            Arc::clone(&self),
            epoch,
            watchlist_sub,
        )));
        listeners.push(tokio::spawn(run_progress_listener(
            Arc::clone(&self),
            epoch,
            progress_sub,
        )));
        Ok(())
    }

    /// Add a title to the watchlist
    ///
    /// The confirmed record is prepended locally only after the backend
    /// accepts it; a failed insert leaves local state untouched.
    pub async fn add_to_watchlist(
        &self,
        content_id: u32,
        content_type: ContentType,
    ) -> Result<WatchlistItem> {
        let (user, profile) = self.require_scope().await?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let item = self
            .data
            .add_watchlist(&user, profile, content_id, content_type)
            .await?;
        if self.is_live(epoch) {
            merge::add_watchlist_item(&mut *self.watchlist.write().await, item.clone());
            self.emit_watchlist().await;
        }
        Ok(item)
    }

    /// Remove a title from the watchlist
    pub async fn remove_from_watchlist(
        &self,
        content_id: u32,
        content_type: ContentType,
    ) -> Result<()> {
        let (user, profile) = self.require_scope().await?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        self.data
            .remove_watchlist(&user, profile, content_id, content_type)
            .await?;
        if self.is_live(epoch) {
            merge::remove_watchlist_item(&mut *self.watchlist.write().await, content_id, content_type);
            self.emit_watchlist().await;
        }
        Ok(())
    }

    /// Toggle watchlist membership: remove when present, add otherwise
    ///
    /// Not a single atomic backend operation: two rapid toggles for the
    /// same key can double-fire. Callers must debounce or disable the
    /// control while a toggle is in flight.
    ///
    /// Returns `true` when the title was added.
    pub async fn toggle_watchlist(
        &self,
        content_id: u32,
        content_type: ContentType,
    ) -> Result<bool> {
        if self.contains(content_id, content_type).await {
            self.remove_from_watchlist(content_id, content_type).await?;
            Ok(false)
        } else {
            self.add_to_watchlist(content_id, content_type).await?;
            Ok(true)
        }
    }

    /// Record a playback heartbeat
    pub async fn record_progress(
        &self,
        key: ProgressKey,
        elapsed_secs: f64,
        duration_secs: f64,
    ) -> Result<ViewingProgress> {
        let (user, profile) = self.require_scope().await?;
        let epoch = self.epoch.load(Ordering::SeqCst);

        let record = self
            .data
            .save_progress(&user, profile, key, elapsed_secs, duration_secs)
            .await?;
        if self.is_live(epoch) {
            merge::upsert_progress(&mut *self.progress.write().await, record.clone());
            self.emit_progress(&record);
        }
        Ok(record)
    }

    /// Linear-scan membership check by (content id, content type)
    pub async fn contains(&self, content_id: u32, content_type: ContentType) -> bool {
        self.watchlist
            .read()
            .await
            .iter()
            .any(|i| i.matches(content_id, content_type))
    }

    /// Linear-scan progress lookup
    ///
    /// Season and episode are significant only when both the query and the
    /// stored record provide them.
    pub async fn progress_for(&self, key: &ProgressKey) -> Option<ViewingProgress> {
        self.progress
            .read()
            .await
            .iter()
            .find(|r| progress_matches(r, key))
            .cloned()
    }

    pub async fn watchlist(&self) -> Vec<WatchlistItem> {
        self.watchlist.read().await.clone()
    }

    pub async fn progress(&self) -> Vec<ViewingProgress> {
        self.progress.read().await.clone()
    }

    pub async fn scope(&self) -> Option<(UserId, ProfileId)> {
        self.scope.read().await.clone()
    }

    async fn apply_watchlist_change(&self, change: RowChange<WatchlistItem>) {
        match change {
            RowChange::Inserted(item) | RowChange::Updated(item) => {
                merge::add_watchlist_item(&mut *self.watchlist.write().await, item);
            }
            RowChange::Deleted(item) => {
                merge::remove_watchlist_item(
                    &mut *self.watchlist.write().await,
                    item.content_id,
                    item.content_type,
                );
            }
        }
        self.emit_watchlist().await;
    }

    async fn apply_progress_change(&self, change: RowChange<ViewingProgress>) {
        match change {
            RowChange::Inserted(record) | RowChange::Updated(record) => {
                let emitted = record.clone();
                merge::upsert_progress(&mut *self.progress.write().await, record);
                self.emit_progress(&emitted);
            }
            RowChange::Deleted(record) => {
                merge::remove_progress(&mut *self.progress.write().await, &record);
            }
        }
    }

    fn is_live(&self, epoch: u64) -> bool {
        self.epoch.load(Ordering::SeqCst) == epoch
    }

    async fn require_scope(&self) -> Result<(UserId, ProfileId)> {
        self.scope.read().await.clone().ok_or(Error::NoSession)
    }

    async fn emit_watchlist(&self) {
        self.bus.emit_lossy(SessionEvent::WatchlistUpdated {
            entries: self.watchlist.read().await.len(),
            timestamp: chrono::Utc::now(),
        });
    }

    fn emit_progress(&self, record: &ViewingProgress) {
        self.bus.emit_lossy(SessionEvent::ProgressRecorded {
            content_id: record.content_id,
            content_type: record.content_type,
            completed: record.completed,
            timestamp: chrono::Utc::now(),
        });
    }
}

fn progress_matches(record: &ViewingProgress, key: &ProgressKey) -> bool {
    if record.content_id != key.content_id || record.content_type != key.content_type {
        return false;
    }
    let season_ok = match (key.season, record.season) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    let episode_ok = match (key.episode, record.episode) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    };
    season_ok && episode_ok
}

async fn run_watchlist_listener(
    store: Arc<ContentStore>,
    epoch: u64,
    mut sub: Subscription<WatchlistItem>,
) {
    while let Some(change) = sub.recv().await {
        if !store.is_live(epoch) {
            debug!("dropping stale watchlist feed event");
            break;
        }
        store.apply_watchlist_change(change).await;
    }
}

async fn run_progress_listener(
    store: Arc<ContentStore>,
    epoch: u64,
    mut sub: Subscription<ViewingProgress>,
) {
    while let Some(change) = sub.recv().await {
        if !store.is_live(epoch) {
            debug!("dropping stale progress feed event");
            break;
        }
        store.apply_progress_change(change).await;
    }
}
