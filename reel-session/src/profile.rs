//! Profile store
//!
//! Per-identity state machine `empty -> loading -> populated`, driven by
//! identity transitions. Invariants (at most 5 profiles, never delete the
//! last one) are checked against in-memory state before any backend call.
//! Selection is local plus a persisted marker write; no network round-trip.

use crate::markers::MarkerStore;
use reel_common::events::{EventBus, SessionEvent};
use reel_common::models::{NewProfile, ProfileUpdate};
use reel_common::{AgeRating, Error, Identity, Profile, ProfileId, Result, UserId};
use reel_data::DataStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Maximum number of profiles per identity
pub const MAX_PROFILES: usize = 5;

const GUEST_NAME: &str = "Guest";
const GUEST_AVATAR: &str = "avatar-1";

pub struct ProfileStore {
    data: Arc<DataStore>,
    markers: Arc<dyn MarkerStore>,
    bus: EventBus,
    user: RwLock<Option<UserId>>,
    profiles: RwLock<Vec<Profile>>,
    selected: RwLock<Option<Profile>>,
    loading: RwLock<bool>,
    error: RwLock<Option<String>>,
    /// Guest auto-provision latch: set when a provision starts, held for the
    /// rest of the identity session on success, reset when the uid changes,
    /// on identity loss, and on a failed create
    provisioning: AtomicBool,
}

impl ProfileStore {
    pub fn new(data: Arc<DataStore>, markers: Arc<dyn MarkerStore>, bus: EventBus) -> Self {
        Self {
            data,
            markers,
            bus,
            user: RwLock::new(None),
            profiles: RwLock::new(Vec::new()),
            selected: RwLock::new(None),
            loading: RwLock::new(false),
            error: RwLock::new(None),
            provisioning: AtomicBool::new(false),
        }
    }

    /// React to an identity transition
    ///
    /// A new identity loads its profile list (auto-provisioning a guest
    /// profile when the list is empty); identity loss clears the list, the
    /// selection, and the persisted marker.
    pub async fn identity_changed(&self, identity: Option<&Identity>) -> Result<()> {
        match identity {
            Some(identity) => {
                let mut user = self.user.write().await;
                let changed = user.as_ref() != Some(&identity.uid);
                *user = Some(identity.uid.clone());
                drop(user);
                // The latch survives repeated events for the same uid; a
                // reset here would reopen the double-provision window
                if changed {
                    self.provisioning.store(false, Ordering::SeqCst);
                }
                self.load(identity.uid.clone()).await
            }
            None => {
                *self.user.write().await = None;
                self.provisioning.store(false, Ordering::SeqCst);
                self.profiles.write().await.clear();
                *self.selected.write().await = None;
                *self.error.write().await = None;
                if let Err(e) = self.markers.clear_selected_profile() {
                    warn!(error = %e, "failed to clear selection marker on logout");
                }
                self.emit_selected(None);
                Ok(())
            }
        }
    }

    async fn load(&self, user: UserId) -> Result<()> {
        *self.loading.write().await = true;
        *self.error.write().await = None;

        let list = match self.data.profiles(&user).await {
            Ok(list) => list,
            Err(e) => {
                *self.loading.write().await = false;
                return Err(self.fail(e).await);
            }
        };
        let count = list.len();
        *self.profiles.write().await = list;
        self.bus.emit_lossy(SessionEvent::ProfilesLoaded {
            count,
            timestamp: chrono::Utc::now(),
        });

        if count == 0 {
            self.provision_guest(&user).await?;
        } else {
            self.restore_selection().await;
        }

        *self.loading.write().await = false;
        Ok(())
    }

    /// Create and select the default profile for an identity with none
    ///
    /// The atomic latch makes this run at most once even when two loads
    /// observe the empty list before the create completes.
    async fn provision_guest(&self, user: &UserId) -> Result<()> {
        if self.provisioning.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let created = self
            .data
            .create_profile(
                user,
                NewProfile {
                    name: GUEST_NAME.to_string(),
                    avatar: GUEST_AVATAR.to_string(),
                    age_rating: AgeRating::Adult,
                },
            )
            .await;

        match created {
            Ok(profile) => {
                info!(profile = %profile.id, "auto-provisioned guest profile");
                *self.profiles.write().await = vec![profile.clone()];
                self.set_selected(profile, true).await?;
                Ok(())
            }
            Err(e) => {
                self.provisioning.store(false, Ordering::SeqCst);
                Err(self.fail(e).await)
            }
        }
    }

    /// Select the persisted profile id when it matches a loaded profile
    async fn restore_selection(&self) {
        if self.selected.read().await.is_some() {
            return;
        }
        let marker = match self.markers.read_selected_profile() {
            Ok(marker) => marker,
            Err(e) => {
                warn!(error = %e, "failed to read selection marker");
                return;
            }
        };
        let Some(marker) = marker else { return };

        let restored = self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.id == marker)
            .cloned();
        match restored {
            Some(profile) => {
                *self.selected.write().await = Some(profile.clone());
                self.emit_selected(Some(profile));
            }
            // Stale marker: leave unselected, the caller must prompt
            None => warn!(%marker, "persisted selection does not match any profile"),
        }
    }

    /// Select a loaded profile and persist the choice
    pub async fn select_profile(&self, profile_id: ProfileId) -> Result<()> {
        let profile = self
            .profiles
            .read()
            .await
            .iter()
            .find(|p| p.id == profile_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("profile {profile_id}")))?;
        self.set_selected(profile, true).await
    }

    async fn set_selected(&self, profile: Profile, write_marker: bool) -> Result<()> {
        if write_marker {
            if let Err(e) = self.markers.write_selected_profile(profile.id) {
                return Err(self.fail(e).await);
            }
        }
        *self.selected.write().await = Some(profile.clone());
        self.emit_selected(Some(profile));
        Ok(())
    }

    pub async fn create_profile(&self, new: NewProfile) -> Result<Profile> {
        let user = self.require_user().await?;
        if self.profiles.read().await.len() >= MAX_PROFILES {
            return Err(self.fail(Error::ProfileLimit).await);
        }

        match self.data.create_profile(&user, new).await {
            Ok(profile) => {
                let mut profiles = self.profiles.write().await;
                profiles.push(profile.clone());
                let count = profiles.len();
                drop(profiles);
                self.bus.emit_lossy(SessionEvent::ProfilesLoaded {
                    count,
                    timestamp: chrono::Utc::now(),
                });
                Ok(profile)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    pub async fn update_profile(
        &self,
        profile_id: ProfileId,
        update: ProfileUpdate,
    ) -> Result<Profile> {
        self.require_user().await?;

        match self.data.update_profile(profile_id, update).await {
            Ok(updated) => {
                let mut profiles = self.profiles.write().await;
                if let Some(slot) = profiles.iter_mut().find(|p| p.id == profile_id) {
                    *slot = updated.clone();
                }
                drop(profiles);

                let mut selected = self.selected.write().await;
                if selected.as_ref().map(|p| p.id) == Some(profile_id) {
                    *selected = Some(updated.clone());
                }
                Ok(updated)
            }
            Err(e) => Err(self.fail(e).await),
        }
    }

    /// Delete a profile; deleting the selected one clears the selection
    pub async fn delete_profile(&self, profile_id: ProfileId) -> Result<()> {
        self.require_user().await?;
        if self.profiles.read().await.len() <= 1 {
            return Err(self.fail(Error::LastProfile).await);
        }

        if let Err(e) = self.data.delete_profile(profile_id).await {
            return Err(self.fail(e).await);
        }
        self.profiles.write().await.retain(|p| p.id != profile_id);

        let mut selected = self.selected.write().await;
        if selected.as_ref().map(|p| p.id) == Some(profile_id) {
            *selected = None;
            drop(selected);
            if let Err(e) = self.markers.clear_selected_profile() {
                warn!(error = %e, "failed to clear selection marker after delete");
            }
            self.emit_selected(None);
        }
        Ok(())
    }

    fn emit_selected(&self, profile: Option<Profile>) {
        self.bus.emit_lossy(SessionEvent::ProfileSelected {
            profile,
            timestamp: chrono::Utc::now(),
        });
    }

    async fn require_user(&self) -> Result<UserId> {
        self.user.read().await.clone().ok_or(Error::NoSession)
    }

    async fn fail(&self, e: Error) -> Error {
        *self.error.write().await = Some(e.to_string());
        e
    }

    pub async fn profiles(&self) -> Vec<Profile> {
        self.profiles.read().await.clone()
    }

    pub async fn selected(&self) -> Option<Profile> {
        self.selected.read().await.clone()
    }

    pub async fn is_loading(&self) -> bool {
        *self.loading.read().await
    }

    pub async fn error_message(&self) -> Option<String> {
        self.error.read().await.clone()
    }
}
