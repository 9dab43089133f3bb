//! Session orchestrator
//!
//! Owns the three stores and routes notifications between them over the
//! event bus: identity changes flow to the profile store, profile selection
//! flows to the content store, with identity and profile carried as explicit
//! event payloads rather than shared state. Shutdown detaches the routing
//! task and stream listeners without aborting in-flight backend calls.

use crate::auth::AuthProvider;
use crate::content::ContentStore;
use crate::identity::IdentityStore;
use crate::markers::MarkerStore;
use crate::profile::ProfileStore;
use reel_common::events::{EventBus, SessionEvent};
use reel_common::{ProfileId, Result};
use reel_data::DataStore;
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub struct Session {
    bus: EventBus,
    pub identity: Arc<IdentityStore>,
    pub profiles: Arc<ProfileStore>,
    pub content: Arc<ContentStore>,
    router: Mutex<Option<JoinHandle<()>>>,
}

impl Session {
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        data: Arc<DataStore>,
        markers: Arc<dyn MarkerStore>,
    ) -> Arc<Self> {
        let bus = EventBus::new(256);
        let identity = Arc::new(IdentityStore::new(provider, bus.clone()));
        let profiles = Arc::new(ProfileStore::new(Arc::clone(&data), markers, bus.clone()));
        let content = Arc::new(ContentStore::new(data, bus.clone()));
        Arc::new(Self {
            bus,
            identity,
            profiles,
            content,
            router: Mutex::new(None),
        })
    }

    /// Bus carrying every store notification; UI consumers subscribe here
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Start routing and attach to the auth provider's identity stream
    ///
    /// The router subscribes before the identity store attaches, so the
    /// startup session-restore event is never missed.
    pub async fn start(self: Arc<Self>) {
        let mut rx = self.bus.subscribe();
        let session = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) => session.route(event).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "session router lagged, skipping events");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("session bus closed, router stopping");
                        break;
                    }
                }
            }
        });
        *self.router.lock().await = Some(handle);
        Arc::clone(&self.identity).attach().await;
    }

    async fn route(&self, event: SessionEvent) {
        match event {
            SessionEvent::IdentityChanged { identity, .. } => {
                if let Err(e) = self.profiles.identity_changed(identity.as_ref()).await {
                    warn!(error = %e, "profile store failed to apply identity change");
                }
            }
            SessionEvent::ProfileSelected { profile, .. } => {
                let user = profile.as_ref().map(|p| p.user_id.clone());
                let profile_id = profile.map(|p| p.id);
                if let Err(e) = Arc::clone(&self.content).scope_changed(user, profile_id).await {
                    warn!(error = %e, "content store failed to apply scope change");
                }
            }
            _ => {}
        }
    }

    /// Detach routing and listeners; in-flight calls are not aborted
    pub async fn shutdown(&self) {
        if let Some(handle) = self.router.lock().await.take() {
            handle.abort();
        }
        self.identity.detach().await;
        let _ = Arc::clone(&self.content).scope_changed(None, None).await;
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        self.identity.sign_in(email, password).await
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        self.identity.sign_up(email, password).await
    }

    pub async fn sign_in_federated(&self) -> Result<()> {
        self.identity.sign_in_federated().await
    }

    pub async fn sign_out(&self) -> Result<()> {
        self.identity.sign_out().await
    }

    pub async fn select_profile(&self, profile_id: ProfileId) -> Result<()> {
        self.profiles.select_profile(profile_id).await
    }
}
