//! Identity store
//!
//! Phase machine `Uninitialized -> Loading -> Authenticated | Anonymous`,
//! driven by the auth provider's identity-change stream. Explicit actions
//! (sign-in, sign-up, federated sign-in, sign-out) never set the identity
//! themselves; they await the provider call and let the stream callback make
//! the transition, so the two code paths cannot produce duplicate
//! transitions.

use crate::auth::AuthProvider;
use reel_common::events::{EventBus, SessionEvent};
use reel_common::{Error, Identity, Result};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Session phase for the current identity
#[derive(Debug, Clone, PartialEq)]
pub enum IdentityPhase {
    Uninitialized,
    Loading,
    Authenticated(Identity),
    Anonymous,
}

pub struct IdentityStore {
    provider: Arc<dyn AuthProvider>,
    bus: EventBus,
    phase: RwLock<IdentityPhase>,
    action_loading: RwLock<bool>,
    error: RwLock<Option<String>>,
    attached: AtomicBool,
    listener: Mutex<Option<JoinHandle<()>>>,
}

impl IdentityStore {
    pub fn new(provider: Arc<dyn AuthProvider>, bus: EventBus) -> Self {
        Self {
            provider,
            bus,
            phase: RwLock::new(IdentityPhase::Uninitialized),
            action_loading: RwLock::new(false),
            error: RwLock::new(None),
            attached: AtomicBool::new(false),
            listener: Mutex::new(None),
        }
    }

    /// Subscribe to the provider's identity-change stream
    ///
    /// Idempotent: the subscription is made exactly once for the store's
    /// lifetime, and every session change (including the startup restore)
    /// arrives through it.
    pub async fn attach(self: Arc<Self>) {
        if self.attached.swap(true, Ordering::SeqCst) {
            return;
        }
        *self.phase.write().await = IdentityPhase::Loading;

        let mut rx = self.provider.identity_changes();
        let store = Arc::clone(&self);
        let handle = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(identity) => store.apply_stream_change(identity).await,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "identity stream lagged, skipping changes");
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        debug!("identity stream closed, listener stopping");
                        break;
                    }
                }
            }
        });
        *self.listener.lock().await = Some(handle);
    }

    /// Detach the stream listener; in-flight provider calls are not aborted
    pub async fn detach(&self) {
        if let Some(handle) = self.listener.lock().await.take() {
            handle.abort();
        }
    }

    async fn apply_stream_change(&self, identity: Option<Identity>) {
        let phase = match &identity {
            Some(identity) => {
                debug!(uid = %identity.uid, "identity authenticated");
                IdentityPhase::Authenticated(identity.clone())
            }
            None => {
                debug!("identity anonymous");
                IdentityPhase::Anonymous
            }
        };
        *self.phase.write().await = phase;
        *self.action_loading.write().await = false;

        self.bus.emit_lossy(SessionEvent::IdentityChanged {
            identity,
            timestamp: chrono::Utc::now(),
        });
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<()> {
        let (email, password) = validate_credentials(email, password)?;
        self.begin_action().await;
        match self.provider.sign_in(&email, &password).await {
            Ok(()) => Ok(()),
            Err(code) => Err(self.fail_action(code).await),
        }
    }

    pub async fn sign_up(&self, email: &str, password: &str) -> Result<()> {
        let (email, password) = validate_credentials(email, password)?;
        self.begin_action().await;
        match self.provider.sign_up(&email, &password).await {
            Ok(()) => Ok(()),
            Err(code) => Err(self.fail_action(code).await),
        }
    }

    pub async fn sign_in_federated(&self) -> Result<()> {
        self.begin_action().await;
        match self.provider.sign_in_federated().await {
            Ok(()) => Ok(()),
            Err(code) => Err(self.fail_action(code).await),
        }
    }

    /// Sign out; the cleared identity propagates via the stream, not here
    pub async fn sign_out(&self) -> Result<()> {
        self.begin_action().await;
        match self.provider.sign_out().await {
            Ok(()) => Ok(()),
            Err(code) => Err(self.fail_action(code).await),
        }
    }

    async fn begin_action(&self) {
        *self.action_loading.write().await = true;
        *self.error.write().await = None;
    }

    async fn fail_action(&self, code: crate::auth::AuthErrorCode) -> Error {
        let message = code.user_message().to_string();
        warn!(%message, "auth action failed");
        *self.error.write().await = Some(message.clone());
        *self.action_loading.write().await = false;
        Error::Auth(message)
    }

    pub async fn phase(&self) -> IdentityPhase {
        self.phase.read().await.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        match &*self.phase.read().await {
            IdentityPhase::Authenticated(identity) => Some(identity.clone()),
            _ => None,
        }
    }

    pub async fn is_loading(&self) -> bool {
        *self.action_loading.read().await
    }

    pub async fn error_message(&self) -> Option<String> {
        self.error.read().await.clone()
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<(String, String)> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::Validation("a valid email address is required".to_string()));
    }
    if password.is_empty() {
        return Err(Error::Validation("a password is required".to_string()));
    }
    Ok((email.to_string(), password.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthErrorCode;
    use async_trait::async_trait;
    use reel_common::UserId;

    struct FakeAuth {
        tx: broadcast::Sender<Option<Identity>>,
        sign_in_result: std::result::Result<(), AuthErrorCode>,
    }

    impl FakeAuth {
        fn new(sign_in_result: std::result::Result<(), AuthErrorCode>) -> Arc<Self> {
            let (tx, _) = broadcast::channel(8);
            Arc::new(Self { tx, sign_in_result })
        }

        fn push(&self, identity: Option<Identity>) {
            let _ = self.tx.send(identity);
        }
    }

    #[async_trait]
    impl AuthProvider for FakeAuth {
        async fn sign_in(
            &self,
            _email: &str,
            _password: &str,
        ) -> std::result::Result<(), AuthErrorCode> {
            self.sign_in_result
        }

        async fn sign_up(
            &self,
            _email: &str,
            _password: &str,
        ) -> std::result::Result<(), AuthErrorCode> {
            self.sign_in_result
        }

        async fn sign_in_federated(&self) -> std::result::Result<(), AuthErrorCode> {
            self.sign_in_result
        }

        async fn sign_out(&self) -> std::result::Result<(), AuthErrorCode> {
            Ok(())
        }

        fn identity_changes(&self) -> broadcast::Receiver<Option<Identity>> {
            self.tx.subscribe()
        }
    }

    fn identity() -> Identity {
        Identity {
            uid: UserId::parse(&"a".repeat(28)).unwrap(),
            email: "a@example.com".to_string(),
            display_name: None,
            photo_url: None,
            email_verified: true,
        }
    }

    async fn wait_for_identity_event(
        rx: &mut broadcast::Receiver<SessionEvent>,
    ) -> Option<Identity> {
        loop {
            if let SessionEvent::IdentityChanged { identity, .. } = rx.recv().await.unwrap() {
                return identity;
            }
        }
    }

    #[tokio::test]
    async fn stream_drives_the_phase_machine() {
        let auth = FakeAuth::new(Ok(()));
        let bus = EventBus::new(16);
        let store = Arc::new(IdentityStore::new(auth.clone(), bus.clone()));
        let mut rx = bus.subscribe();

        assert_eq!(store.phase().await, IdentityPhase::Uninitialized);
        Arc::clone(&store).attach().await;
        assert_eq!(store.phase().await, IdentityPhase::Loading);

        auth.push(Some(identity()));
        assert!(wait_for_identity_event(&mut rx).await.is_some());
        assert!(matches!(store.phase().await, IdentityPhase::Authenticated(_)));

        auth.push(None);
        assert!(wait_for_identity_event(&mut rx).await.is_none());
        assert_eq!(store.phase().await, IdentityPhase::Anonymous);
    }

    #[tokio::test]
    async fn sign_in_success_does_not_set_identity_itself() {
        let auth = FakeAuth::new(Ok(()));
        let bus = EventBus::new(16);
        let store = Arc::new(IdentityStore::new(auth.clone(), bus));
        Arc::clone(&store).attach().await;

        store.sign_in("a@example.com", "secret").await.unwrap();
        // Only the stream transitions state
        assert_eq!(store.phase().await, IdentityPhase::Loading);
        assert!(store.identity().await.is_none());
    }

    #[tokio::test]
    async fn sign_in_failure_stores_a_user_safe_message_and_rethrows() {
        let auth = FakeAuth::new(Err(AuthErrorCode::InvalidCredential));
        let bus = EventBus::new(16);
        let store = Arc::new(IdentityStore::new(auth, bus));
        Arc::clone(&store).attach().await;

        let err = store.sign_in("a@example.com", "wrong").await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
        assert_eq!(
            store.error_message().await.as_deref(),
            Some("Invalid email or password")
        );
        assert!(!store.is_loading().await);
    }

    #[tokio::test]
    async fn next_action_clears_the_previous_error() {
        let auth = FakeAuth::new(Err(AuthErrorCode::TooManyAttempts));
        let bus = EventBus::new(16);
        let store = Arc::new(IdentityStore::new(auth.clone(), bus));
        Arc::clone(&store).attach().await;

        let _ = store.sign_in("a@example.com", "pw").await;
        assert!(store.error_message().await.is_some());

        // A fresh action clears the error before awaiting the provider
        let _ = store.sign_in("a@example.com", "pw").await;
        assert_eq!(
            store.error_message().await.as_deref(),
            Some("Too many attempts, please try again later")
        );
    }

    #[tokio::test]
    async fn malformed_credentials_fail_before_the_provider_call() {
        let auth = FakeAuth::new(Ok(()));
        let bus = EventBus::new(16);
        let store = Arc::new(IdentityStore::new(auth, bus));

        assert!(matches!(
            store.sign_in("", "pw").await.unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            store.sign_in("not-an-email", "pw").await.unwrap_err(),
            Error::Validation(_)
        ));
        assert!(matches!(
            store.sign_in("a@example.com", "").await.unwrap_err(),
            Error::Validation(_)
        ));
    }

    #[tokio::test]
    async fn attach_subscribes_exactly_once() {
        let auth = FakeAuth::new(Ok(()));
        let bus = EventBus::new(16);
        let store = Arc::new(IdentityStore::new(auth.clone(), bus.clone()));
        let mut rx = bus.subscribe();

        Arc::clone(&store).attach().await;
        Arc::clone(&store).attach().await;

        auth.push(Some(identity()));
        assert!(wait_for_identity_event(&mut rx).await.is_some());
        // A second subscription would deliver a duplicate event
        let extra = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            wait_for_identity_event(&mut rx),
        )
        .await;
        assert!(extra.is_err());
    }
}
