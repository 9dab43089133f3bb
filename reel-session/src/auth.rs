//! External auth-provider seam
//!
//! The provider owns the actual credential exchange; the identity store only
//! sees its error codes and its identity-change stream. The stream is the
//! single source of truth for session state: it fires on login, logout, and
//! startup session restore.

use async_trait::async_trait;
use reel_common::Identity;
use tokio::sync::broadcast;

/// Provider-agnostic auth failure taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorCode {
    InvalidCredential,
    UserNotFound,
    EmailInUse,
    WeakPassword,
    TooManyAttempts,
    Network,
    Cancelled,
    Other,
}

impl AuthErrorCode {
    /// User-safe message for display; never raw provider error text
    pub fn user_message(&self) -> &'static str {
        match self {
            AuthErrorCode::InvalidCredential => "Invalid email or password",
            AuthErrorCode::UserNotFound => "No account found for this email",
            AuthErrorCode::EmailInUse => "An account with this email already exists",
            AuthErrorCode::WeakPassword => "Password is too weak",
            AuthErrorCode::TooManyAttempts => "Too many attempts, please try again later",
            AuthErrorCode::Network => "Network error, please check your connection",
            AuthErrorCode::Cancelled => "Sign-in was cancelled",
            AuthErrorCode::Other => "Something went wrong, please try again",
        }
    }
}

/// External authentication service
///
/// Action methods resolve when the provider has accepted or rejected the
/// request; the resulting session change arrives on `identity_changes`,
/// never in the action's return value.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<(), AuthErrorCode>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<(), AuthErrorCode>;

    /// Federated (social) sign-in
    async fn sign_in_federated(&self) -> Result<(), AuthErrorCode>;

    async fn sign_out(&self) -> Result<(), AuthErrorCode>;

    /// Subscribe to session changes; `None` means signed out
    fn identity_changes(&self) -> broadcast::Receiver<Option<Identity>>;
}
