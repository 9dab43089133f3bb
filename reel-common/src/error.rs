//! Common error types for reel

use thiserror::Error;

/// Common result type for reel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across reel crates
///
/// Validation and invariant variants are raised before any side effect;
/// backend errors pass through `Database` unmodified.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or identifier, rejected before any network call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Identity already has the maximum number of profiles
    #[error("Maximum of 5 profiles allowed")]
    ProfileLimit,

    /// Attempted to delete the only remaining profile
    #[error("Cannot delete the last profile")]
    LastProfile,

    /// Action requires an authenticated identity and a selected profile
    #[error("Not signed in or no profile selected")]
    NoSession,

    /// Authentication failure with a user-safe message
    #[error("{0}")]
    Auth(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}
