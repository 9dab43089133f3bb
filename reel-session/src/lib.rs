//! # Reel Session
//!
//! The client-side session core: identity, profile and content/watchlist
//! stores, the pure merge reducers they share with the real-time feed, the
//! embedded-player event bridge, and the orchestrator that wires them
//! together over the event bus.
//!
//! Stores are independent typed state machines. Identity flows to the
//! profile store and (identity, profile) flows to the content store as
//! explicit parameters carried by bus events; no store reaches into
//! another's state.

pub mod auth;
pub mod content;
pub mod identity;
pub mod markers;
pub mod merge;
pub mod player;
pub mod profile;
pub mod session;

pub use auth::{AuthErrorCode, AuthProvider};
pub use content::ContentStore;
pub use identity::{IdentityPhase, IdentityStore};
pub use markers::{FileMarkers, MarkerStore, MemoryMarkers};
pub use player::{parse_player_event, PlayerEvent, PlayerEventKind};
pub use profile::ProfileStore;
pub use session::Session;
