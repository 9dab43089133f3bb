//! # Reel Catalog Client
//!
//! Client for the third-party catalog (metadata) API: trending, popular,
//! top-rated, discovery, details, credits, search, and season/episode
//! lookups, with tiered response caching in front of a single
//! timeout-bearing HTTP transport.

pub mod cache;
pub mod client;
pub mod embed;
pub mod models;
pub mod transport;

pub use cache::{CacheTier, Clock, ResponseCache, SystemClock};
pub use client::{CatalogClient, TimeWindow};
pub use models::{
    CatalogItem, CastMember, Credits, CrewMember, EpisodeDetails, Genre, GenreList, Page,
    SeasonDetails, TitleDetails,
};
pub use transport::{CatalogError, HttpTransport, Transport};
