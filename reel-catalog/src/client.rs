//! Catalog API client
//!
//! Every call goes through [`CatalogClient::fetch`]: validate inputs, check
//! the tiered cache, and only then touch the transport. Failed calls are
//! never retried automatically; the caller re-invokes.

use crate::cache::{canonical_key, CacheTier, ResponseCache, SystemClock, DEFAULT_CAPACITY};
use crate::models::{CatalogItem, Credits, EpisodeDetails, GenreList, Page, SeasonDetails, TitleDetails};
use crate::transport::{CatalogError, HttpTransport, Transport};
use reel_common::config::ReelConfig;
use reel_common::sanitize::{clamp_page, normalize_query, validate_content_id};
use reel_common::{ContentType, Error};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Trending window granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

/// Upstream path segment for a content kind ("tv", not "series", on the wire)
fn api_segment(kind: ContentType) -> &'static str {
    match kind {
        ContentType::Movie => "movie",
        ContentType::Series => "tv",
    }
}

fn page_param(page: u32) -> (String, String) {
    ("page".to_string(), clamp_page(page).to_string())
}

fn invalid(err: Error) -> CatalogError {
    CatalogError::InvalidQuery(err.to_string())
}

/// Catalog API client with tiered response caching
pub struct CatalogClient<T: Transport = HttpTransport> {
    transport: T,
    cache: Mutex<ResponseCache>,
}

impl CatalogClient<HttpTransport> {
    /// Build a client from resolved configuration
    pub fn new(config: &ReelConfig) -> Result<Self, CatalogError> {
        let transport = HttpTransport::new(
            &config.catalog_base_url,
            &config.catalog_api_key,
            config.request_timeout,
        )?;
        Ok(Self::with_transport(
            transport,
            ResponseCache::new(DEFAULT_CAPACITY, Arc::new(SystemClock)),
        ))
    }
}

impl<T: Transport> CatalogClient<T> {
    /// Build a client over an explicit transport and cache (test seam)
    pub fn with_transport(transport: T, cache: ResponseCache) -> Self {
        Self {
            transport,
            cache: Mutex::new(cache),
        }
    }

    /// Cache-through request shared by every endpoint
    async fn fetch<R: DeserializeOwned>(
        &self,
        tier: CacheTier,
        path: &str,
        params: &[(String, String)],
    ) -> Result<R, CatalogError> {
        let key = canonical_key(path, params);

        if let Some(cached) = self.cache.lock().await.get(&key) {
            return serde_json::from_value(cached).map_err(|_| CatalogError::Parse);
        }

        // Parse before caching: a malformed payload must not be re-served
        // from cache until its TTL expires
        let payload = self.transport.get(path, params).await?;
        let parsed = serde_json::from_value(payload.clone()).map_err(|_| CatalogError::Parse)?;
        self.cache.lock().await.put(key, payload, tier);
        Ok(parsed)
    }

    /// Trending titles across all media kinds
    pub async fn trending(&self, window: TimeWindow) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(
            CacheTier::Trending,
            &format!("/trending/all/{}", window.as_str()),
            &[],
        )
        .await
    }

    pub async fn popular(
        &self,
        kind: ContentType,
        page: u32,
    ) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(
            CacheTier::Popular,
            &format!("/{}/popular", api_segment(kind)),
            &[page_param(page)],
        )
        .await
    }

    pub async fn top_rated(
        &self,
        kind: ContentType,
        page: u32,
    ) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(
            CacheTier::TopRated,
            &format!("/{}/top_rated", api_segment(kind)),
            &[page_param(page)],
        )
        .await
    }

    pub async fn now_playing(&self, page: u32) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(CacheTier::Popular, "/movie/now_playing", &[page_param(page)])
            .await
    }

    pub async fn upcoming(&self, page: u32) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(CacheTier::Popular, "/movie/upcoming", &[page_param(page)])
            .await
    }

    pub async fn airing_today(&self, page: u32) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(CacheTier::Popular, "/tv/airing_today", &[page_param(page)])
            .await
    }

    pub async fn on_the_air(&self, page: u32) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(CacheTier::Popular, "/tv/on_the_air", &[page_param(page)])
            .await
    }

    pub async fn genres(&self, kind: ContentType) -> Result<GenreList, CatalogError> {
        self.fetch(
            CacheTier::Genres,
            &format!("/genre/{}/list", api_segment(kind)),
            &[],
        )
        .await
    }

    /// Discovery listing for one genre, most popular first
    pub async fn discover_by_genre(
        &self,
        kind: ContentType,
        genre_id: u32,
        page: u32,
    ) -> Result<Page<CatalogItem>, CatalogError> {
        self.fetch(
            CacheTier::Popular,
            &format!("/discover/{}", api_segment(kind)),
            &[
                ("with_genres".to_string(), genre_id.to_string()),
                page_param(page),
                ("sort_by".to_string(), "popularity.desc".to_string()),
            ],
        )
        .await
    }

    /// Full details with credits, similar titles and videos appended
    pub async fn details(
        &self,
        kind: ContentType,
        id: u32,
    ) -> Result<TitleDetails, CatalogError> {
        let id = validate_content_id(id).map_err(invalid)?;
        self.fetch(
            CacheTier::Details,
            &format!("/{}/{}", api_segment(kind), id),
            &[(
                "append_to_response".to_string(),
                "credits,similar,videos".to_string(),
            )],
        )
        .await
    }

    pub async fn credits(&self, kind: ContentType, id: u32) -> Result<Credits, CatalogError> {
        let id = validate_content_id(id).map_err(invalid)?;
        self.fetch(
            CacheTier::Details,
            &format!("/{}/{}/credits", api_segment(kind), id),
            &[],
        )
        .await
    }

    pub async fn similar(
        &self,
        kind: ContentType,
        id: u32,
        page: u32,
    ) -> Result<Page<CatalogItem>, CatalogError> {
        let id = validate_content_id(id).map_err(invalid)?;
        self.fetch(
            CacheTier::Popular,
            &format!("/{}/{}/similar", api_segment(kind), id),
            &[page_param(page)],
        )
        .await
    }

    /// Multi-kind search; query is trimmed, capped, and must be non-empty
    pub async fn search(&self, query: &str, page: u32) -> Result<Page<CatalogItem>, CatalogError> {
        self.search_endpoint("/search/multi", query, page).await
    }

    pub async fn search_movies(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Page<CatalogItem>, CatalogError> {
        self.search_endpoint("/search/movie", query, page).await
    }

    pub async fn search_series(
        &self,
        query: &str,
        page: u32,
    ) -> Result<Page<CatalogItem>, CatalogError> {
        self.search_endpoint("/search/tv", query, page).await
    }

    async fn search_endpoint(
        &self,
        path: &str,
        query: &str,
        page: u32,
    ) -> Result<Page<CatalogItem>, CatalogError> {
        let query = normalize_query(query).map_err(invalid)?;
        self.fetch(
            CacheTier::Search,
            path,
            &[
                ("query".to_string(), query),
                page_param(page),
                ("include_adult".to_string(), "false".to_string()),
            ],
        )
        .await
    }

    pub async fn season(
        &self,
        series_id: u32,
        season_number: u32,
    ) -> Result<SeasonDetails, CatalogError> {
        let series_id = validate_content_id(series_id).map_err(invalid)?;
        self.fetch(
            CacheTier::Details,
            &format!("/tv/{}/season/{}", series_id, season_number),
            &[],
        )
        .await
    }

    pub async fn episode(
        &self,
        series_id: u32,
        season_number: u32,
        episode_number: u32,
    ) -> Result<EpisodeDetails, CatalogError> {
        let series_id = validate_content_id(series_id).map_err(invalid)?;
        self.fetch(
            CacheTier::Details,
            &format!(
                "/tv/{}/season/{}/episode/{}",
                series_id, season_number, episode_number
            ),
            &[],
        )
        .await
    }
}
