//! Catalog API response payloads
//!
//! Field names follow the upstream JSON. Movies carry `title`/`release_date`
//! while series carry `name`/`first_air_date`; the accessor methods paper
//! over that split so callers never branch on media kind.

use reel_common::{AgeRating, ContentType};
use serde::{Deserialize, Serialize};

/// Image CDN base for poster/backdrop paths
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p";

/// One list entry (movie or series) from a catalog listing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: u32,
    pub title: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub release_date: Option<String>,
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
    pub media_type: Option<String>,
    #[serde(default)]
    pub adult: bool,
    pub original_language: Option<String>,
    #[serde(default)]
    pub popularity: f64,
}

impl CatalogItem {
    /// Display title, regardless of media kind
    pub fn display_title(&self) -> &str {
        self.title
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("Unknown Title")
    }

    /// Release date, regardless of media kind
    pub fn release_date(&self) -> Option<&str> {
        self.release_date.as_deref().or(self.first_air_date.as_deref())
    }

    /// Four-digit release year, when a date is present
    pub fn release_year(&self) -> Option<&str> {
        self.release_date().filter(|d| d.len() >= 4).map(|d| &d[..4])
    }

    /// Content kind: the explicit media_type tag when present, otherwise
    /// inferred from which title field the payload carries
    pub fn content_type(&self) -> ContentType {
        match self.media_type.as_deref() {
            Some("movie") => ContentType::Movie,
            Some("tv") => ContentType::Series,
            _ if self.title.is_some() => ContentType::Movie,
            _ => ContentType::Series,
        }
    }

    pub fn poster_url(&self, size: &str) -> Option<String> {
        self.poster_path.as_deref().map(|p| image_url(p, size))
    }

    pub fn backdrop_url(&self, size: &str) -> Option<String> {
        self.backdrop_path.as_deref().map(|p| image_url(p, size))
    }
}

/// Build a full image CDN URL from a path fragment
pub fn image_url(path: &str, size: &str) -> String {
    format!("{}/{}{}", IMAGE_BASE_URL, size, path)
}

/// Paginated listing response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "first_page")]
    pub page: u32,
    pub results: Vec<T>,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

/// Full detail record for one title, with appended credits and similar titles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TitleDetails {
    #[serde(flatten)]
    pub item: CatalogItem,
    #[serde(default)]
    pub genres: Vec<Genre>,
    pub runtime: Option<u32>,
    pub number_of_seasons: Option<u32>,
    pub number_of_episodes: Option<u32>,
    pub status: Option<String>,
    pub tagline: Option<String>,
    pub homepage: Option<String>,
    pub credits: Option<Credits>,
    pub similar: Option<Page<CatalogItem>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CastMember {
    pub id: u32,
    pub name: String,
    pub character: Option<String>,
    pub profile_path: Option<String>,
    #[serde(default)]
    pub order: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewMember {
    pub id: u32,
    pub name: String,
    pub job: Option<String>,
    pub department: Option<String>,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonDetails {
    pub season_number: u32,
    pub name: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
    pub air_date: Option<String>,
    #[serde(default)]
    pub episodes: Vec<EpisodeDetails>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeDetails {
    pub season_number: u32,
    pub episode_number: u32,
    pub name: Option<String>,
    #[serde(default)]
    pub overview: String,
    pub still_path: Option<String>,
    pub air_date: Option<String>,
    pub runtime: Option<u32>,
}

/// Drop repeated (id, kind) entries, keeping first occurrence order
pub fn dedup_items(items: Vec<CatalogItem>) -> Vec<CatalogItem> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert((item.id, item.content_type())))
        .collect()
}

/// Filter a listing down to what a profile's age rating may see
pub fn filter_by_age(items: Vec<CatalogItem>, rating: AgeRating) -> Vec<CatalogItem> {
    match rating {
        AgeRating::Kids => items
            .into_iter()
            .filter(|i| !i.adult && i.vote_average >= 6.0)
            .collect(),
        AgeRating::Teen => items.into_iter().filter(|i| !i.adult).collect(),
        AgeRating::Adult => items,
    }
}
