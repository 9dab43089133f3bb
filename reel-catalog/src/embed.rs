//! Embedded player URL construction
//!
//! Playback is delegated to an external iframe player; the client only
//! builds the embed URL and later consumes the player's postMessage events
//! (see `reel-session`'s player bridge).

const EMBED_BASE_URL: &str = "https://www.vidking.net/embed";
const DEFAULT_COLOR: &str = "e50914";

/// Player appearance and behavior options
#[derive(Debug, Clone)]
pub struct EmbedOptions {
    /// Accent color as a hex string without `#`
    pub color: String,
    pub autoplay: bool,
    /// Show the next-episode control (episodic content only)
    pub next_episode: bool,
    /// Show the episode selector (episodic content only)
    pub episode_selector: bool,
    /// Resume position in seconds
    pub resume_from_secs: Option<u32>,
}

impl Default for EmbedOptions {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            autoplay: true,
            next_episode: true,
            episode_selector: true,
            resume_from_secs: None,
        }
    }
}

/// Embed URL for a movie
pub fn movie_embed_url(content_id: u32, options: &EmbedOptions) -> String {
    format!(
        "{}/movie/{}?{}",
        EMBED_BASE_URL,
        content_id,
        base_query(options)
    )
}

/// Embed URL for one episode of a series
pub fn episode_embed_url(
    content_id: u32,
    season: u32,
    episode: u32,
    options: &EmbedOptions,
) -> String {
    format!(
        "{}/tv/{}/{}/{}?{}&nextEpisode={}&episodeSelector={}",
        EMBED_BASE_URL,
        content_id,
        season,
        episode,
        base_query(options),
        options.next_episode,
        options.episode_selector,
    )
}

fn base_query(options: &EmbedOptions) -> String {
    let mut query = format!("color={}&autoPlay={}", options.color, options.autoplay);
    if let Some(progress) = options.resume_from_secs {
        query.push_str(&format!("&progress={}", progress));
    }
    query
}
