//! Configuration loading
//!
//! Values resolve in priority order:
//! 1. Explicit argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file in the platform config directory
//! 4. Compiled default (fallback)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable carrying the catalog API credential
pub const ENV_API_KEY: &str = "REEL_CATALOG_API_KEY";
/// Environment variable overriding the catalog base URL
pub const ENV_BASE_URL: &str = "REEL_CATALOG_BASE_URL";
/// Environment variable overriding the database path
pub const ENV_DB_PATH: &str = "REEL_DATABASE_PATH";

const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";
const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Resolved process configuration
#[derive(Debug, Clone)]
pub struct ReelConfig {
    /// Catalog API credential, sent as a query parameter on every request
    pub catalog_api_key: String,
    /// Catalog API base URL
    pub catalog_base_url: String,
    /// SQLite database location
    pub database_path: PathBuf,
    /// Fixed catalog request timeout
    pub request_timeout: Duration,
}

/// Optional keys read from the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    catalog_api_key: Option<String>,
    catalog_base_url: Option<String>,
    database_path: Option<PathBuf>,
    request_timeout_secs: Option<u64>,
}

impl ReelConfig {
    /// Resolve configuration, with `api_key` as the highest-priority override
    pub fn resolve(api_key: Option<&str>) -> Result<Self> {
        let file = load_config_file().unwrap_or_default();

        let catalog_api_key = api_key
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_API_KEY).ok())
            .or(file.catalog_api_key)
            .ok_or_else(|| {
                Error::Config(format!("catalog API key missing (set {})", ENV_API_KEY))
            })?;

        let catalog_base_url = std::env::var(ENV_BASE_URL)
            .ok()
            .or(file.catalog_base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let database_path = std::env::var(ENV_DB_PATH)
            .ok()
            .map(PathBuf::from)
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let request_timeout =
            Duration::from_secs(file.request_timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS));

        Ok(Self {
            catalog_api_key,
            catalog_base_url,
            database_path,
            request_timeout,
        })
    }
}

/// Read the TOML config file, if one exists
fn load_config_file() -> Result<FileConfig> {
    let path = dirs::config_dir()
        .map(|d| d.join("reel").join("config.toml"))
        .ok_or_else(|| Error::Config("could not determine config directory".to_string()))?;

    if !path.exists() {
        return Err(Error::Config(format!("config file not found: {path:?}")));
    }

    let content = std::fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| Error::Config(format!("invalid config file: {e}")))
}

/// OS-dependent default database location
fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("reel").join("reel.db"))
        .unwrap_or_else(|| PathBuf::from("./reel.db"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn argument_takes_priority_over_environment() {
        std::env::set_var(ENV_API_KEY, "from-env");
        let config = ReelConfig::resolve(Some("from-arg")).unwrap();
        assert_eq!(config.catalog_api_key, "from-arg");
        std::env::remove_var(ENV_API_KEY);
    }

    #[test]
    #[serial]
    fn environment_is_used_when_no_argument() {
        std::env::set_var(ENV_API_KEY, "from-env");
        std::env::remove_var(ENV_BASE_URL);
        let config = ReelConfig::resolve(None).unwrap();
        assert_eq!(config.catalog_api_key, "from-env");
        assert_eq!(config.catalog_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        std::env::remove_var(ENV_API_KEY);
    }
}
