use anyhow::{Context, Result};
use confyg::{env, Confygery};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::platforms::soundcloud::SoundCloudConfig;
use crate::platforms::spotify::SpotifyConfig;
use crate::platforms::youtube::YouTubeConfig;
use crate::platforms::ClientSettings;
use crate::resilience::RetryPolicy;

/// Configuration for bassline.
///
/// Configuration is loaded from multiple sources with the following priority:
/// 1. CLI arguments (highest priority)
/// 2. Environment variables (BASS_* prefix)
/// 3. Config file (~/.config/bassline/config.toml)
/// 4. Built-in defaults (lowest priority)
///
/// Missing credentials are not an error: the affected platform simply
/// never returns data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Spotify client ID for the client-credentials flow.
    ///
    /// Can be set via:
    /// - ENV: BASS_SPOTIFY_CLIENT_ID
    /// - Config: spotify_client_id = "..."
    pub spotify_client_id: Option<String>,

    /// Spotify client secret.
    ///
    /// Can be set via:
    /// - ENV: BASS_SPOTIFY_CLIENT_SECRET
    /// - Config: spotify_client_secret = "..."
    pub spotify_client_secret: Option<String>,

    /// SoundCloud client ID.
    ///
    /// Can be set via:
    /// - ENV: BASS_SOUNDCLOUD_CLIENT_ID
    /// - Config: soundcloud_client_id = "..."
    pub soundcloud_client_id: Option<String>,

    /// YouTube Data API key.
    ///
    /// Can be set via:
    /// - ENV: BASS_YOUTUBE_API_KEY
    /// - Config: youtube_api_key = "..."
    pub youtube_api_key: Option<String>,

    /// Timeout for each outbound call, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Maximum results for list searches (SoundCloud, YouTube).
    #[serde(default = "default_search_limit")]
    pub search_limit: usize,

    /// Retries for transient failures of read calls.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Path to the response cache database.
    ///
    /// Can be set via:
    /// - CLI: --cache /path/to/cache.db
    /// - ENV: BASS_CACHE_PATH
    /// - Config: cache_path = "/path/to/cache.db"
    /// - Default: ~/.local/share/bassline/cache.db
    #[serde(default = "default_cache_path")]
    pub cache_path: PathBuf,

    /// Lifetime of cached enrichment results, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            spotify_client_id: None,
            spotify_client_secret: None,
            soundcloud_client_id: None,
            youtube_api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
            search_limit: default_search_limit(),
            max_retries: default_max_retries(),
            cache_path: default_cache_path(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Searches for config file at: ~/.config/bassline/config.toml
    /// Reads environment variables with BASS_ prefix.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self> {
        let config_path = config_file_path();

        let mut builder = Confygery::new()
            .context("Failed to create config builder")?;

        if config_path.exists() {
            let path_str = config_path.to_str()
                .ok_or_else(|| anyhow::anyhow!("Config path contains invalid UTF-8"))?;
            builder.add_file(path_str)
                .context("Failed to load config file")?;
        }

        let env_opts = env::Options::with_top_level("bass");
        builder.add_env(env_opts)
            .context("Failed to load environment variables")?;

        let config: Self = builder.build()
            .context("Failed to build configuration")?;

        Ok(config)
    }

    /// Load configuration with a custom cache path.
    ///
    /// This is used when the --cache CLI flag is provided.
    pub fn load_with_cache_path(cache_path: PathBuf) -> Result<Self> {
        let mut config = Self::load()?;
        config.cache_path = cache_path;
        Ok(config)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }

    /// Upper bound for one platform's whole operation: every attempt of
    /// every call it makes.
    pub fn platform_timeout(&self) -> Duration {
        let attempts = u32::try_from(self.max_retries)
            .unwrap_or(u32::MAX)
            .saturating_add(1);
        self.request_timeout()
            .checked_mul(attempts)
            .unwrap_or(Duration::MAX)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Timeout and retry settings shared by every client.
    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings::new(self.request_timeout(), RetryPolicy::new(self.max_retries))
    }

    pub fn spotify(&self) -> SpotifyConfig {
        SpotifyConfig::new(
            credential(self.spotify_client_id.as_ref()),
            credential(self.spotify_client_secret.as_ref()),
            self.client_settings(),
        )
    }

    pub fn soundcloud(&self) -> SoundCloudConfig {
        SoundCloudConfig::new(
            credential(self.soundcloud_client_id.as_ref()),
            self.client_settings(),
        )
    }

    pub fn youtube(&self) -> YouTubeConfig {
        YouTubeConfig::new(credential(self.youtube_api_key.as_ref()), self.client_settings())
    }

    /// Names of the credentials that are not set.
    pub fn missing_credentials(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if credential(self.spotify_client_id.as_ref()).is_none() {
            missing.push("spotify_client_id");
        }
        if credential(self.spotify_client_secret.as_ref()).is_none() {
            missing.push("spotify_client_secret");
        }
        if credential(self.soundcloud_client_id.as_ref()).is_none() {
            missing.push("soundcloud_client_id");
        }
        if credential(self.youtube_api_key.as_ref()).is_none() {
            missing.push("youtube_api_key");
        }
        missing
    }
}

/// Blank credentials count as absent.
fn credential(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_search_limit() -> usize {
    5
}

fn default_max_retries() -> usize {
    2
}

fn default_cache_ttl_secs() -> u64 {
    300
}

/// Get the default cache database path.
///
/// Returns: ~/.local/share/bassline/cache.db (or platform equivalent)
fn default_cache_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bassline")
        .join("cache.db")
}

/// Get the config file path.
///
/// Returns:
/// - Linux: ~/.config/bassline/config.toml
/// - macOS: ~/Library/Application Support/bassline/config.toml
/// - Windows: %APPDATA%\bassline\config.toml
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("bassline")
        .join("config.toml")
}

/// Get the example config file content.
pub fn example_config() -> &'static str {
    r#"# Bassline Configuration File
#
# Configuration is loaded from multiple sources with the following priority:
# 1. CLI arguments (highest priority)
# 2. Environment variables (BASS_* prefix)
# 3. This config file
# 4. Built-in defaults (lowest priority)
#
# Every credential is optional. A platform without credentials is skipped
# and simply contributes no data to verification or enrichment.

# Spotify client-credentials pair
# Create an app at: https://developer.spotify.com/dashboard
#
# Can also be set via:
# - Environment: BASS_SPOTIFY_CLIENT_ID / BASS_SPOTIFY_CLIENT_SECRET
#spotify_client_id = "your-spotify-client-id"
#spotify_client_secret = "your-spotify-client-secret"

# SoundCloud client ID
#
# Can also be set via:
# - Environment: BASS_SOUNDCLOUD_CLIENT_ID
#soundcloud_client_id = "your-soundcloud-client-id"

# YouTube Data API v3 key
#
# Can also be set via:
# - Environment: BASS_YOUTUBE_API_KEY
#youtube_api_key = "your-youtube-api-key"

# Timeout for each outbound request, in seconds
#request_timeout_secs = 10

# Maximum number of SoundCloud and YouTube search results
#search_limit = 5

# Retries for transient failures (5xx, 429, network errors)
#max_retries = 2

# Response cache database and entry lifetime
#cache_path = "/path/to/custom/cache.db"
#cache_ttl_secs = 300
"#
}

/// Create default config file if it doesn't exist.
///
/// Returns true if a new file was created, false if it already existed.
pub fn ensure_config_file() -> Result<bool> {
    let config_path = config_file_path();

    if config_path.exists() {
        return Ok(false);
    }

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)
            .context("Failed to create config directory")?;
    }

    std::fs::write(&config_path, example_config())
        .context("Failed to write config file")?;

    Ok(true)
}
