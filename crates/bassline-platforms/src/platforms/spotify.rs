//! Spotify Web API client.
//!
//! Authenticates with the client-credentials flow and caches the app
//! token until shortly before it expires. Spotify's `popularity` is a
//! 0-100 score, not a counter; the secondary metric is the track's energy
//! audio feature scaled to the same range.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use bassline_core::model::{NormalizedTrack, Platform};
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::client::{log_failure, PlatformClient};
use crate::error::{PlatformError, PlatformResult};
use crate::http;
use crate::platforms::ClientSettings;
use crate::resilience::RateLimiter;
use crate::url::extract_spotify_id;

const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const SPOTIFY_ACCOUNTS_BASE: &str = "https://accounts.spotify.com";

/// Refresh the token this long before Spotify says it expires.
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

const REQUESTS_PER_SECOND: u32 = 10;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Immutable Spotify client configuration.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    client_id: Option<String>,
    client_secret: Option<String>,
    api_base: String,
    accounts_base: String,
    settings: ClientSettings,
}

impl SpotifyConfig {
    pub fn new(
        client_id: Option<String>,
        client_secret: Option<String>,
        settings: ClientSettings,
    ) -> Self {
        Self {
            client_id,
            client_secret,
            api_base: SPOTIFY_API_BASE.to_string(),
            accounts_base: SPOTIFY_ACCOUNTS_BASE.to_string(),
            settings,
        }
    }

    /// Point the client at different API and accounts hosts.
    #[must_use]
    pub fn with_api_base(
        mut self,
        api_base: impl Into<String>,
        accounts_base: impl Into<String>,
    ) -> Self {
        self.api_base = api_base.into();
        self.accounts_base = accounts_base.into();
        self
    }

    /// Both halves of the credential pair are required.
    pub fn is_configured(&self) -> bool {
        self.client_id.is_some() && self.client_secret.is_some()
    }
}

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    tracks: Option<TrackPage>,
}

#[derive(Debug, Deserialize)]
struct TrackPage {
    #[serde(default)]
    items: Vec<SpotifyTrack>,
}

#[derive(Debug, Deserialize)]
struct SpotifyTrack {
    /// Null for local files.
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<SpotifyArtist>,
    album: Option<SpotifyAlbum>,
    #[serde(default)]
    popularity: u64,
    duration_ms: Option<u64>,
    #[serde(default)]
    explicit: bool,
    preview_url: Option<String>,
    #[serde(default)]
    external_urls: ExternalUrls,
}

#[derive(Debug, Deserialize)]
struct SpotifyArtist {
    name: String,
}

#[derive(Debug, Deserialize)]
struct SpotifyAlbum {
    name: String,
    release_date: Option<String>,
    release_date_precision: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ExternalUrls {
    spotify: Option<String>,
}

/// Parse an album release date, which may carry only a year or a month.
fn parse_release_date(date: &str, precision: Option<&str>) -> Option<DateTime<Utc>> {
    let full = match precision {
        Some("year") => format!("{date}-01-01"),
        Some("month") => format!("{date}-01"),
        _ => date.to_string(),
    };
    NaiveDate::parse_from_str(&full, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Scale an energy value (0.0-1.0) to 0-100.
fn energy_score(features: &Value) -> u64 {
    features
        .get("energy")
        .and_then(Value::as_f64)
        .map(|energy| (energy.clamp(0.0, 1.0) * 100.0).round() as u64)
        .unwrap_or(0)
}

impl SpotifyTrack {
    fn into_normalized(self) -> Option<NormalizedTrack> {
        let id = self.id.filter(|id| !id.is_empty())?;
        let canonical_url = self
            .external_urls
            .spotify
            .unwrap_or_else(|| format!("https://open.spotify.com/track/{id}"));
        let artist = self
            .artists
            .into_iter()
            .next()
            .map(|a| a.name)
            .unwrap_or_default();

        let mut track = NormalizedTrack::new(Platform::Spotify, id, self.name, artist, canonical_url)
            .with_popularity(self.popularity)
            .with_extra("explicit", self.explicit)
            .with_extra("preview_url", self.preview_url);

        if let Some(duration_ms) = self.duration_ms {
            track = track.with_duration_ms(duration_ms);
        }
        if let Some(album) = self.album {
            if let Some(published_at) = album
                .release_date
                .as_deref()
                .and_then(|d| parse_release_date(d, album.release_date_precision.as_deref()))
            {
                track = track.with_published_at(published_at);
            }
            track = track
                .with_extra("album", album.name)
                .with_extra("release_date", album.release_date);
        }
        Some(track)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct AccessToken {
    value: String,
    refresh_at: Instant,
}

impl AccessToken {
    fn new(value: String, expires_in: u64) -> Self {
        let lifetime = Duration::from_secs(expires_in).saturating_sub(TOKEN_REFRESH_MARGIN);
        Self {
            value,
            refresh_at: Instant::now() + lifetime,
        }
    }

    fn is_fresh(&self) -> bool {
        Instant::now() < self.refresh_at
    }
}

/// Spotify Web API client.
///
/// Clones share the cached access token and the rate limiter.
#[derive(Debug, Clone)]
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
    token: Arc<Mutex<Option<AccessToken>>>,
    rate_limiter: RateLimiter,
}

impl SpotifyClient {
    /// Create a Spotify client.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Client`] if the HTTP client cannot be built.
    pub fn new(config: SpotifyConfig) -> PlatformResult<Self> {
        Ok(Self {
            http: http::build_client(config.settings.timeout)?,
            config,
            token: Arc::new(Mutex::new(None)),
            rate_limiter: RateLimiter::new(REQUESTS_PER_SECOND),
        })
    }

    fn credentials(&self) -> PlatformResult<(&str, &str)> {
        match (&self.config.client_id, &self.config.client_secret) {
            (Some(id), Some(secret)) => Ok((id, secret)),
            _ => Err(PlatformError::NotConfigured {
                platform: Platform::Spotify,
            }),
        }
    }

    /// A valid app token, fetched on first use and after expiry.
    async fn access_token(&self) -> PlatformResult<String> {
        let (client_id, client_secret) = self.credentials()?;

        let mut cached = self.token.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh()) {
            return Ok(token.value.clone());
        }

        let url = format!("{}/api/token", self.config.accounts_base);
        let response: TokenResponse = http::send_with_retry(
            Platform::Spotify,
            &self.config.settings,
            &self.rate_limiter,
            || {
                self.http
                    .post(&url)
                    .basic_auth(client_id, Some(client_secret))
                    .form(&[("grant_type", "client_credentials")])
            },
        )
        .await
        .map_err(|e| match e {
            PlatformError::Http { message, status, .. } if status < 500 => PlatformError::Auth {
                platform: Platform::Spotify,
                message: format!("HTTP {status}: {message}"),
            },
            other => other,
        })?
        .ok_or_else(|| PlatformError::Auth {
            platform: Platform::Spotify,
            message: "token endpoint not found".to_string(),
        })?;

        log::debug!("Obtained Spotify access token (expires in {}s)", response.expires_in);
        let token = AccessToken::new(response.access_token, response.expires_in);
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> PlatformResult<Option<T>> {
        let token = self.access_token().await?;
        let url = format!("{}{}", self.config.api_base, path);
        http::send_with_retry(
            Platform::Spotify,
            &self.config.settings,
            &self.rate_limiter,
            || self.http.get(&url).bearer_auth(&token).query(query),
        )
        .await
    }

    /// Raw audio features for a track.
    async fn audio_features(&self, id: &str) -> PlatformResult<Option<Value>> {
        self.get(&format!("/audio-features/{id}"), &[]).await
    }

    /// Attach audio features. A failed lookup keeps the track with a
    /// secondary metric of 0.
    async fn with_audio_features(&self, track: NormalizedTrack) -> NormalizedTrack {
        match self.audio_features(&track.platform_id).await {
            Ok(Some(features)) => track
                .with_secondary(energy_score(&features))
                .with_extra("audio_features", features),
            Ok(None) => track,
            Err(e) => {
                log_failure(Platform::Spotify, "audio features", &e);
                track
            }
        }
    }
}

#[async_trait]
impl PlatformClient for SpotifyClient {
    fn platform(&self) -> Platform {
        Platform::Spotify
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    async fn try_search(
        &self,
        artist: &str,
        title: &str,
        limit: usize,
    ) -> PlatformResult<Vec<NormalizedTrack>> {
        let query = [
            ("q", format!("artist:{artist} track:{title}")),
            ("type", "track".to_string()),
            ("limit", limit.clamp(1, 50).to_string()),
        ];
        let Some(response) = self.get::<SearchResponse>("/search", &query).await? else {
            return Ok(Vec::new());
        };

        let mut tracks = Vec::new();
        for item in response.tracks.map(|page| page.items).unwrap_or_default() {
            if let Some(track) = item.into_normalized() {
                tracks.push(self.with_audio_features(track).await);
            }
        }
        log::debug!("Spotify search for {} - {} returned {} tracks", artist, title, tracks.len());
        Ok(tracks)
    }

    async fn try_track_by_id(&self, id: &str) -> PlatformResult<Option<NormalizedTrack>> {
        let track = self
            .get::<SpotifyTrack>(&format!("/tracks/{id}"), &[])
            .await?
            .and_then(SpotifyTrack::into_normalized);
        match track {
            Some(track) => Ok(Some(self.with_audio_features(track).await)),
            None => Ok(None),
        }
    }

    async fn try_track_by_url(&self, url: &str) -> PlatformResult<Option<NormalizedTrack>> {
        let id = extract_spotify_id(url).ok_or_else(|| PlatformError::InvalidUrl {
            platform: Platform::Spotify,
            url: url.to_string(),
        })?;
        self.try_track_by_id(&id).await
    }
}
