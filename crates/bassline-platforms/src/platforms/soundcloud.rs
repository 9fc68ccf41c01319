//! SoundCloud API client.
//!
//! SoundCloud resolves public URLs natively through its `/resolve`
//! endpoint, so URL lookups need no ID extraction. Play and like counts
//! are lifetime counters.

use async_trait::async_trait;
use bassline_core::model::{NormalizedTrack, Platform};
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::client::PlatformClient;
use crate::error::{PlatformError, PlatformResult};
use crate::http;
use crate::platforms::ClientSettings;
use crate::resilience::RateLimiter;

const SOUNDCLOUD_API_BASE: &str = "https://api.soundcloud.com";

const REQUESTS_PER_SECOND: u32 = 5;

/// Immutable SoundCloud client configuration.
#[derive(Debug, Clone)]
pub struct SoundCloudConfig {
    client_id: Option<String>,
    api_base: String,
    settings: ClientSettings,
}

impl SoundCloudConfig {
    pub fn new(client_id: Option<String>, settings: ClientSettings) -> Self {
        Self {
            client_id,
            api_base: SOUNDCLOUD_API_BASE.to_string(),
            settings,
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.client_id.is_some()
    }
}

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

/// Paged search response (`linked_partitioning=1`).
#[derive(Debug, Deserialize)]
struct TrackCollection {
    #[serde(default)]
    collection: Vec<SoundCloudTrack>,
}

#[derive(Debug, Deserialize)]
struct SoundCloudTrack {
    id: u64,
    /// `/resolve` may return a user or playlist; only tracks count.
    #[serde(default = "default_kind")]
    kind: String,
    #[serde(default)]
    title: String,
    user: Option<SoundCloudUser>,
    permalink_url: Option<String>,
    duration: Option<u64>,
    #[serde(default)]
    playback_count: Option<u64>,
    #[serde(default)]
    likes_count: Option<u64>,
    #[serde(default)]
    comment_count: Option<u64>,
    created_at: Option<String>,
    genre: Option<String>,
    description: Option<String>,
    artwork_url: Option<String>,
}

fn default_kind() -> String {
    "track".to_string()
}

#[derive(Debug, Deserialize)]
struct SoundCloudUser {
    username: String,
}

/// SoundCloud has served both RFC 3339 and `2019/08/02 16:00:00 +0000`.
fn parse_created_at(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .or_else(|_| DateTime::parse_from_str(value, "%Y/%m/%d %H:%M:%S %z"))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

impl SoundCloudTrack {
    fn into_normalized(self) -> Option<NormalizedTrack> {
        if self.kind != "track" {
            return None;
        }
        let id = self.id.to_string();
        let canonical_url = self.permalink_url.unwrap_or_default();
        let artist = self.user.map(|u| u.username).unwrap_or_default();

        let mut track = NormalizedTrack::new(Platform::SoundCloud, id, self.title, artist, canonical_url)
            .with_popularity(self.playback_count.unwrap_or(0))
            .with_secondary(self.likes_count.unwrap_or(0))
            .with_extra("genre", self.genre.filter(|g| !g.is_empty()))
            .with_extra("description", self.description.filter(|d| !d.is_empty()))
            .with_extra("artwork_url", self.artwork_url)
            .with_extra("comment_count", self.comment_count);

        if let Some(duration) = self.duration {
            track = track.with_duration_ms(duration);
        }
        if let Some(created_at) = self.created_at.as_deref().and_then(parse_created_at) {
            track = track.with_published_at(created_at);
        }
        Some(track)
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// SoundCloud API client.
#[derive(Debug, Clone)]
pub struct SoundCloudClient {
    http: Client,
    config: SoundCloudConfig,
    rate_limiter: RateLimiter,
}

impl SoundCloudClient {
    /// Create a SoundCloud client.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Client`] if the HTTP client cannot be built.
    pub fn new(config: SoundCloudConfig) -> PlatformResult<Self> {
        Ok(Self {
            http: http::build_client(config.settings.timeout)?,
            config,
            rate_limiter: RateLimiter::new(REQUESTS_PER_SECOND),
        })
    }

    fn client_id(&self) -> PlatformResult<&str> {
        self.config
            .client_id
            .as_deref()
            .ok_or(PlatformError::NotConfigured {
                platform: Platform::SoundCloud,
            })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> PlatformResult<Option<T>> {
        let client_id = self.client_id()?;
        let url = format!("{}{}", self.config.api_base, path);
        http::send_with_retry(
            Platform::SoundCloud,
            &self.config.settings,
            &self.rate_limiter,
            || {
                self.http
                    .get(&url)
                    .query(query)
                    .query(&[("client_id", client_id)])
            },
        )
        .await
    }
}

#[async_trait]
impl PlatformClient for SoundCloudClient {
    fn platform(&self) -> Platform {
        Platform::SoundCloud
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
            ("q", format!("{artist} {title}")),
            ("limit", limit.max(1).to_string()),
            ("linked_partitioning", "1".to_string()),
        ];
        let tracks: Vec<NormalizedTrack> = self
            .get::<TrackCollection>("/tracks", &query)
            .await?
            .map(|page| page.collection)
            .unwrap_or_default()
            .into_iter()
            .filter_map(SoundCloudTrack::into_normalized)
            .take(limit.max(1))
            .collect();
        log::debug!(
            "SoundCloud search for {} - {} returned {} tracks",
            artist,
            title,
            tracks.len()
        );
        Ok(tracks)
    }

    async fn try_track_by_id(&self, id: &str) -> PlatformResult<Option<NormalizedTrack>> {
        Ok(self
            .get::<SoundCloudTrack>(&format!("/tracks/{id}"), &[])
            .await?
            .and_then(SoundCloudTrack::into_normalized))
    }

    async fn try_track_by_url(&self, url: &str) -> PlatformResult<Option<NormalizedTrack>> {
        Ok(self
            .get::<SoundCloudTrack>("/resolve", &[("url", url.to_string())])
            .await?
            .and_then(SoundCloudTrack::into_normalized))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resilience::RetryPolicy;
    use chrono::Datelike;
    use std::time::Duration;

    fn settings() -> ClientSettings {
        ClientSettings::new(Duration::from_secs(2), RetryPolicy::none())
    }

    const SEARCH_JSON: &str = r#"{
        "collection": [
            {
                "id": 123456,
                "kind": "track",
                "title": "Gold (Stupid Love)",
                "user": {"username": "Excision"},
                "permalink_url": "https://soundcloud.com/excision/gold-stupid-love",
                "duration": 215000,
                "playback_count": 1500000,
                "likes_count": 42000,
                "comment_count": 900,
                "created_at": "2019/08/02 16:00:00 +0000",
                "genre": "Dubstep",
                "description": "",
                "artwork_url": null
            },
            {
                "id": 654321,
                "title": "Gold (VIP)",
                "user": {"username": "Excision"},
                "permalink_url": "https://soundcloud.com/excision/gold-vip",
                "created_at": "2020-01-10T12:00:00Z"
            }
        ],
        "next_href": "https://api.soundcloud.com/tracks?cursor=abc"
    }"#;

    #[test]
    fn test_search_translation() {
        let page: TrackCollection = serde_json::from_str(SEARCH_JSON).unwrap();
        let tracks: Vec<_> = page
            .collection
            .into_iter()
            .filter_map(SoundCloudTrack::into_normalized)
            .collect();
        assert_eq!(tracks.len(), 2);

        let gold = &tracks[0];
        assert_eq!(gold.platform_id, "123456");
        assert_eq!(gold.artist, "Excision");
        assert_eq!(gold.popularity_metric, 1_500_000);
        assert_eq!(gold.secondary_metric, 42_000);
        assert_eq!(gold.duration_ms, Some(215_000));
        assert_eq!(gold.raw_extra["genre"], "Dubstep");
        assert_eq!(gold.raw_extra["comment_count"], 900);
        assert!(!gold.raw_extra.contains_key("description"));
        assert!(!gold.raw_extra.contains_key("artwork_url"));
        assert_eq!(gold.published_at.unwrap().year(), 2019);

        // Missing counters read as zero.
        let vip = &tracks[1];
        assert_eq!(vip.popularity_metric, 0);
        assert_eq!(vip.published_at.unwrap().year(), 2020);
    }

    #[test]
    fn test_resolved_non_track_is_ignored() {
        let resolved: SoundCloudTrack = serde_json::from_str(
            r#"{"id": 1, "kind": "user", "username": "excision"}"#,
        )
        .unwrap();
        assert!(resolved.into_normalized().is_none());
    }

    #[test]
    fn test_empty_collection() {
        let page: TrackCollection = serde_json::from_str(r#"{"collection": []}"#).unwrap();
        assert!(page.collection.is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_client_returns_nothing() {
        let client = SoundCloudClient::new(SoundCloudConfig::new(None, settings())).unwrap();
        assert!(!client.is_configured());
        assert!(client.search_tracks("Excision", "Gold", 5).await.is_empty());
        assert!(client
            .get_track_by_url("https://soundcloud.com/excision/gold")
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_to_no_data() {
        let config = SoundCloudConfig::new(Some("sc-id".to_string()), settings())
            .with_api_base("http://127.0.0.1:9");
        let client = SoundCloudClient::new(config).unwrap();
        assert!(client.search_tracks("Excision", "Gold", 5).await.is_empty());
        assert!(client.get_track_by_id("123456").await.is_none());
    }
}
