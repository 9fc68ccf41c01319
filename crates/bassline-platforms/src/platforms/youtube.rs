//! YouTube Data API v3 client.
//!
//! Search results carry only snippets, so a search is followed by one
//! batched `videos` call for view/like counts and durations. The API
//! reports counters as decimal strings and durations as ISO-8601.

use std::collections::HashMap;
use std::sync::LazyLock;

use async_trait::async_trait;
use bassline_core::model::{NormalizedTrack, Platform};
use chrono::{DateTime, Utc};
use regex::Regex;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::client::{log_failure, PlatformClient};
use crate::error::{PlatformError, PlatformResult};
use crate::http;
use crate::platforms::ClientSettings;
use crate::resilience::RateLimiter;
use crate::url::extract_youtube_id;

const YOUTUBE_API_BASE: &str = "https://www.googleapis.com/youtube/v3";

/// The "Music" video category.
const MUSIC_CATEGORY_ID: &str = "10";

/// The API caps `maxResults` at 50.
const MAX_RESULTS: usize = 50;

const REQUESTS_PER_SECOND: u32 = 10;

#[allow(clippy::expect_used)]
static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^P(?:(\d+)D)?(?:T(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)(?:\.\d+)?S)?)?$")
        .expect("valid duration pattern")
});

/// Immutable YouTube client configuration.
#[derive(Debug, Clone)]
pub struct YouTubeConfig {
    api_key: Option<String>,
    api_base: String,
    settings: ClientSettings,
}

impl YouTubeConfig {
    pub fn new(api_key: Option<String>, settings: ClientSettings) -> Self {
        Self {
            api_key,
            api_base: YOUTUBE_API_BASE.to_string(),
            settings,
        }
    }

    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

// ---------------------------------------------------------------------------
// API response types (private)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    id: SearchId,
    snippet: Snippet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchId {
    video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
    title: String,
    #[serde(default)]
    channel_title: String,
    #[serde(default)]
    description: String,
    published_at: Option<String>,
    thumbnails: Option<Thumbnails>,
}

#[derive(Debug, Deserialize)]
struct Thumbnails {
    #[serde(rename = "default")]
    small: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoItem {
    id: String,
    snippet: Option<Snippet>,
    #[serde(default)]
    statistics: Statistics,
    #[serde(default)]
    content_details: ContentDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    view_count: Option<String>,
    like_count: Option<String>,
    comment_count: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ContentDetails {
    duration: Option<String>,
}

/// Counters and duration from the `videos` endpoint.
#[derive(Debug, Default)]
struct VideoStats {
    views: u64,
    likes: u64,
    comments: u64,
    duration_iso: Option<String>,
}

fn parse_count(value: Option<&str>) -> u64 {
    value.and_then(|v| v.parse().ok()).unwrap_or(0)
}

impl From<(Statistics, ContentDetails)> for VideoStats {
    fn from((stats, details): (Statistics, ContentDetails)) -> Self {
        Self {
            views: parse_count(stats.view_count.as_deref()),
            likes: parse_count(stats.like_count.as_deref()),
            comments: parse_count(stats.comment_count.as_deref()),
            duration_iso: details.duration,
        }
    }
}

/// Convert an ISO-8601 duration such as `PT1H2M3S` to milliseconds.
pub(crate) fn parse_duration_ms(iso: &str) -> Option<u64> {
    let caps = ISO8601_DURATION.captures(iso)?;
    let part = |i: usize, unit: u64| -> Option<u64> {
        caps.get(i)
            .map_or(Some(0), |m| m.as_str().parse::<u64>().ok())?
            .checked_mul(unit)
    };
    // Out-of-range components yield None.
    part(1, 86_400)?
        .checked_add(part(2, 3_600)?)?
        .checked_add(part(3, 60)?)?
        .checked_add(part(4, 1)?)?
        .checked_mul(1_000)
}

fn video_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={id}")
}

/// Translate a snippet plus optional statistics. Missing statistics leave
/// the counters at zero.
fn to_normalized(id: String, snippet: Snippet, stats: Option<&VideoStats>) -> NormalizedTrack {
    let canonical_url = video_url(&id);
    let channel = snippet.channel_title;
    let mut track = NormalizedTrack::new(Platform::YouTube, id, snippet.title, channel.clone(), canonical_url)
        .with_extra("channel", channel)
        .with_extra("description", Some(snippet.description).filter(|d| !d.is_empty()))
        .with_extra(
            "thumbnail",
            snippet.thumbnails.and_then(|t| t.small).map(|t| t.url),
        );

    if let Some(published_at) = snippet
        .published_at
        .as_deref()
        .and_then(|p| DateTime::parse_from_rfc3339(p).ok())
    {
        track = track.with_published_at(published_at.with_timezone(&Utc));
    }

    if let Some(stats) = stats {
        track = track
            .with_popularity(stats.views)
            .with_secondary(stats.likes)
            .with_extra("comment_count", stats.comments)
            .with_extra("duration_iso", stats.duration_iso.clone());
        if let Some(ms) = stats.duration_iso.as_deref().and_then(parse_duration_ms) {
            track = track.with_duration_ms(ms);
        }
    }
    track
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// YouTube Data API client.
#[derive(Debug, Clone)]
pub struct YouTubeClient {
    http: Client,
    config: YouTubeConfig,
    rate_limiter: RateLimiter,
}

impl YouTubeClient {
    /// Create a YouTube client.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Client`] if the HTTP client cannot be built.
    pub fn new(config: YouTubeConfig) -> PlatformResult<Self> {
        Ok(Self {
            http: http::build_client(config.settings.timeout)?,
            config,
            rate_limiter: RateLimiter::new(REQUESTS_PER_SECOND),
        })
    }

    fn api_key(&self) -> PlatformResult<&str> {
        self.config
            .api_key
            .as_deref()
            .ok_or(PlatformError::NotConfigured {
                platform: Platform::YouTube,
            })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> PlatformResult<Option<T>> {
        let api_key = self.api_key()?;
        let url = format!("{}{}", self.config.api_base, path);
        http::send_with_retry(
            Platform::YouTube,
            &self.config.settings,
            &self.rate_limiter,
            || self.http.get(&url).query(query).query(&[("key", api_key)]),
        )
        .await
    }

    /// Batched statistics lookup, keyed by video ID.
    async fn video_stats(&self, ids: &[&str]) -> PlatformResult<HashMap<String, VideoStats>> {
        let query = [
            ("part", "statistics,contentDetails".to_string()),
            ("id", ids.join(",")),
        ];
        let items = self
            .get::<VideoListResponse>("/videos", &query)
            .await?
            .map(|response| response.items)
            .unwrap_or_default();
        Ok(items
            .into_iter()
            .map(|item| (item.id, VideoStats::from((item.statistics, item.content_details))))
            .collect())
    }
}

#[async_trait]
impl PlatformClient for YouTubeClient {
    fn platform(&self) -> Platform {
        Platform::YouTube
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
        let limit = limit.clamp(1, MAX_RESULTS);
        let query = [
            ("part", "snippet".to_string()),
            ("q", format!("{artist} {title}")),
            ("type", "video".to_string()),
            ("videoCategoryId", MUSIC_CATEGORY_ID.to_string()),
            ("maxResults", limit.to_string()),
        ];
        let Some(response) = self.get::<SearchResponse>("/search", &query).await? else {
            return Ok(Vec::new());
        };

        let hits: Vec<(String, Snippet)> = response
            .items
            .into_iter()
            .filter_map(|item| item.id.video_id.map(|id| (id, item.snippet)))
            .take(limit)
            .collect();
        if hits.is_empty() {
            log::debug!("YouTube search for {} - {} returned no videos", artist, title);
            return Ok(Vec::new());
        }

        let ids: Vec<&str> = hits.iter().map(|(id, _)| id.as_str()).collect();
        let stats = match self.video_stats(&ids).await {
            Ok(stats) => stats,
            Err(e) => {
                log_failure(Platform::YouTube, "statistics", &e);
                HashMap::new()
            }
        };

        Ok(hits
            .into_iter()
            .map(|(id, snippet)| {
                let video_stats = stats.get(&id);
                to_normalized(id, snippet, video_stats)
            })
            .collect())
    }

    async fn try_track_by_id(&self, id: &str) -> PlatformResult<Option<NormalizedTrack>> {
        let query = [
            ("part", "snippet,statistics,contentDetails".to_string()),
            ("id", id.to_string()),
        ];
        let Some(response) = self.get::<VideoListResponse>("/videos", &query).await? else {
            return Ok(None);
        };

        // An unknown ID yields an empty list rather than a 404.
        Ok(response.items.into_iter().find_map(|item| {
            let stats = VideoStats::from((item.statistics, item.content_details));
            item.snippet
                .map(|snippet| to_normalized(item.id, snippet, Some(&stats)))
        }))
    }

    async fn try_track_by_url(&self, url: &str) -> PlatformResult<Option<NormalizedTrack>> {
        let id = extract_youtube_id(url).ok_or_else(|| PlatformError::InvalidUrl {
            platform: Platform::YouTube,
            url: url.to_string(),
        })?;
        self.try_track_by_id(&id).await
    }
}
