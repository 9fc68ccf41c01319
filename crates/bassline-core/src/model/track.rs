use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::platform::Platform;

/// A platform-agnostic projection of a track.
///
/// Every catalog client translates its native response into this shape at
/// its own boundary. The meaning of `popularity_metric` depends on
/// `platform`: a 0-100 score for Spotify, a lifetime play or view count
/// for SoundCloud and YouTube (see [`Platform::reports_counts`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedTrack {
    pub platform: Platform,

    /// Platform-native identifier (Spotify track ID, SoundCloud track ID,
    /// YouTube video ID).
    pub platform_id: String,

    pub title: String,
    pub artist: String,
    pub canonical_url: String,

    /// Popularity score (Spotify) or play/view count (SoundCloud, YouTube).
    #[serde(default)]
    pub popularity_metric: u64,

    /// Like count, or an audio-feature-derived score for Spotify.
    #[serde(default)]
    pub secondary_metric: u64,

    #[serde(default)]
    pub duration_ms: Option<u64>,

    #[serde(default)]
    pub published_at: Option<DateTime<Utc>>,

    /// Platform-specific fields that are not normalized.
    #[serde(default)]
    pub raw_extra: Map<String, Value>,
}

impl NormalizedTrack {
    #[must_use]
    pub fn new(
        platform: Platform,
        platform_id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        canonical_url: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            platform_id: platform_id.into(),
            title: title.into(),
            artist: artist.into(),
            canonical_url: canonical_url.into(),
            popularity_metric: 0,
            secondary_metric: 0,
            duration_ms: None,
            published_at: None,
            raw_extra: Map::new(),
        }
    }

    #[must_use]
    pub fn with_popularity(mut self, popularity: u64) -> Self {
        self.popularity_metric = popularity;
        self
    }

    #[must_use]
    pub fn with_secondary(mut self, secondary: u64) -> Self {
        self.secondary_metric = secondary;
        self
    }

    #[must_use]
    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }

    #[must_use]
    pub fn with_published_at(mut self, published_at: DateTime<Utc>) -> Self {
        self.published_at = Some(published_at);
        self
    }

    /// Attach a platform-specific field. `null` values are skipped.
    #[must_use]
    pub fn with_extra(mut self, key: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        if !value.is_null() {
            self.raw_extra.insert(key.to_string(), value);
        }
        self
    }

    /// A resolved track must be addressable by ID or by URL.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        !self.platform_id.is_empty() || !self.canonical_url.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_track_new() {
        let track = NormalizedTrack::new(
            Platform::SoundCloud,
            "123",
            "Gold (Stupid Love)",
            "Excision",
            "https://soundcloud.com/excision/gold",
        );
        assert_eq!(track.platform, Platform::SoundCloud);
        assert_eq!(track.popularity_metric, 0);
        assert!(track.duration_ms.is_none());
        assert!(track.raw_extra.is_empty());
        assert!(track.is_resolved());
    }

    #[test]
    fn test_track_builder() {
        let track = NormalizedTrack::new(Platform::YouTube, "dQw4w9WgXcQ", "Song", "Channel", "")
            .with_popularity(1_000)
            .with_secondary(42)
            .with_duration_ms(213_000)
            .with_extra("channel", "Channel")
            .with_extra("missing", Value::Null);

        assert_eq!(track.popularity_metric, 1_000);
        assert_eq!(track.secondary_metric, 42);
        assert_eq!(track.duration_ms, Some(213_000));
        assert_eq!(track.raw_extra.get("channel"), Some(&json!("Channel")));
        assert!(!track.raw_extra.contains_key("missing"));
    }

    #[test]
    fn test_track_without_id_or_url_is_unresolved() {
        let track = NormalizedTrack::new(Platform::Spotify, "", "Song", "Artist", "");
        assert!(!track.is_resolved());
    }

    #[test]
    fn test_track_deserializes_with_missing_optionals() {
        let track: NormalizedTrack = serde_json::from_value(json!({
            "platform": "spotify",
            "platform_id": "abc",
            "title": "Song",
            "artist": "Artist",
            "canonical_url": "https://open.spotify.com/track/abc"
        }))
        .unwrap();
        assert_eq!(track.popularity_metric, 0);
        assert!(track.published_at.is_none());
    }
}
