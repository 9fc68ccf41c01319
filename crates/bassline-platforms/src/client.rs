//! The platform client contract and the set of configured clients.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use bassline_core::model::{NormalizedTrack, Platform};

use crate::config::Config;
use crate::error::{PlatformError, PlatformResult};
use crate::platforms::{SoundCloudClient, SpotifyClient, YouTubeClient};

/// A client for one external music catalog.
///
/// Implementors provide the `try_*` operations, which report an explicit
/// failure reason. The provided methods are the public contract: they
/// collapse every failure into absence of data and log the reason, so a
/// caller never sees an error from a catalog.
#[async_trait]
pub trait PlatformClient: fmt::Debug + Send + Sync {
    /// The catalog this client talks to.
    fn platform(&self) -> Platform;

    /// Whether credentials are present. An unconfigured client never
    /// issues a request.
    fn is_configured(&self) -> bool;

    /// Search by artist and title, best match first, at most `limit`
    /// results.
    async fn try_search(
        &self,
        artist: &str,
        title: &str,
        limit: usize,
    ) -> PlatformResult<Vec<NormalizedTrack>>;

    /// Fetch full detail for a platform-native ID.
    async fn try_track_by_id(&self, id: &str) -> PlatformResult<Option<NormalizedTrack>>;

    /// Resolve a platform URL to full detail.
    async fn try_track_by_url(&self, url: &str) -> PlatformResult<Option<NormalizedTrack>>;

    async fn search_tracks(&self, artist: &str, title: &str, limit: usize) -> Vec<NormalizedTrack> {
        match self.try_search(artist, title, limit).await {
            Ok(tracks) => tracks,
            Err(e) => {
                log_failure(self.platform(), "search", &e);
                Vec::new()
            }
        }
    }

    /// The best match for an artist and title, if any.
    async fn search_track(&self, artist: &str, title: &str) -> Option<NormalizedTrack> {
        self.search_tracks(artist, title, 1).await.into_iter().next()
    }

    async fn get_track_by_id(&self, id: &str) -> Option<NormalizedTrack> {
        match self.try_track_by_id(id).await {
            Ok(track) => track,
            Err(e) => {
                log_failure(self.platform(), "track lookup", &e);
                None
            }
        }
    }

    async fn get_track_by_url(&self, url: &str) -> Option<NormalizedTrack> {
        match self.try_track_by_url(url).await {
            Ok(track) => track,
            Err(e) => {
                log_failure(self.platform(), "URL lookup", &e);
                None
            }
        }
    }
}

/// Log a degraded call. Unconfigured platforms are expected and only
/// noted at debug level.
pub(crate) fn log_failure(platform: Platform, operation: &str, err: &PlatformError) {
    if err.is_not_configured() {
        log::debug!("Skipping {} {}: not configured", platform.display_name(), operation);
    } else {
        log::warn!("{} {} failed: {}", platform.display_name(), operation, err);
    }
}

/// One client per catalog, shared by the orchestrators.
#[derive(Debug, Clone)]
pub struct PlatformSet {
    spotify: Arc<dyn PlatformClient>,
    soundcloud: Arc<dyn PlatformClient>,
    youtube: Arc<dyn PlatformClient>,
}

impl PlatformSet {
    /// Assemble a set from explicit clients.
    pub fn new(
        spotify: Arc<dyn PlatformClient>,
        soundcloud: Arc<dyn PlatformClient>,
        youtube: Arc<dyn PlatformClient>,
    ) -> Self {
        Self {
            spotify,
            soundcloud,
            youtube,
        }
    }

    /// Build the real catalog clients from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Client`] if an HTTP client cannot be built.
    pub fn from_config(config: &Config) -> PlatformResult<Self> {
        Ok(Self::new(
            Arc::new(SpotifyClient::new(config.spotify())?),
            Arc::new(SoundCloudClient::new(config.soundcloud())?),
            Arc::new(YouTubeClient::new(config.youtube())?),
        ))
    }

    pub fn client(&self, platform: Platform) -> &dyn PlatformClient {
        match platform {
            Platform::Spotify => self.spotify.as_ref(),
            Platform::SoundCloud => self.soundcloud.as_ref(),
            Platform::YouTube => self.youtube.as_ref(),
        }
    }

    /// Platforms with credentials, in fixed platform order.
    pub fn enabled_platforms(&self) -> Vec<Platform> {
        Platform::ALL
            .into_iter()
            .filter(|p| self.client(*p).is_configured())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FixedClient {
        platform: Platform,
        configured: bool,
        tracks: Vec<NormalizedTrack>,
    }

    impl FixedClient {
        fn new(platform: Platform, count: usize) -> Self {
            let tracks = (0..count)
                .map(|i| {
                    NormalizedTrack::new(
                        platform,
                        format!("id-{i}"),
                        "Gold",
                        "Excision",
                        format!("https://example.com/{i}"),
                    )
                })
                .collect();
            Self {
                platform,
                configured: true,
                tracks,
            }
        }

        fn unconfigured(platform: Platform) -> Self {
            Self {
                platform,
                configured: false,
                tracks: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl PlatformClient for FixedClient {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn is_configured(&self) -> bool {
            self.configured
        }

        async fn try_search(
            &self,
            _artist: &str,
            _title: &str,
            limit: usize,
        ) -> PlatformResult<Vec<NormalizedTrack>> {
            if !self.configured {
                return Err(PlatformError::NotConfigured {
                    platform: self.platform,
                });
            }
            Ok(self.tracks.iter().take(limit).cloned().collect())
        }

        async fn try_track_by_id(&self, id: &str) -> PlatformResult<Option<NormalizedTrack>> {
            Ok(self.tracks.iter().find(|t| t.platform_id == id).cloned())
        }

        async fn try_track_by_url(&self, _url: &str) -> PlatformResult<Option<NormalizedTrack>> {
            Err(PlatformError::Http {
                platform: self.platform,
                status: 500,
                message: "Internal Server Error".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_search_track_returns_best_match() {
        let client = FixedClient::new(Platform::SoundCloud, 3);
        let best = client.search_track("Excision", "Gold").await.unwrap();
        assert_eq!(best.platform_id, "id-0");
        assert_eq!(client.search_tracks("Excision", "Gold", 2).await.len(), 2);
    }

    #[tokio::test]
    async fn test_failures_collapse_to_absence() {
        let client = FixedClient::new(Platform::YouTube, 1);
        assert!(client.get_track_by_url("https://youtu.be/x").await.is_none());

        let unconfigured = FixedClient::unconfigured(Platform::YouTube);
        assert!(unconfigured.search_tracks("a", "b", 5).await.is_empty());
        assert!(unconfigured.search_track("a", "b").await.is_none());
    }

    #[tokio::test]
    async fn test_get_track_by_id() {
        let client = FixedClient::new(Platform::Spotify, 2);
        assert!(client.get_track_by_id("id-1").await.is_some());
        assert!(client.get_track_by_id("missing").await.is_none());
    }

    #[test]
    fn test_enabled_platforms_in_fixed_order() {
        let set = PlatformSet::new(
            Arc::new(FixedClient::new(Platform::Spotify, 0)),
            Arc::new(FixedClient::unconfigured(Platform::SoundCloud)),
            Arc::new(FixedClient::new(Platform::YouTube, 0)),
        );
        assert_eq!(
            set.enabled_platforms(),
            vec![Platform::Spotify, Platform::YouTube]
        );
        assert_eq!(set.client(Platform::SoundCloud).platform(), Platform::SoundCloud);
    }

    #[test]
    fn test_from_default_config_has_nothing_enabled() {
        let set = PlatformSet::from_config(&Config::default()).unwrap();
        assert!(set.enabled_platforms().is_empty());
        assert_eq!(set.client(Platform::YouTube).platform(), Platform::YouTube);
    }
}
