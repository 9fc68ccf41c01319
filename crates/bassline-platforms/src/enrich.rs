//! Cross-platform search and enrichment.
//!
//! All three catalogs are searched concurrently. Each search is bounded
//! by its own timeout and fills only its own slot, so a slow or failing
//! catalog never affects the others. Totals are computed afterwards in
//! fixed platform order, independent of completion order. Dropping the
//! returned future cancels every in-flight search.

use std::time::Duration;

use bassline_core::model::{EnrichmentResult, Platform, PlatformSlot, TrackRecord};

use crate::client::{log_failure, PlatformSet};
use crate::config::Config;
use crate::error::{PlatformError, PlatformResult};

/// Searches every catalog for an artist and title and aggregates the
/// popularity signals.
#[derive(Debug, Clone)]
pub struct Enricher {
    platforms: PlatformSet,
    search_limit: usize,
    timeout: Duration,
}

impl Enricher {
    /// `search_limit` applies to SoundCloud and YouTube; Spotify always
    /// contributes at most its best match. `timeout` bounds each
    /// platform's search, retries included.
    pub fn new(platforms: PlatformSet, search_limit: usize, timeout: Duration) -> Self {
        Self {
            platforms,
            search_limit: search_limit.max(1),
            timeout,
        }
    }

    /// Build an enricher over the real catalog clients.
    pub fn from_config(config: &Config) -> PlatformResult<Self> {
        Ok(Self::new(
            PlatformSet::from_config(config)?,
            config.search_limit,
            config.platform_timeout(),
        ))
    }

    pub fn platforms(&self) -> &PlatformSet {
        &self.platforms
    }

    fn limit_for(&self, platform: Platform) -> usize {
        match platform {
            Platform::Spotify => 1,
            Platform::SoundCloud | Platform::YouTube => self.search_limit,
        }
    }

    /// Search all catalogs. Never fails: unconfigured or failing
    /// platforms simply contribute an empty slot.
    pub async fn search_all_platforms(&self, artist: &str, title: &str) -> EnrichmentResult {
        let (spotify, soundcloud, youtube) = tokio::join!(
            self.search_slot(Platform::Spotify, artist, title),
            self.search_slot(Platform::SoundCloud, artist, title),
            self.search_slot(Platform::YouTube, artist, title),
        );

        let result = EnrichmentResult::from_slots(spotify, soundcloud, youtube);
        log::info!(
            "Enriched {} - {}: {} platforms, {} plays, {} likes",
            artist,
            title,
            result.platform_count,
            result.total_plays,
            result.total_likes
        );
        result
    }

    async fn search_slot(&self, platform: Platform, artist: &str, title: &str) -> PlatformSlot {
        let client = self.platforms.client(platform);
        if !client.is_configured() {
            log::debug!("Skipping {} search: not configured", platform.display_name());
            return PlatformSlot::not_configured(platform);
        }

        let limit = self.limit_for(platform);
        let outcome = tokio::time::timeout(self.timeout, client.try_search(artist, title, limit))
            .await
            .unwrap_or_else(|_| {
                Err(PlatformError::Timeout {
                    platform,
                    millis: self.timeout.as_millis() as u64,
                })
            });

        match outcome {
            Ok(mut tracks) => {
                tracks.truncate(limit);
                PlatformSlot::found(platform, tracks)
            }
            Err(e) if e.is_not_configured() => PlatformSlot::not_configured(platform),
            Err(e) => {
                log_failure(platform, "search", &e);
                PlatformSlot::failed(platform, e.to_string())
            }
        }
    }

    /// Enrich a stored track with cross-platform data.
    ///
    /// A record without both an artist and a title is returned unchanged.
    pub async fn enrich(&self, mut record: TrackRecord) -> TrackRecord {
        if !record.has_identity() {
            log::debug!("Skipping enrichment: record has no artist or title");
            return record;
        }

        let result = self
            .search_all_platforms(record.artist.trim(), record.title.trim())
            .await;
        record.enrichment = Some(result);
        record
    }
}
