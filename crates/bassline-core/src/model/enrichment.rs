//! Cross-platform enrichment results.
//!
//! An [`EnrichmentResult`] holds one [`PlatformSlot`] per catalog plus the
//! totals derived from them. Aggregation always walks the slots in the
//! fixed order of [`Platform::ALL`], so the totals never depend on which
//! platform answered first.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::platform::Platform;
use crate::model::track::NormalizedTrack;

/// Why a platform slot holds the tracks it does.
///
/// Consumers that only care about data can ignore this and look at
/// [`PlatformSlot::tracks`]; "not found" and "failed" both leave it empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlotStatus {
    /// The platform returned at least one track.
    Found,
    /// The platform answered but had no matching track.
    NotFound,
    /// No credentials are configured for the platform.
    NotConfigured,
    /// The call failed (transport, non-2xx, malformed payload, timeout).
    Failed { reason: String },
}

/// One platform's contribution to an enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformSlot {
    pub platform: Platform,
    pub status: SlotStatus,
    /// Results in the platform's own ranking order, best first.
    #[serde(default)]
    pub tracks: Vec<NormalizedTrack>,
}

impl PlatformSlot {
    /// A slot for a platform that answered. An empty result is `NotFound`.
    #[must_use]
    pub fn found(platform: Platform, tracks: Vec<NormalizedTrack>) -> Self {
        let status = if tracks.is_empty() {
            SlotStatus::NotFound
        } else {
            SlotStatus::Found
        };
        Self {
            platform,
            status,
            tracks,
        }
    }

    #[must_use]
    pub fn not_configured(platform: Platform) -> Self {
        Self {
            platform,
            status: SlotStatus::NotConfigured,
            tracks: Vec::new(),
        }
    }

    #[must_use]
    pub fn failed(platform: Platform, reason: impl Into<String>) -> Self {
        Self {
            platform,
            status: SlotStatus::Failed {
                reason: reason.into(),
            },
            tracks: Vec::new(),
        }
    }

    /// The platform's best match, if any.
    #[must_use]
    pub fn best(&self) -> Option<&NormalizedTrack> {
        self.tracks.first()
    }

    #[must_use]
    pub fn has_results(&self) -> bool {
        !self.tracks.is_empty()
    }
}

/// Aggregated cross-platform signals for one (artist, title) pair.
///
/// Constructed fresh on every enrichment and never mutated afterwards;
/// callers own persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub spotify: PlatformSlot,
    pub soundcloud: PlatformSlot,
    pub youtube: PlatformSlot,

    /// Number of platforms that returned at least one track.
    pub platform_count: u32,

    /// Sum of the best SoundCloud play count and the best YouTube view
    /// count. Spotify's 0-100 popularity score is never included.
    pub total_plays: u64,

    /// Sum of the best SoundCloud and YouTube like counts.
    pub total_likes: u64,

    pub enriched_at: DateTime<Utc>,
}

impl EnrichmentResult {
    /// Aggregate three platform slots, stamping the result with the
    /// current time.
    #[must_use]
    pub fn from_slots(spotify: PlatformSlot, soundcloud: PlatformSlot, youtube: PlatformSlot) -> Self {
        Self::from_slots_at(spotify, soundcloud, youtube, Utc::now())
    }

    #[must_use]
    pub fn from_slots_at(
        spotify: PlatformSlot,
        soundcloud: PlatformSlot,
        youtube: PlatformSlot,
        enriched_at: DateTime<Utc>,
    ) -> Self {
        let mut platform_count = 0;
        let mut total_plays: u64 = 0;
        let mut total_likes: u64 = 0;

        for slot in [&spotify, &soundcloud, &youtube] {
            if !slot.has_results() {
                continue;
            }
            platform_count += 1;

            if !slot.platform.reports_counts() {
                continue;
            }
            if let Some(best) = slot.best() {
                total_plays = total_plays.saturating_add(best.popularity_metric);
                total_likes = total_likes.saturating_add(best.secondary_metric);
            }
        }

        Self {
            spotify,
            soundcloud,
            youtube,
            platform_count,
            total_plays,
            total_likes,
            enriched_at,
        }
    }

    /// An enrichment where no platform contributed anything.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_slots(
            PlatformSlot::not_configured(Platform::Spotify),
            PlatformSlot::not_configured(Platform::SoundCloud),
            PlatformSlot::not_configured(Platform::YouTube),
        )
    }

    /// The slots in aggregation order.
    #[must_use]
    pub fn slots(&self) -> [&PlatformSlot; 3] {
        [&self.spotify, &self.soundcloud, &self.youtube]
    }

    /// Returns `true` if any platform call failed rather than answering.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.slots()
            .iter()
            .any(|slot| matches!(slot.status, SlotStatus::Failed { .. }))
    }

    #[must_use]
    pub fn slot(&self, platform: Platform) -> &PlatformSlot {
        match platform {
            Platform::Spotify => &self.spotify,
            Platform::SoundCloud => &self.soundcloud,
            Platform::YouTube => &self.youtube,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(platform: Platform, plays: u64, likes: u64) -> NormalizedTrack {
        NormalizedTrack::new(platform, "id", "Title", "Artist", "https://example.com")
            .with_popularity(plays)
            .with_secondary(likes)
    }

    #[test]
    fn test_found_with_no_tracks_is_not_found() {
        let slot = PlatformSlot::found(Platform::YouTube, Vec::new());
        assert_eq!(slot.status, SlotStatus::NotFound);
        assert!(!slot.has_results());
        assert!(slot.best().is_none());
    }

    #[test]
    fn test_empty_result_has_zero_totals() {
        let result = EnrichmentResult::empty();
        assert_eq!(result.platform_count, 0);
        assert_eq!(result.total_plays, 0);
        assert_eq!(result.total_likes, 0);
        assert!(result.slots().iter().all(|s| s.tracks.is_empty()));
    }

    #[test]
    fn test_totals_use_best_soundcloud_and_youtube_results() {
        let result = EnrichmentResult::from_slots(
            PlatformSlot::found(Platform::Spotify, vec![track(Platform::Spotify, 87, 60)]),
            PlatformSlot::found(
                Platform::SoundCloud,
                vec![
                    track(Platform::SoundCloud, 1_000, 50),
                    track(Platform::SoundCloud, 99_999, 9_999),
                ],
            ),
            PlatformSlot::found(Platform::YouTube, vec![track(Platform::YouTube, 2_500, 120)]),
        );

        assert_eq!(result.platform_count, 3);
        assert_eq!(result.total_plays, 3_500);
        assert_eq!(result.total_likes, 170);
    }

    #[test]
    fn test_spotify_score_never_counts_as_plays() {
        let low = EnrichmentResult::from_slots(
            PlatformSlot::found(Platform::Spotify, vec![track(Platform::Spotify, 1, 1)]),
            PlatformSlot::found(Platform::SoundCloud, vec![track(Platform::SoundCloud, 10, 2)]),
            PlatformSlot::failed(Platform::YouTube, "timeout"),
        );
        let high = EnrichmentResult::from_slots(
            PlatformSlot::found(Platform::Spotify, vec![track(Platform::Spotify, 100, 99)]),
            PlatformSlot::found(Platform::SoundCloud, vec![track(Platform::SoundCloud, 10, 2)]),
            PlatformSlot::failed(Platform::YouTube, "timeout"),
        );

        assert_eq!(low.total_plays, high.total_plays);
        assert_eq!(low.total_likes, high.total_likes);
        assert_eq!(low.platform_count, 2);
    }

    #[test]
    fn test_totals_saturate() {
        let result = EnrichmentResult::from_slots(
            PlatformSlot::not_configured(Platform::Spotify),
            PlatformSlot::found(Platform::SoundCloud, vec![track(Platform::SoundCloud, u64::MAX, 1)]),
            PlatformSlot::found(Platform::YouTube, vec![track(Platform::YouTube, 10, 1)]),
        );
        assert_eq!(result.total_plays, u64::MAX);
    }

    #[test]
    fn test_has_failures() {
        let answered = EnrichmentResult::from_slots(
            PlatformSlot::not_configured(Platform::Spotify),
            PlatformSlot::found(Platform::SoundCloud, Vec::new()),
            PlatformSlot::found(Platform::YouTube, vec![track(Platform::YouTube, 10, 1)]),
        );
        assert!(!answered.has_failures());

        let degraded = EnrichmentResult::from_slots(
            PlatformSlot::not_configured(Platform::Spotify),
            PlatformSlot::found(Platform::SoundCloud, Vec::new()),
            PlatformSlot::failed(Platform::YouTube, "timed out"),
        );
        assert!(degraded.has_failures());
    }

    #[test]
    fn test_slot_lookup_by_platform() {
        let result = EnrichmentResult::empty();
        for platform in Platform::ALL {
            assert_eq!(result.slot(platform).platform, platform);
        }
    }

    #[test]
    fn test_slot_status_serializes_with_kind_tag() {
        let json = serde_json::to_value(SlotStatus::Failed {
            reason: "HTTP 500".to_string(),
        })
        .unwrap();
        assert_eq!(json["kind"], "failed");
        assert_eq!(json["reason"], "HTTP 500");
    }
}
