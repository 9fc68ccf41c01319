use anyhow::{Context, Result};
use bassline_core::model::{EnrichmentResult, TrackRecord};
use bassline_core::schema::ResponseCache;
use bassline_platforms::{Config, Enricher};
use std::time::Duration;

use super::{format_track, status_label};

#[derive(Debug, Clone, Default)]
pub struct EnrichOptions {
    pub genre: Option<String>,
    pub use_cache: bool,
    pub json: bool,
}

/// Cache key for an artist and title, insensitive to case and padding.
pub fn cache_key(artist: &str, title: &str) -> String {
    format!(
        "enrich_{}_{}",
        artist.trim().to_lowercase(),
        title.trim().to_lowercase()
    )
}

/// Store `result` unless a platform call failed, so a transient failure
/// is never replayed. Returns whether it was stored.
fn store_result(cache: &ResponseCache, key: &str, result: &EnrichmentResult, ttl: Duration) -> bool {
    if result.has_failures() {
        log::debug!("Not caching {}: a platform call failed", key);
        return false;
    }
    match cache.set(key, result, ttl) {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Failed to cache enrichment for {}: {}", key, e);
            false
        }
    }
}

fn cached_result(cache: &ResponseCache, key: &str) -> Option<EnrichmentResult> {
    match cache.get(key) {
        Ok(result) => result,
        Err(e) => {
            log::warn!("Ignoring unreadable cache entry {}: {}", key, e);
            None
        }
    }
}

pub async fn run_enrich(
    config: &Config,
    artist: &str,
    title: &str,
    options: &EnrichOptions,
) -> Result<()> {
    let mut record = TrackRecord::new(artist, title);
    if let Some(genre) = &options.genre {
        record = record.with_genre(genre);
    }

    if !record.has_identity() {
        println!("Nothing to enrich: both an artist and a title are required.");
        return Ok(());
    }

    let cache = if options.use_cache {
        match super::cache::open_cache(config) {
            Ok(cache) => Some(cache),
            Err(e) => {
                log::warn!("Continuing without cache: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let key = cache_key(artist, title);
    if let Some(result) = cache.as_ref().and_then(|c| cached_result(c, &key)) {
        log::info!("Using cached enrichment for {}", key);
        record.enrichment = Some(result);
    } else {
        let enricher = Enricher::from_config(config).context("Failed to build platform clients")?;
        record = enricher.enrich(record).await;

        if let (Some(cache), Some(result)) = (&cache, &record.enrichment) {
            store_result(cache, &key, result, config.cache_ttl());
        }
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&record)?);
        return Ok(());
    }

    print_record(&record);
    Ok(())
}

fn print_record(record: &TrackRecord) {
    println!("\n{} - {}", record.artist, record.title);
    if let Some(genre) = &record.genre {
        println!("  Genre: {}", genre);
    }

    let Some(enrichment) = &record.enrichment else {
        return;
    };

    for slot in enrichment.slots() {
        let summary = slot
            .best()
            .map(format_track)
            .unwrap_or_else(|| status_label(&slot.status));
        println!("  {:<11} {}", slot.platform.display_name(), summary);
    }

    println!("\n  Platforms:   {}", enrichment.platform_count);
    println!("  Total plays: {}", enrichment.total_plays);
    println!("  Total likes: {}", enrichment.total_likes);
    println!(
        "  Enriched at: {}",
        enrichment.enriched_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use bassline_core::model::{NormalizedTrack, Platform, PlatformSlot};

    #[test]
    fn test_cache_key_normalises_case_and_padding() {
        assert_eq!(
            cache_key(" Excision ", "Gold (Stupid Love)"),
            "enrich_excision_gold (stupid love)"
        );
        assert_eq!(cache_key("EXCISION", "gold"), cache_key("excision", "Gold"));
    }

    #[test]
    fn test_cached_result_round_trip() {
        let cache = ResponseCache::open_in_memory().unwrap();
        let result = EnrichmentResult::from_slots(
            PlatformSlot::not_configured(Platform::Spotify),
            PlatformSlot::found(Platform::SoundCloud, Vec::new()),
            PlatformSlot::failed(Platform::YouTube, "timed out"),
        );
        cache
            .set("enrich_a_b", &result, Duration::from_secs(60))
            .unwrap();

        assert_eq!(cached_result(&cache, "enrich_a_b"), Some(result));
        assert_eq!(cached_result(&cache, "enrich_missing"), None);
    }

    #[test]
    fn test_failed_platform_result_is_not_stored() {
        let cache = ResponseCache::open_in_memory().unwrap();
        let result = EnrichmentResult::from_slots(
            PlatformSlot::not_configured(Platform::Spotify),
            PlatformSlot::found(Platform::SoundCloud, Vec::new()),
            PlatformSlot::failed(Platform::YouTube, "request to youtube timed out after 10000ms"),
        );

        assert!(!store_result(&cache, "enrich_a_b", &result, Duration::from_secs(60)));
        assert_eq!(cached_result(&cache, "enrich_a_b"), None);
        assert!(cache.is_empty().unwrap());
    }

    #[test]
    fn test_answered_result_is_stored() {
        let cache = ResponseCache::open_in_memory().unwrap();
        let hit = NormalizedTrack::new(
            Platform::YouTube,
            "dQw4w9WgXcQ",
            "Gold (Stupid Love)",
            "Excision",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        )
        .with_popularity(1_000);
        let result = EnrichmentResult::from_slots(
            PlatformSlot::not_configured(Platform::Spotify),
            PlatformSlot::found(Platform::SoundCloud, Vec::new()),
            PlatformSlot::found(Platform::YouTube, vec![hit]),
        );

        assert!(store_result(&cache, "enrich_a_b", &result, Duration::from_secs(60)));
        assert_eq!(cached_result(&cache, "enrich_a_b"), Some(result));
    }

    #[test]
    fn test_unreadable_entry_is_a_miss() {
        let cache = ResponseCache::open_in_memory().unwrap();
        cache
            .set("enrich_a_b", &"not an enrichment", Duration::from_secs(60))
            .unwrap();
        assert_eq!(cached_result(&cache, "enrich_a_b"), None);
    }
}
