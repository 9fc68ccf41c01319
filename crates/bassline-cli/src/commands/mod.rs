pub mod cache;
pub mod config;
pub mod enrich;
pub mod search;
pub mod status;
pub mod verify;

pub use enrich::run_enrich;
pub use search::run_search;
pub use status::show_status;
pub use verify::run_verify;

use bassline_core::model::{NormalizedTrack, Platform, SlotStatus};

/// One-line summary of a track with its platform's metrics.
pub(crate) fn format_track(track: &NormalizedTrack) -> String {
    let metrics = match track.platform {
        Platform::Spotify => format!(
            "popularity {}/100, energy {}/100",
            track.popularity_metric, track.secondary_metric
        ),
        Platform::SoundCloud => format!(
            "{} plays, {} likes",
            track.popularity_metric, track.secondary_metric
        ),
        Platform::YouTube => format!(
            "{} views, {} likes",
            track.popularity_metric, track.secondary_metric
        ),
    };
    format!("{} - {} [{}]", track.artist, track.title, metrics)
}

pub(crate) fn status_label(status: &SlotStatus) -> String {
    match status {
        SlotStatus::Found => "found".to_string(),
        SlotStatus::NotFound => "no match".to_string(),
        SlotStatus::NotConfigured => "not configured".to_string(),
        SlotStatus::Failed { reason } => format!("failed: {reason}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_track_uses_platform_metrics() {
        let track = NormalizedTrack::new(
            Platform::YouTube,
            "dQw4w9WgXcQ",
            "Gold",
            "Excision",
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        )
        .with_popularity(2_500)
        .with_secondary(61);
        assert_eq!(format_track(&track), "Excision - Gold [2500 views, 61 likes]");
    }

    #[test]
    fn test_status_label() {
        assert_eq!(status_label(&SlotStatus::NotConfigured), "not configured");
        assert_eq!(
            status_label(&SlotStatus::Failed {
                reason: "rate limited by youtube".to_string()
            }),
            "failed: rate limited by youtube"
        );
    }
}
