//! Track URL classification and native ID extraction.
//!
//! Classification is a case-insensitive substring match against a fixed,
//! ordered list of host markers; the first marker found wins. ID
//! extraction always runs against the URL exactly as given, since
//! platform IDs are case-sensitive.

use std::sync::LazyLock;

use bassline_core::model::Platform;
use regex::Regex;

/// Host markers, checked in order.
const HOST_MARKERS: [(&str, Platform); 4] = [
    ("spotify.com", Platform::Spotify),
    ("soundcloud.com", Platform::SoundCloud),
    ("youtube.com", Platform::YouTube),
    ("youtu.be", Platform::YouTube),
];

#[allow(clippy::expect_used)] // constant pattern
static SPOTIFY_TRACK_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"track/([A-Za-z0-9]+)").expect("valid Spotify track pattern"));

/// Query-parameter form, `/embed/` form and `/v/` form, tried in order.
#[allow(clippy::expect_used)]
static YOUTUBE_VIDEO_ID: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        r"(?:v=|/)([0-9A-Za-z_-]{11}).*",
        r"(?:embed/)([0-9A-Za-z_-]{11})",
        r"(?:v/)([0-9A-Za-z_-]{11})",
    ]
    .map(|pattern| Regex::new(pattern).expect("valid YouTube video pattern"))
});

/// A URL classified to its platform, with the identifier the platform's
/// lookup needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUrl {
    pub platform: Platform,
    /// The track ID for Spotify and YouTube. SoundCloud resolves URLs
    /// natively, so its "ID" is the URL itself.
    pub native_id: String,
}

/// Which platform a URL belongs to, if any.
pub fn classify(url: &str) -> Option<Platform> {
    let lowered = url.to_lowercase();
    HOST_MARKERS
        .iter()
        .find(|(marker, _)| lowered.contains(marker))
        .map(|(_, platform)| *platform)
}

/// Extract a Spotify track ID from a `.../track/<id>` URL.
pub fn extract_spotify_id(url: &str) -> Option<String> {
    SPOTIFY_TRACK_ID
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extract an 11-character YouTube video ID.
pub fn extract_youtube_id(url: &str) -> Option<String> {
    YOUTUBE_VIDEO_ID.iter().find_map(|pattern| {
        pattern
            .captures(url)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

/// Classify a URL and extract its native identifier.
///
/// Returns `None` when no marker matches or the platform's ID pattern
/// does not match.
pub fn classify_and_extract(url: &str) -> Option<ResolvedUrl> {
    let platform = classify(url)?;
    let native_id = match platform {
        Platform::Spotify => extract_spotify_id(url)?,
        Platform::SoundCloud => url.to_string(),
        Platform::YouTube => extract_youtube_id(url)?,
    };
    Some(ResolvedUrl {
        platform,
        native_id,
    })
}
