use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// An external music catalog that bassline can query.
///
/// The variants are ordered the way URLs are classified and the way
/// enrichment slots are aggregated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Spotify Web API. Reports popularity as a 0-100 score.
    Spotify,
    /// SoundCloud API. Reports lifetime play and like counters.
    SoundCloud,
    /// YouTube Data API. Reports lifetime view and like counters.
    YouTube,
}

impl Platform {
    /// Every platform, in classification order.
    pub const ALL: [Self; 3] = [Self::Spotify, Self::SoundCloud, Self::YouTube];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spotify => "spotify",
            Self::SoundCloud => "soundcloud",
            Self::YouTube => "youtube",
        }
    }

    /// Human-readable platform name for log lines and CLI output.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Spotify => "Spotify",
            Self::SoundCloud => "SoundCloud",
            Self::YouTube => "YouTube",
        }
    }

    /// Whether this platform's popularity metric is a lifetime counter.
    ///
    /// Spotify's popularity is a normalized 0-100 score and must never be
    /// summed with play or view counts.
    #[must_use]
    pub const fn reports_counts(self) -> bool {
        !matches!(self, Self::Spotify)
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "spotify" => Ok(Self::Spotify),
            "soundcloud" => Ok(Self::SoundCloud),
            "youtube" => Ok(Self::YouTube),
            other => Err(Error::InvalidData(format!("unknown platform: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_round_trips_through_str() {
        for platform in Platform::ALL {
            let parsed: Platform = platform.as_str().parse().unwrap();
            assert_eq!(parsed, platform);
        }
    }

    #[test]
    fn test_platform_parse_is_case_insensitive() {
        assert_eq!("YouTube".parse::<Platform>().unwrap(), Platform::YouTube);
        assert_eq!(" SOUNDCLOUD ".parse::<Platform>().unwrap(), Platform::SoundCloud);
    }

    #[test]
    fn test_platform_parse_unknown() {
        assert!("bandcamp".parse::<Platform>().is_err());
    }

    #[test]
    fn test_only_spotify_reports_a_score() {
        assert!(!Platform::Spotify.reports_counts());
        assert!(Platform::SoundCloud.reports_counts());
        assert!(Platform::YouTube.reports_counts());
    }

    #[test]
    fn test_platform_serializes_lowercase() {
        let json = serde_json::to_string(&Platform::SoundCloud).unwrap();
        assert_eq!(json, "\"soundcloud\"");
    }
}
