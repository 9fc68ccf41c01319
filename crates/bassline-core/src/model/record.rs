use serde::{Deserialize, Serialize};

use crate::model::enrichment::EnrichmentResult;

/// A track as submitted by a user, before or after enrichment.
///
/// The persistence layer owns these records; the enrichment orchestrator
/// only reads `artist` and `title` and attaches an [`EnrichmentResult`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackRecord {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub artist: String,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub enrichment: Option<EnrichmentResult>,
}

impl TrackRecord {
    #[must_use]
    pub fn new(artist: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: artist.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    /// Whether both artist and title are present (ignoring whitespace).
    #[must_use]
    pub fn has_identity(&self) -> bool {
        !self.artist.trim().is_empty() && !self.title.trim().is_empty()
    }
}
