use serde::{Deserialize, Serialize};

use crate::model::platform::Platform;
use crate::model::track::NormalizedTrack;

/// The outcome of checking that a submitted URL resolves to a real track.
///
/// Created per verification request and never persisted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub platform: Platform,
    pub verified: bool,
    pub data: Option<NormalizedTrack>,
}

impl VerificationResult {
    /// A successful verification carrying the resolved track.
    #[must_use]
    pub fn verified(track: NormalizedTrack) -> Self {
        Self {
            platform: track.platform,
            verified: true,
            data: Some(track),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verified_takes_platform_from_track() {
        let track = NormalizedTrack::new(Platform::YouTube, "dQw4w9WgXcQ", "t", "a", "u");
        let result = VerificationResult::verified(track.clone());
        assert_eq!(result.platform, Platform::YouTube);
        assert!(result.verified);
        assert_eq!(result.data, Some(track));
    }
}
