//! URL verification.
//!
//! Classifies a submitted URL, dispatches to the owning catalog's lookup
//! and wraps a hit in a [`VerificationResult`]. There is no fallback
//! across platforms: a URL belongs to exactly one catalog.

use std::time::Duration;

use bassline_core::model::{Platform, VerificationResult};

use crate::client::PlatformSet;
use crate::config::Config;
use crate::error::PlatformResult;
use crate::url::{classify_and_extract, ResolvedUrl};

/// Verifies track URLs against their catalogs.
#[derive(Debug, Clone)]
pub struct Verifier {
    platforms: PlatformSet,
    timeout: Duration,
}

impl Verifier {
    /// `timeout` bounds the whole lookup, including retries.
    pub fn new(platforms: PlatformSet, timeout: Duration) -> Self {
        Self { platforms, timeout }
    }

    /// Build a verifier over the real catalog clients.
    pub fn from_config(config: &Config) -> PlatformResult<Self> {
        Ok(Self::new(
            PlatformSet::from_config(config)?,
            config.platform_timeout(),
        ))
    }

    pub fn platforms(&self) -> &PlatformSet {
        &self.platforms
    }

    /// Verify that `url` resolves to a real track.
    ///
    /// Returns `None` for URLs that belong to no known catalog, URLs
    /// without a usable ID, and lookups that find nothing or fail. URLs
    /// that match no catalog never reach the network.
    pub async fn verify_url(&self, url: &str) -> Option<VerificationResult> {
        let Some(ResolvedUrl {
            platform,
            native_id,
        }) = classify_and_extract(url)
        else {
            log::debug!("No catalog recognises URL {}", url);
            return None;
        };

        let client = self.platforms.client(platform);
        let lookup = async {
            match platform {
                Platform::SoundCloud => client.get_track_by_url(&native_id).await,
                Platform::Spotify | Platform::YouTube => client.get_track_by_id(&native_id).await,
            }
        };

        let track = match tokio::time::timeout(self.timeout, lookup).await {
            Ok(track) => track?,
            Err(_) => {
                log::warn!(
                    "{} verification timed out after {:?}",
                    platform.display_name(),
                    self.timeout
                );
                return None;
            }
        };

        log::info!("Verified {} track {}", platform.display_name(), track.platform_id);
        Some(VerificationResult::verified(track))
    }
}
