//! Catalog client implementations.
//!
//! Each client owns an immutable per-platform configuration, an HTTP
//! client, a rate limiter and a retry policy, and maps the catalog's
//! native payloads into [`NormalizedTrack`]s.
//!
//! [`NormalizedTrack`]: bassline_core::model::NormalizedTrack

use std::time::Duration;

use crate::resilience::RetryPolicy;

pub mod soundcloud;
pub mod spotify;
pub mod youtube;

pub use soundcloud::{SoundCloudClient, SoundCloudConfig};
pub use spotify::{SpotifyClient, SpotifyConfig};
pub use youtube::{YouTubeClient, YouTubeConfig};

/// Timeout and retry settings shared by every client.
#[derive(Debug, Clone, Copy)]
pub struct ClientSettings {
    /// Upper bound for a single outbound call.
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), RetryPolicy::default())
    }
}

impl ClientSettings {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Self {
        Self { timeout, retry }
    }
}
