//! Platform client error types.
//!
//! These errors never cross the public [`PlatformClient`] contract: the
//! client boundary collapses them into "no data" and logs the reason. The
//! orchestrators use them to fill in per-platform slot status.
//!
//! [`PlatformClient`]: crate::client::PlatformClient

use bassline_core::model::Platform;
use thiserror::Error;

/// Errors that can occur while talking to an external catalog.
#[derive(Debug, Error)]
pub enum PlatformError {
    /// No credentials are configured for the platform.
    #[error("{platform} is not configured")]
    NotConfigured { platform: Platform },

    /// The platform answered with a non-2xx status.
    #[error("HTTP {status} from {platform}: {message}")]
    Http {
        platform: Platform,
        status: u16,
        message: String,
    },

    /// The platform returned a rate-limit response.
    #[error("rate limited by {platform}")]
    RateLimited { platform: Platform },

    /// Access-token acquisition failed.
    #[error("authentication with {platform} failed: {message}")]
    Auth { platform: Platform, message: String },

    /// A response could not be parsed into the expected schema.
    #[error("parse error from {platform}: {message}")]
    Parse { platform: Platform, message: String },

    /// The request could not be sent or its body could not be read.
    #[error("request to {platform} failed: {source}")]
    Request {
        platform: Platform,
        source: reqwest::Error,
    },

    /// The call did not complete within its time budget.
    #[error("request to {platform} timed out after {millis}ms")]
    Timeout { platform: Platform, millis: u64 },

    /// A URL did not contain a usable identifier for the platform.
    #[error("invalid {platform} URL: {url}")]
    InvalidUrl { platform: Platform, url: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

impl PlatformError {
    /// Map a transport error, separating timeouts from other failures.
    pub(crate) fn from_request(platform: Platform, timeout_ms: u64, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                platform,
                millis: timeout_ms,
            }
        } else {
            Self::Request { platform, source }
        }
    }

    /// Returns `true` when the error is transient and an idempotent read
    /// may succeed if retried.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http { status, .. } => *status >= 500,
            Self::RateLimited { .. } | Self::Request { .. } | Self::Timeout { .. } => true,
            _ => false,
        }
    }

    /// Returns `true` when the platform simply has no credentials.
    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured { .. })
    }
}

/// Convenience alias for platform client results.
pub type PlatformResult<T> = std::result::Result<T, PlatformError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_errors_are_transient() {
        let err = PlatformError::Http {
            platform: Platform::YouTube,
            status: 503,
            message: "Service Unavailable".to_string(),
        };
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_errors_are_not_transient() {
        let err = PlatformError::Http {
            platform: Platform::YouTube,
            status: 403,
            message: "quotaExceeded".to_string(),
        };
        assert!(!err.is_transient());
        assert!(!PlatformError::Parse {
            platform: Platform::Spotify,
            message: "missing field".to_string(),
        }
        .is_transient());
    }

    #[test]
    fn test_rate_limit_and_timeout_are_transient() {
        assert!(PlatformError::RateLimited {
            platform: Platform::SoundCloud
        }
        .is_transient());
        assert!(PlatformError::Timeout {
            platform: Platform::SoundCloud,
            millis: 10_000
        }
        .is_transient());
    }

    #[test]
    fn test_not_configured() {
        let err = PlatformError::NotConfigured {
            platform: Platform::Spotify,
        };
        assert!(err.is_not_configured());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "spotify is not configured");
    }
}
