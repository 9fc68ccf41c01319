//! Shared request plumbing for the platform clients.

use std::time::Duration;

use bassline_core::model::Platform;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{PlatformError, PlatformResult};
use crate::platforms::ClientSettings;
use crate::resilience::RateLimiter;

const USER_AGENT: &str = concat!("bassline/", env!("CARGO_PKG_VERSION"));

/// Build an HTTP client with the bassline user agent and a per-call
/// timeout.
pub(crate) fn build_client(timeout: Duration) -> PlatformResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(PlatformError::Client)
}

/// Send a request and decode a JSON body.
///
/// A 404 is reported as `Ok(None)`: lookups by ID or URL treat a missing
/// resource as "no track" rather than a failure.
pub(crate) async fn fetch_json<T: DeserializeOwned>(
    platform: Platform,
    timeout: Duration,
    request: RequestBuilder,
) -> PlatformResult<Option<T>> {
    let timeout_ms = timeout.as_millis() as u64;
    let response = request
        .send()
        .await
        .map_err(|e| PlatformError::from_request(platform, timeout_ms, e))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        log::debug!("{} returned 404 for {}", platform.display_name(), response.url().path());
        return Ok(None);
    }
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(PlatformError::RateLimited { platform });
    }
    if !status.is_success() {
        return Err(PlatformError::Http {
            platform,
            status: status.as_u16(),
            message: status
                .canonical_reason()
                .unwrap_or("unexpected status")
                .to_string(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| PlatformError::from_request(platform, timeout_ms, e))?;

    parse_json(platform, &body).map(Some)
}

/// Paced, retried GET/POST of a JSON resource.
///
/// `build` is called once per attempt since a [`RequestBuilder`] is
/// consumed by sending it.
pub(crate) async fn send_with_retry<T, B>(
    platform: Platform,
    settings: &ClientSettings,
    limiter: &RateLimiter,
    build: B,
) -> PlatformResult<Option<T>>
where
    T: DeserializeOwned,
    B: Fn() -> RequestBuilder,
{
    let timeout = settings.timeout;
    settings
        .retry
        .run(platform, || {
            let request = build();
            async move {
                limiter.acquire().await;
                fetch_json(platform, timeout, request).await
            }
        })
        .await
}

/// Decode a response body against a platform's schema.
pub(crate) fn parse_json<T: DeserializeOwned>(platform: Platform, body: &str) -> PlatformResult<T> {
    serde_json::from_str(body).map_err(|e| PlatformError::Parse {
        platform,
        message: e.to_string(),
    })
}
