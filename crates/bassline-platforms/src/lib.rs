//! Catalog clients and orchestration for bassline.
//!
//! Three platform clients (Spotify, SoundCloud, YouTube) translate each
//! catalog's native responses into [`NormalizedTrack`]s. On top of them sit
//! the URL resolver, the verification orchestrator ([`Verifier`]) and the
//! cross-platform search and enrichment orchestrator ([`Enricher`]).
//!
//! [`NormalizedTrack`]: bassline_core::model::NormalizedTrack

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
mod http;
pub mod platforms;
pub mod resilience;
pub mod url;
pub mod verify;

pub use client::{PlatformClient, PlatformSet};
pub use config::Config;
pub use enrich::Enricher;
pub use error::{PlatformError, PlatformResult};
pub use platforms::ClientSettings;
pub use verify::Verifier;
