//! Core domain model for bassline.
//!
//! This crate defines the platform-agnostic track model shared by every
//! catalog client, the verification and enrichment result types, and the
//! SQLite-backed response cache used by callers of the orchestrators.

#![deny(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod error;
pub mod model;
pub mod schema;

pub use error::{Error, Result};
