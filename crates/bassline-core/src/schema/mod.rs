//! SQLite schema and the response cache built on it.

mod cache;
mod migrations;

pub use cache::ResponseCache;
pub use migrations::{Migration, MIGRATIONS};
