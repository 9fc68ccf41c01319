use anyhow::{Context, Result};
use bassline_core::schema::ResponseCache;
use bassline_platforms::Config;

/// Open the response cache, creating its directory if needed.
pub fn open_cache(config: &Config) -> Result<ResponseCache> {
    if let Some(parent) = config.cache_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create cache directory")?;
    }
    ResponseCache::open(&config.cache_path).with_context(|| {
        format!("Failed to open cache at {}", config.cache_path.display())
    })
}

pub fn purge(config: &Config) -> Result<()> {
    let cache = open_cache(config)?;
    let removed = cache.purge_expired()?;
    println!("✓ Removed {} expired entries ({} remaining)", removed, cache.len()?);
    Ok(())
}

pub fn clear(config: &Config) -> Result<()> {
    let cache = open_cache(config)?;
    let removed = cache.clear()?;
    println!("✓ Removed {} entries from {}", removed, config.cache_path.display());
    Ok(())
}
