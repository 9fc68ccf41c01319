use anyhow::Result;
use bassline_core::model::Platform;
use bassline_platforms::{Config, PlatformSet};

pub fn show_status(config: &Config) -> Result<()> {
    let platforms = PlatformSet::from_config(config)?;
    let enabled = platforms.enabled_platforms();

    println!("\nBassline Status\n");
    for platform in Platform::ALL {
        let state = if enabled.contains(&platform) {
            "configured"
        } else {
            "not configured"
        };
        println!("  {:<11} {}", platform.display_name(), state);
    }

    let missing = config.missing_credentials();
    if !missing.is_empty() {
        println!("\n  Missing credentials (config file or environment):");
        for name in missing {
            println!("    {:<22} BASS_{}", name, name.to_uppercase());
        }
    }

    println!("\n  Cache: {}", config.cache_path.display());
    if config.cache_path.exists() {
        let cache = super::cache::open_cache(config)?;
        println!("  Cached entries: {}", cache.len()?);
    }

    Ok(())
}
