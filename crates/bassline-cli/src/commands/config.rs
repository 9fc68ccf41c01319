use anyhow::Result;
use bassline_platforms::config::{self, Config};
use std::path::PathBuf;

fn secret(value: Option<&String>) -> &'static str {
    match value {
        Some(v) if !v.trim().is_empty() => "<set>",
        _ => "<not set>",
    }
}

/// Show the current effective configuration.
pub fn show_config(cache_override: Option<PathBuf>) -> Result<()> {
    let config = match cache_override {
        Some(path) => Config::load_with_cache_path(path)?,
        None => Config::load()?,
    };

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    println!("  spotify_client_id: {}", secret(config.spotify_client_id.as_ref()));
    println!("  spotify_client_secret: {}", secret(config.spotify_client_secret.as_ref()));
    println!("  soundcloud_client_id: {}", secret(config.soundcloud_client_id.as_ref()));
    println!("  youtube_api_key: {}", secret(config.youtube_api_key.as_ref()));
    println!("  request_timeout_secs: {}", config.request_timeout_secs);
    println!("  search_limit: {}", config.search_limit);
    println!("  max_retries: {}", config.max_retries);
    println!("  cache_path: {}", config.cache_path.display());
    println!("  cache_ttl_secs: {}", config.cache_ttl_secs);

    println!("\nPriority: CLI args > ENV vars (BASS_*) > Config file > Defaults");

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to add your Spotify, SoundCloud and YouTube credentials.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_is_masked() {
        assert_eq!(secret(Some(&"abc".to_string())), "<set>");
        assert_eq!(secret(Some(&"  ".to_string())), "<not set>");
        assert_eq!(secret(None), "<not set>");
    }
}
