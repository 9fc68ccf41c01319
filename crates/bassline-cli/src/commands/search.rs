use anyhow::{Context, Result};
use bassline_platforms::{Config, Enricher};

use super::{format_track, status_label};

pub async fn run_search(config: &Config, artist: &str, title: &str, json: bool) -> Result<()> {
    let enricher = Enricher::from_config(config).context("Failed to build platform clients")?;
    let result = enricher.search_all_platforms(artist, title).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("\nResults for {} - {}\n", artist, title);
    for slot in result.slots() {
        println!("{} ({})", slot.platform.display_name(), status_label(&slot.status));
        for (i, track) in slot.tracks.iter().enumerate() {
            println!("  {}. {}", i + 1, format_track(track));
            println!("     {}", track.canonical_url);
        }
    }
    println!("\nFound on {} of 3 platforms", result.platform_count);

    Ok(())
}
