use anyhow::{Context, Result};
use bassline_platforms::{url, Config, Verifier};

use super::format_track;

pub async fn run_verify(config: &Config, track_url: &str, json: bool) -> Result<()> {
    let verifier = Verifier::from_config(config).context("Failed to build platform clients")?;
    let result = verifier.verify_url(track_url).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    match result.as_ref().and_then(|r| r.data.as_ref().map(|track| (r.platform, track))) {
        Some((platform, track)) => {
            println!("✓ Verified on {}", platform.display_name());
            println!("  {}", format_track(track));
            println!("  {}", track.canonical_url);
        }
        None => {
            println!("✗ Could not verify {}", track_url);
            match url::classify(track_url) {
                None => println!("  Not a Spotify, SoundCloud or YouTube URL"),
                Some(platform) if !verifier.platforms().client(platform).is_configured() => {
                    println!(
                        "  {} is not configured. Run 'bassline status' for details.",
                        platform.display_name()
                    );
                }
                Some(platform) => {
                    println!("  No track found on {}", platform.display_name());
                }
            }
        }
    }

    Ok(())
}
