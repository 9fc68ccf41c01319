use anyhow::Result;
use bassline_platforms::Config;
use clap::Parser;
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "bassline", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the response cache (default: ~/.local/share/bassline/cache.db)
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Log at debug level (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Verify that a track URL resolves to a real track
    ///
    /// The URL is matched against the known catalogs (Spotify, SoundCloud,
    /// YouTube) and looked up on the one it belongs to. URLs from any
    /// other site are rejected without a network call.
    ///
    /// Exits successfully either way; an unverified URL prints a notice
    /// (or `null` with --json).
    Verify {
        /// Track URL (open.spotify.com, soundcloud.com, youtube.com, youtu.be)
        url: String,

        /// Print the verification result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search every configured catalog for an artist and title
    Search {
        artist: String,
        title: String,

        /// Print the per-platform results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Enrich a track with cross-platform play and like counts
    ///
    /// Searches all catalogs concurrently and aggregates the best
    /// SoundCloud and YouTube results into total plays and likes. Spotify
    /// contributes to the platform count only: its popularity is a 0-100
    /// score, not a counter.
    ///
    /// Results are cached for cache_ttl_secs (default 300).
    Enrich {
        artist: String,
        title: String,

        /// Genre to carry on the track record
        #[arg(long)]
        genre: Option<String>,

        /// Bypass the response cache
        #[arg(long)]
        no_cache: bool,

        /// Print the enriched record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show which catalogs are configured
    Status,
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Debug, clap::Subcommand)]
enum ConfigAction {
    /// Show the current effective configuration
    Show,
    /// Show the config file path
    Path,
    /// Print an example config file
    Example,
    /// Create the config file with commented defaults
    Init,
}

#[derive(Debug, clap::Subcommand)]
enum CacheAction {
    /// Remove expired entries
    Purge,
    /// Remove every entry
    Clear,
}

fn load_config(cache: Option<PathBuf>) -> Result<Config> {
    match cache {
        Some(path) => Config::load_with_cache_path(path),
        None => Config::load(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Verify { url, json } => {
            let config = load_config(cli.cache)?;
            commands::run_verify(&config, &url, json).await?;
        }
        Commands::Search {
            artist,
            title,
            json,
        } => {
            let config = load_config(cli.cache)?;
            commands::run_search(&config, &artist, &title, json).await?;
        }
        Commands::Enrich {
            artist,
            title,
            genre,
            no_cache,
            json,
        } => {
            let config = load_config(cli.cache)?;
            let options = commands::enrich::EnrichOptions {
                genre,
                use_cache: !no_cache,
                json,
            };
            commands::run_enrich(&config, &artist, &title, &options).await?;
        }
        Commands::Status => {
            let config = load_config(cli.cache)?;
            commands::show_status(&config)?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show_config(cli.cache)?,
            ConfigAction::Path => commands::config::show_path(),
            ConfigAction::Example => commands::config::show_example(),
            ConfigAction::Init => commands::config::init_config()?,
        },
        Commands::Cache { action } => {
            let config = load_config(cli.cache)?;
            match action {
                CacheAction::Purge => commands::cache::purge(&config)?,
                CacheAction::Clear => commands::cache::clear(&config)?,
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_enrich_flags() {
        let cli = Cli::parse_from([
            "bassline",
            "enrich",
            "Excision",
            "Gold (Stupid Love)",
            "--no-cache",
            "--json",
        ]);
        match cli.command {
            Commands::Enrich {
                artist,
                title,
                no_cache,
                json,
                genre,
            } => {
                assert_eq!(artist, "Excision");
                assert_eq!(title, "Gold (Stupid Love)");
                assert!(no_cache);
                assert!(json);
                assert!(genre.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_cache_flag() {
        let cli = Cli::parse_from(["bassline", "cache", "purge", "--cache", "/tmp/c.db"]);
        assert_eq!(cli.cache, Some(PathBuf::from("/tmp/c.db")));
        assert!(matches!(
            cli.command,
            Commands::Cache {
                action: CacheAction::Purge
            }
        ));
    }
}
