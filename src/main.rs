mod cache;
mod cli;
mod config;
mod duration;
mod logging;
mod models;
mod output;
mod ports;
mod services;
#[cfg(test)]
mod test_utils;
mod youtube_rs;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context};

use crate::{
    cache::CacheKind,
    cli::{Session, SortedPlaylistArgs},
    config::Config,
    models::{SortCriterion, Visibility},
    output::OutputFormat,
    services::youtube::credentials::TokenFileCredentials,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, global = true, env = "PLAYLIST_SORTER_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `playlist_sorter=debug`
    #[arg(long, default_value = logging::DEFAULT_LOG_FILTER, global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// Export traces to this OTLP gRPC endpoint
    #[arg(long, global = true, env = "OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    /// Authorized-user token file (overrides config)
    #[arg(long, global = true, env = "PLAYLIST_SORTER_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args, Debug)]
struct OutputArgs {
    /// Write results to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the stored credentials can reach YouTube
    AuthStatus,
    /// List your playlists
    ListPlaylists {
        /// Reuse the cached listing if there is one
        #[arg(long)]
        cached: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Show summary info for a playlist
    PlaylistSummary {
        playlist_id: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// List all videos in a playlist
    ListVideos {
        playlist_id: Option<String>,

        /// Always fetch from YouTube, ignoring cached results
        #[arg(long)]
        no_cache: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// List videos with their durations
    ListVideosWithDurations {
        playlist_id: Option<String>,

        #[arg(long)]
        no_cache: bool,

        /// Sort the listing by upload_date, duration, title, channel or position
        #[arg(short, long)]
        sort_by: Option<String>,

        /// Sort in descending order
        #[arg(short, long, requires = "sort_by")]
        reverse: bool,

        #[command(flatten)]
        output: OutputArgs,
    },
    /// Create a sorted copy of an existing playlist
    CreateSortedPlaylist {
        playlist_id: Option<String>,

        /// Sort criterion; asked for interactively if omitted
        #[arg(short, long, value_enum)]
        sort_by: Option<SortCriterion>,

        /// Sort in descending order
        #[arg(short, long)]
        reverse: bool,

        /// Title for the new playlist
        #[arg(short, long)]
        title: Option<String>,

        /// Privacy of the new playlist
        #[arg(short, long, value_enum, default_value_t = Visibility::Private)]
        privacy: Visibility,

        #[arg(long)]
        no_cache: bool,
    },
    /// Delete a playlist
    DeletePlaylist {
        playlist_id: Option<String>,

        /// Skip the confirmation prompt
        #[arg(long)]
        force: bool,
    },
    #[command(subcommand)]
    Cache(CacheCommands),
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum CacheCommands {
    /// Show cache statistics
    Info,
    /// Clear cached playlist data
    Clear {
        /// Only clear this kind of entry
        #[arg(short = 't', long = "type", value_enum)]
        kind: Option<CacheKind>,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = logging::init_tracing(args.otlp_endpoint.as_deref(), &args.log_level)?;

    let result = run(args).await;
    logging::shutdown(tracer_provider);
    result
}

async fn run(args: Args) -> Result<()> {
    tracing::debug!("Loading configuration");
    let config = Config::load(args.config.as_deref())
        .with_context(|| "Failed to load playlist-sorter config")?;

    let credentials = TokenFileCredentials::new(cli::token_file(&config, args.token_file.as_deref()));
    tracing::debug!("Using token file {}", credentials.path().display());

    match args.command {
        Commands::AuthStatus => {
            let session =
                Session::connect(&credentials, cli::open_cache(&config, true), config.page_size)
                    .await?;
            session.auth_status().await?;
        }
        Commands::ListPlaylists { cached, output } => {
            let session =
                Session::connect(&credentials, cli::open_cache(&config, !cached), config.page_size)
                    .await?;
            session
                .list_playlists(cached, output.output.as_deref(), output.format)
                .await?;
        }
        Commands::PlaylistSummary {
            playlist_id,
            output,
        } => {
            let session =
                Session::connect(&credentials, cli::open_cache(&config, true), config.page_size)
                    .await?;
            session
                .playlist_summary(playlist_id, output.output.as_deref(), output.format)
                .await?;
        }
        Commands::ListVideos {
            playlist_id,
            no_cache,
            output,
        } => {
            let session =
                Session::connect(&credentials, cli::open_cache(&config, no_cache), config.page_size)
                    .await?;
            session
                .list_videos(
                    playlist_id,
                    !no_cache,
                    output.output.as_deref(),
                    output.format,
                )
                .await?;
        }
        Commands::ListVideosWithDurations {
            playlist_id,
            no_cache,
            sort_by,
            reverse,
            output,
        } => {
            let session =
                Session::connect(&credentials, cli::open_cache(&config, no_cache), config.page_size)
                    .await?;
            session
                .list_videos_with_durations(
                    playlist_id,
                    !no_cache,
                    sort_by.as_deref(),
                    reverse,
                    output.output.as_deref(),
                    output.format,
                )
                .await?;
        }
        Commands::CreateSortedPlaylist {
            playlist_id,
            sort_by,
            reverse,
            title,
            privacy,
            no_cache,
        } => {
            let insert_delay = config.insert_delay()?;
            let session =
                Session::connect(&credentials, cli::open_cache(&config, no_cache), config.page_size)
                    .await?;
            session
                .create_sorted_playlist(
                    SortedPlaylistArgs {
                        playlist_id,
                        criterion: sort_by,
                        reverse,
                        title,
                        visibility: privacy,
                        use_cache: !no_cache,
                    },
                    insert_delay,
                )
                .await?;
        }
        Commands::DeletePlaylist { playlist_id, force } => {
            let session =
                Session::connect(&credentials, cli::open_cache(&config, true), config.page_size)
                    .await?;
            session.delete_playlist(playlist_id, force).await?;
        }
        Commands::Cache(cache_commands) => {
            let cache = cli::open_cache(&config, false);
            match cache_commands {
                CacheCommands::Info => cli::cache_info(&cache)?,
                CacheCommands::Clear { kind } => cli::cache_clear(&cache, kind)?,
            }
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = cli::config_path(args.config.as_deref())?;
                tracing::debug!("Creating default config at {}", path.display());
                Config::create_default(&path)?;
                println!("Created default config at {}", path.display());
            }
            ConfigCommands::Path => println!("{}", cli::config_path(args.config.as_deref())?.display()),
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_create_sorted_playlist() {
        let args = Args::try_parse_from([
            "playlist-sorter",
            "create-sorted-playlist",
            "PL1",
            "-s",
            "upload_date",
            "-r",
            "-p",
            "unlisted",
        ])
        .unwrap();

        match args.command {
            Commands::CreateSortedPlaylist {
                playlist_id,
                sort_by,
                reverse,
                privacy,
                title,
                no_cache,
            } => {
                assert_eq!(playlist_id.as_deref(), Some("PL1"));
                assert_eq!(sort_by, Some(SortCriterion::UploadDate));
                assert!(reverse);
                assert_eq!(privacy, Visibility::Unlisted);
                assert_eq!(title, None);
                assert!(!no_cache);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_default_log_level_includes_crate_info() {
        let args = Args::try_parse_from(["playlist-sorter", "auth-status"]).unwrap();
        assert_eq!(args.log_level, logging::DEFAULT_LOG_FILTER);
    }

    #[test]
    fn test_parse_cache_clear_alias() {
        let args =
            Args::try_parse_from(["playlist-sorter", "cache", "clear", "-t", "videos_durations"])
                .unwrap();
        assert!(matches!(
            args.command,
            Commands::Cache(CacheCommands::Clear {
                kind: Some(CacheKind::ItemsWithDuration)
            })
        ));
    }
}
