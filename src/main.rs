mod config;
mod database;
mod entities;
mod import;
mod logging;
mod matcher;
mod plex;
mod ports;
mod prompt;
mod query;
mod sidecar;
mod sync;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::Context, eyre::eyre};

use crate::{
    config::Config,
    database::{Database, TrackFilter},
    import::import_path,
    logging::setup_logging,
    plex::client::PlexHttpCatalog,
    prompt::ConsolePrompt,
    sync::{Syncer, trigger_update},
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "PLEXSYNC_CONFIG")]
    config: Option<PathBuf>,

    /// The track database to use
    #[arg(short, long, env = "PLEXSYNC_DATABASE")]
    database: Option<PathBuf>,

    /// Console log level (default: info)
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level (default: debug)
    #[arg(long, default_value = "debug", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file
    #[arg(long, env = "PLEXSYNC_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Trigger a rescan of the Plex music library
    Update,
    /// Fetch Plex ratings and play statistics for local tracks
    Sync {
        /// Re-fetch tracks that already carry Plex data
        #[arg(short, long)]
        force: bool,

        /// Also write a JSON sidecar next to each synced audio file
        #[arg(short, long)]
        write: bool,

        /// Only sync tracks with this exact title
        #[arg(long)]
        title: Option<String>,

        /// Only sync tracks from this exact album
        #[arg(long)]
        album: Option<String>,

        /// Only sync tracks by this exact artist
        #[arg(long)]
        artist: Option<String>,
    },
    /// Fetch statistics for tracks played on Plex recently
    SyncRecent {
        /// How many days back to look
        #[arg(short, long, default_value = "7")]
        days: i64,
    },
    /// Import folder/file into the track database
    Import {
        /// The folder/file to import
        #[arg(short, long)]
        input: PathBuf,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn database_path(arg: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = arg {
        return Ok(path);
    }
    dirs::data_dir()
        .map(|path| path.join("plexsync").join("library.db"))
        .ok_or_else(|| eyre!("No data directory found; pass --database"))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    setup_logging(args.log_level, args.log_file.clone(), args.log_file_level)?;

    log::debug!("plexsync starting");

    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load plexsync config")?;
    log::debug!("Loaded configuration: {:?}", config);

    match args.command {
        Commands::Update => {
            let catalog = PlexHttpCatalog::connect(&config).await?;
            trigger_update(&catalog).await;
        }
        Commands::Sync {
            force,
            write,
            title,
            album,
            artist,
        } => {
            let catalog = PlexHttpCatalog::connect(&config).await?;
            let database = Database::open(&database_path(args.database)?).await?;

            let filter = TrackFilter {
                title,
                album,
                artist,
            };
            let tracks = database.list_tracks(&filter).await?;
            log::info!("Syncing {} tracks from Plex", tracks.len());

            let syncer = Syncer::new(&database, &catalog, config.manual_search);
            let mut chooser = ConsolePrompt;
            let report = syncer.sync_all(tracks, &mut chooser, force, write).await?;

            println!(
                "Synced {} tracks ({} skipped, {} unmatched)",
                report.synced, report.skipped, report.unmatched
            );
        }
        Commands::SyncRecent { days } => {
            let catalog = PlexHttpCatalog::connect(&config).await?;
            let database = Database::open(&database_path(args.database)?).await?;
            let syncer = Syncer::new(&database, &catalog, config.manual_search);
            syncer.sync_recent(days).await?;
        }
        Commands::Import { input } => {
            let database = Database::open(&database_path(args.database)?).await?;
            let report = import_path(&input, &database).await?;
            println!(
                "Imported {} tracks ({} updated, {} errors)",
                report.imported, report.updated, report.errors
            );
        }
        Commands::Config(config_commands) => match config_commands {
            ConfigCommands::CreateDefault => {
                let path = Config::create_default()?;
                println!("{}", path.display());
            }
            ConfigCommands::Path => match Config::config_path() {
                Some(path) => println!("{}", path.display()),
                None => println!("No default config path found"),
            },
        },
    }

    Ok(())
}
