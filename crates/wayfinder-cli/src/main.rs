mod commands;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use wayfinder_cli::logging::{init_logging, LoggingConfig};
use wayfinder_cli::output::OutputFormat;
use wayfinder_lib::FileSnapshotStore;

use commands::route::RouteCommandArgs;

#[derive(Parser, Debug)]
#[command(author, version, about = "Indoor wayfinding over cached building maps")]
struct Cli {
    /// Override the building snapshot cache directory.
    #[arg(long, global = true)]
    cache_dir: Option<PathBuf>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a walking route between two nodes.
    Route(RouteCommandArgs),
    /// List cached building maps.
    Buildings,
    /// Cache a building map from a JSON snapshot file.
    Import {
        /// Path to the snapshot document.
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logging(&LoggingConfig::from_env());
    let cli = Cli::parse();

    let store = match cli.cache_dir {
        Some(dir) => FileSnapshotStore::new(dir),
        None => FileSnapshotStore::open_default()
            .context("failed to locate the building cache directory")?,
    };

    match cli.command {
        Command::Route(args) => {
            commands::route::handle_route_command(store, cli.format, &args).await
        }
        Command::Buildings => commands::buildings::handle_list_buildings(&store, cli.format),
        Command::Import { file } => commands::import::handle_import(&store, &file),
    }
}
