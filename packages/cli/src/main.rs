#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line location mapper.
//!
//! Lists the places known to the admin API, replays GPS tracks recorded in
//! the field into place boundaries, previews stored boundaries, and
//! deletes places. Run without a subcommand for an interactive menu.
//!
//! Uses `indicatif-log-bridge` (via [`place_mapper_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and the recording spinner never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use place_mapper_api::PlacesApi;
use place_mapper_api::client::HttpPlacesApi;
use place_mapper_api::config::ApiConfig;

#[derive(Parser)]
#[command(name = "place_mapper", about = "Field boundary mapper for the places admin API")]
struct Cli {
    /// TOML config file (defaults to `PLACE_MAPPER_CONFIG`)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered places, or the children of a parent
    Places {
        /// Only show direct children of this place
        #[arg(long)]
        parent: Option<String>,
    },
    /// List top-level places that can be used as parents
    Parents {
        /// Leave this place out of the list
        #[arg(long)]
        exclude: Option<String>,
    },
    /// Replay a CSV GPS track (`lat,lng` rows) and save it as a boundary.
    /// Updates the place if the name is already registered, otherwise
    /// creates it at the first point of the track.
    Record {
        /// Place name
        #[arg(long)]
        name: String,
        /// Parent place name
        #[arg(long)]
        parent: Option<String>,
        /// Short description
        #[arg(long)]
        description: Option<String>,
        /// Track file to replay
        #[arg(long)]
        track: PathBuf,
        /// Delay between samples in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Print the SVG preview path of a stored boundary
    Preview {
        /// Place name
        #[arg(long)]
        name: String,
    },
    /// Delete a place and its sub-locations
    Delete {
        /// Place identifier
        #[arg(long)]
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = place_mapper_cli_utils::init_logger();
    let cli = Cli::parse();

    let config = ApiConfig::load(cli.config.as_deref())?;
    log::debug!("Using admin API at {}", config.base_url);
    let api: Arc<dyn PlacesApi> = Arc::new(HttpPlacesApi::new(config)?);

    let Some(command) = cli.command else {
        return interactive::run(api, &multi).await;
    };

    match command {
        Commands::Places { parent } => commands::list_places(api, parent.as_deref()).await?,
        Commands::Parents { exclude } => commands::list_parents(api, exclude.as_deref()).await?,
        Commands::Record {
            name,
            parent,
            description,
            track,
            interval_ms,
        } => {
            let args = commands::RecordArgs {
                name,
                parent,
                description,
                track,
                interval: interval_ms.map(Duration::from_millis),
            };
            commands::record(api, &multi, args).await?;
        }
        Commands::Preview { name } => commands::preview(api, &name).await?,
        Commands::Delete { id, yes } => commands::delete(api, id, yes).await?,
    }

    Ok(())
}
