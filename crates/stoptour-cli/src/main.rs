mod pages;
mod simulate;
mod store;

use std::path::PathBuf;

use clap::{CommandFactory, Parser, Subcommand};
use stoptour_core::Coordinate;
use tracing_subscriber::EnvFilter;

use crate::pages::BlockCommands;

#[derive(Debug, Parser)]
#[command(name = "stoptour-cli")]
#[command(about = "Edit stop pages and simulate geofence visits")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Create a new, empty stop page file (.json, .yaml or .yml)
    New {
        path: PathBuf,
        #[arg(long)]
        title: String,
        /// Latitude of the stop center
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        /// Longitude of the stop center
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Trigger radius in meters (defaults to `STOPTOUR_DEFAULT_GEOFENCE_RADIUS_M`)
        #[arg(long)]
        radius: Option<f64>,
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Check a page file and report every problem
    Validate { path: PathBuf },
    /// Add, remove, move, or list content blocks in a page file
    Block {
        #[command(subcommand)]
        command: BlockCommands,
    },
    /// Replay position samples against a page's geofence
    Simulate {
        path: PathBuf,
        /// A position sample as `lat,lon`; repeat in visiting order
        #[arg(
            long = "at",
            value_parser = parse_coordinate,
            required = true,
            allow_hyphen_values = true
        )]
        samples: Vec<Coordinate>,
    },
    /// Apply pending database migrations
    Migrate,
    /// Validate a page file and save it to the store
    Push { path: PathBuf },
    /// Fetch a page from the store into a file
    Pull { id: String, path: PathBuf },
    /// Delete a page from the store
    Delete { id: String },
    /// Upload an image and set it as the page's hero image
    UploadHero { path: PathBuf, image: PathBuf },
}

fn parse_coordinate(raw: &str) -> Result<Coordinate, String> {
    let (lat, lon) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected `lat,lon`, got '{raw}'"))?;
    let lat: f64 = lat
        .trim()
        .parse()
        .map_err(|e| format!("invalid latitude '{lat}': {e}"))?;
    let lon: f64 = lon
        .trim()
        .parse()
        .map_err(|e| format!("invalid longitude '{lon}': {e}"))?;
    Ok(Coordinate::new(lat, lon))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = stoptour_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(?config, "configuration loaded");

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::New {
            path,
            title,
            lat,
            lon,
            radius,
            force,
        }) => pages::run_new(
            &path,
            &title,
            Coordinate::new(lat, lon),
            radius.unwrap_or(config.default_geofence_radius_m),
            force,
        )?,
        Some(Commands::Validate { path }) => pages::run_validate(&path)?,
        Some(Commands::Block { command }) => pages::run_block(command)?,
        Some(Commands::Simulate { path, samples }) => {
            simulate::run_simulate(&config, &path, &samples).await?;
        }
        Some(Commands::Migrate) => store::run_migrate(&config).await?,
        Some(Commands::Push { path }) => store::run_push(&config, &path).await?,
        Some(Commands::Pull { id, path }) => store::run_pull(&config, &id, &path).await?,
        Some(Commands::Delete { id }) => store::run_delete(&config, &id).await?,
        Some(Commands::UploadHero { path, image }) => {
            store::run_upload_hero(&config, &path, &image).await?;
        }
        None => Cli::command().print_help()?,
    }

    Ok(())
}

#[cfg(test)]
mod tests;
