//! poifinder CLI
//!
//! Find places around a location, filter them and keep favorites.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use poifinder::config::PoiFinderConfig;
use poifinder::geolocation::{FallbackLocationProvider, LocationParser, LocationProvider};
use poifinder::{Favorites, FilterState, FjallStore, Poi, PoiCategory, PoiFetcher, favorites, logging};
use tracing::debug;

/// Nearby points of interest from OpenStreetMap
#[derive(Parser)]
#[command(name = "poifinder")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (defaults to the user config directory)
    #[arg(short, long, env = "POIFINDER_CONFIG")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for places around a location
    Nearby {
        /// Coordinates ("lat,lon") or a place name
        #[arg(short, long)]
        location: String,

        /// Location used when the first one cannot be resolved
        #[arg(long)]
        fallback_location: Option<String>,

        /// Search radius in meters (capped by the configured maximum)
        #[arg(short, long)]
        radius: Option<f64>,

        /// Hide places farther away than this, in meters
        #[arg(short, long)]
        max_distance: Option<f64>,

        /// Only show these categories (repeatable)
        #[arg(short = 'C', long = "category")]
        categories: Vec<PoiCategory>,

        /// Only show favorites
        #[arg(long)]
        favorites: bool,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage favorite places
    Favorites {
        #[command(subcommand)]
        action: FavoritesAction,
    },

    /// Print the effective configuration
    Config,

    /// List known categories
    Categories,
}

#[derive(Subcommand)]
enum FavoritesAction {
    /// List favorite ids
    List,
    /// Add or remove a place by id
    Toggle { id: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = PoiFinderConfig::load_from_path(cli.config.clone())
        .with_context(|| "Failed to load configuration")?;
    logging::init(&config.logging, cli.verbose)?;
    debug!("Configuration loaded");

    match cli.command {
        Commands::Nearby {
            location,
            fallback_location,
            radius,
            max_distance,
            categories,
            favorites,
            json,
        } => {
            let filter = FilterState::new(
                categories,
                max_distance.unwrap_or(config.defaults.max_distance_m),
            );
            let request = NearbyRequest {
                location,
                fallback_location,
                radius_m: radius.unwrap_or(config.defaults.search_radius_m),
                filter,
                favorites_only: favorites,
                json,
            };
            if let Err(err) = nearby(&config, request).await {
                match err.downcast_ref::<poifinder::PoiFinderError>() {
                    Some(known) => eprintln!("{}", known.user_message()),
                    None => eprintln!("Error: {err:#}"),
                }
                std::process::exit(1);
            }
        }

        Commands::Favorites { action } => {
            let store = FjallStore::open(config.favorites_path())?;
            let mut favorites = Favorites::load(store, config.favorites.key.clone()).await?;
            match action {
                FavoritesAction::List => {
                    if favorites.is_empty() {
                        println!("No favorites yet.");
                    }
                    for id in favorites.ids() {
                        println!("{id}");
                    }
                }
                FavoritesAction::Toggle { id } => {
                    if favorites.toggle(&id).await? {
                        println!("Added {id} to favorites");
                    } else {
                        println!("Removed {id} from favorites");
                    }
                }
            }
        }

        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }

        Commands::Categories => {
            for category in PoiCategory::ALL {
                println!("{:<14} {}", category.as_str(), category.label());
            }
        }
    }

    Ok(())
}

struct NearbyRequest {
    location: String,
    fallback_location: Option<String>,
    radius_m: f64,
    filter: FilterState,
    favorites_only: bool,
    json: bool,
}

async fn nearby(config: &PoiFinderConfig, request: NearbyRequest) -> Result<()> {
    let base_url = &config.geolocation.geocoding_base_url;
    let user_agent = &config.overpass.user_agent;

    let primary = LocationParser::parse(&request.location)?.into_provider(base_url, user_agent)?;
    let mut provider = FallbackLocationProvider::new(primary, config.geolocation.timeout());
    if let Some(fallback) = &request.fallback_location {
        provider = provider
            .with_secondary(LocationParser::parse(fallback)?.into_provider(base_url, user_agent)?);
    }
    let center = provider
        .current_location()
        .await
        .map_err(poifinder::PoiFinderError::from)?;

    let favorites = favorites::load_or_empty(&config.favorites_path(), &config.favorites.key).await;

    let fetcher = PoiFetcher::from_config(config)?;
    let pois = fetcher.fetch_nearby(&center, request.radius_m).await?;

    let visible: Vec<&Poi> = if request.favorites_only {
        let favored = favorites.select(&pois);
        favored
            .into_iter()
            .filter(|poi| request.filter.matches(poi))
            .collect()
    } else {
        request.filter.apply(&pois)
    };

    if request.json {
        println!("{}", serde_json::to_string_pretty(&visible)?);
        return Ok(());
    }

    println!(
        "{} places near {} ({} fetched)",
        visible.len(),
        center.format_coordinates(),
        pois.len()
    );
    for poi in visible {
        let marker = if favorites.is_favorite(&poi.id) { "*" } else { " " };
        println!(
            "{marker} {:<32} {:<14} {:>7}  {}",
            poi.name,
            poi.category.label(),
            poi.format_distance(),
            poi.address.as_deref().unwrap_or("")
        );
        debug!("  id {} -> {}", poi.id, poi.directions_url());
    }

    Ok(())
}
