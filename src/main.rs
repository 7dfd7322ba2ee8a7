//! Favcast command line.
//!
//! ```bash
//! favcast add --user 1 Paris
//! favcast add --user 1 "Home" --lat 48.85 --lon 2.35
//! favcast list --user 1
//! favcast weather --user 1 Paris
//! favcast map --user 1 Paris clouds --zoom 6
//! favcast all --user 1
//! ```

use clap::{Parser, Subcommand};
use serde::Serialize;

use favcast_core::{App, AppError, Config};
use favcast_services::UserId;

#[derive(Parser)]
#[command(name = "favcast")]
#[command(author, version, about = "Weather for your favorite cities")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a city to favorites, geocoding it unless coordinates are given
    Add {
        #[arg(short, long)]
        user: UserId,

        city: String,

        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,
    },
    /// Remove a city from favorites
    Remove {
        #[arg(short, long)]
        user: UserId,

        city: String,
    },
    /// List favorites in the order they were added
    List {
        #[arg(short, long)]
        user: UserId,
    },
    /// Current weather for a favorite
    Weather {
        #[arg(short, long)]
        user: UserId,

        city: String,
    },
    /// Five-day forecast for a favorite
    Forecast {
        #[arg(short, long)]
        user: UserId,

        city: String,
    },
    /// Air pollution for a favorite
    Pollution {
        #[arg(short, long)]
        user: UserId,

        city: String,
    },
    /// Weather map tile for a favorite
    Map {
        #[arg(short, long)]
        user: UserId,

        city: String,

        /// One of clouds, precipitation, sea_level_pressure, wind_speed, temperature
        criterion: String,

        #[arg(short, long)]
        zoom: Option<u8>,
    },
    /// Current weather for every favorite
    All {
        #[arg(short, long)]
        user: UserId,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {}", e);
        eprintln!("error: {} ({})", e.user_message(), e);
        std::process::exit(1);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let out = serde_json::to_string_pretty(value).map_err(anyhow::Error::from)?;
    println!("{}", out);
    Ok(())
}

async fn run(cli: Cli) -> Result<(), AppError> {
    let loaded = Config::load_validated()?;
    favcast_core::init(&loaded.config.logging.level)?;
    loaded.log_notices();

    let app = App::from_config(loaded.config)?;
    let service = app.service();

    match cli.command {
        Commands::Add {
            user,
            city,
            lat,
            lon,
        } => {
            let favorite = match (lat, lon) {
                (Some(lat), Some(lon)) => service.add_favorite(user, &city, lat, lon).await?,
                _ => service.add_city(user, &city).await?,
            };
            println!(
                "City {} added to favorites ({:.4}, {:.4})",
                favorite.city_name, favorite.latitude, favorite.longitude
            );
        }
        Commands::Remove { user, city } => {
            service.remove_favorite(user, &city).await?;
            println!("City {} removed from favorites", city);
        }
        Commands::List { user } => print_json(&service.list_favorites(user).await?)?,
        Commands::Weather { user, city } => print_json(&service.get_weather(user, &city).await?)?,
        Commands::Forecast { user, city } => {
            print_json(&service.get_forecast(user, &city).await?)?
        }
        Commands::Pollution { user, city } => {
            print_json(&service.get_air_pollution(user, &city).await?)?
        }
        Commands::Map {
            user,
            city,
            criterion,
            zoom,
        } => print_json(&service.get_weather_map(user, &city, &criterion, zoom).await?)?,
        Commands::All { user } => {
            for entry in service.fetch_all(user).await? {
                match entry.result {
                    Ok(weather) => println!(
                        "{}: {:.1}, {} (humidity {}%)",
                        entry.city_name, weather.temperature, weather.description, weather.humidity
                    ),
                    Err(e) => println!("{}: unavailable ({})", entry.city_name, e.user_message()),
                }
            }
        }
    }

    Ok(())
}
