use anyhow::{Context, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Text};
use std::sync::Arc;
use tracing::debug;

use skycast_core::{
    Config, Coordinates, DisplayModel, DisplayZone, FixedLocation, RefreshOutcome, TcpProbe,
    WeatherCache, WeatherError, WeatherPresenter, provider::provider_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Current weather for where you are")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the OpenWeather API key and an optional default location.
    Configure,

    /// Fetch the current weather and show it, falling back to the last cached result.
    Show {
        /// Latitude of the location fix.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of the location fix.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Show the last cached weather without touching the network.
    Cached {
        #[command(flatten)]
        display: DisplayArgs,
    },
}

#[derive(Debug, Args)]
pub struct DisplayArgs {
    /// Show times at this UTC offset (seconds) instead of the local time zone.
    #[arg(long, allow_negative_numbers = true)]
    utc_offset: Option<i32>,
}

impl DisplayArgs {
    fn zone(&self) -> anyhow::Result<DisplayZone> {
        match self.utc_offset {
            None => Ok(DisplayZone::Local),
            Some(secs) => DisplayZone::from_offset_seconds(secs)
                .ok_or_else(|| anyhow!("UTC offset {secs}s is out of range")),
        }
    }
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { lat, lon, display } => {
                let fix = lat.zip(lon).map(|(lat, lon)| Coordinates::new(lat, lon));
                show(fix, display.zone()?).await
            }
            Command::Cached { display } => {
                let config = Config::load()?;
                let presenter = build_presenter(&config, String::new(), display.zone()?)?;
                print_cached(&presenter).await
            }
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let mut prompt = Text::new("OpenWeather API key:");
    if let Some(existing) = config.api_key.as_deref() {
        prompt = prompt.with_default(existing);
    }
    let api_key = prompt.prompt().context("API key prompt cancelled")?;
    if api_key.trim().is_empty() {
        bail!("API key must not be empty");
    }
    config.set_api_key(api_key.trim().to_string());

    let wants_location = Confirm::new("Set a default location?")
        .with_default(config.default_location.is_some())
        .prompt()
        .context("Location prompt cancelled")?;

    let location = if wants_location {
        let latitude = CustomType::<f64>::new("Latitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Latitude prompt cancelled")?;
        let longitude = CustomType::<f64>::new("Longitude:")
            .with_error_message("Please enter a number")
            .prompt()
            .context("Longitude prompt cancelled")?;
        Some(Coordinates::new(latitude, longitude))
    } else {
        None
    };
    config.set_default_location(location);

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(fix: Option<Coordinates>, zone: DisplayZone) -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.api_key()?.to_owned();
    let presenter = build_presenter(&config, api_key, zone)?;
    let location = FixedLocation(fix.or(config.default_location));

    match presenter.refresh_from(&location).await {
        Ok(RefreshOutcome::Updated(model)) => {
            print_model(&model);
            Ok(())
        }
        Ok(RefreshOutcome::Skipped) => {
            debug!("Refresh skipped, falling back to cache");
            eprintln!("Network unavailable; showing the last cached weather.");
            print_cached(&presenter).await
        }
        Err(e @ WeatherError::Location(_)) => {
            debug!(error = %e, "No location fix, falling back to cache");
            eprintln!(
                "{e}.\nHint: pass --lat/--lon or run `skycast configure` to set a default location."
            );
            print_cached(&presenter).await
        }
        Err(e) => {
            debug!(error = %e, "Refresh failed, falling back to cache");
            eprintln!("Could not refresh weather: {e}");
            print_cached(&presenter).await
        }
    }
}

fn build_presenter(
    config: &Config,
    api_key: String,
    zone: DisplayZone,
) -> anyhow::Result<WeatherPresenter> {
    let store = Config::preference_store()?;
    let cache = WeatherCache::new(Arc::new(store));

    Ok(WeatherPresenter::new(
        provider_from_config(config),
        cache,
        Box::new(TcpProbe::for_base_url(config.base_url())),
        api_key,
    )
    .with_zone(zone))
}

async fn print_cached(presenter: &WeatherPresenter) -> anyhow::Result<()> {
    match presenter.load_cached().await {
        Some(model) => {
            print_model(&model);
            Ok(())
        }
        None => Err(anyhow!(
            "No cached weather available yet.\n\
             Hint: run `skycast show` while online to fetch it."
        )),
    }
}

fn print_model(model: &DisplayModel) {
    println!("{}", render(model));
}

fn render(model: &DisplayModel) -> String {
    let icon = model.icon.map(|i| i.as_str()).unwrap_or("-");

    format!(
        "{city}, {country}\n\
         {description} [{icon}]\n\
         Min {min}  Max {max}\n\
         Humidity {humidity}  Wind {wind}\n\
         Sunrise {sunrise}  Sunset {sunset}\n\
         {as_of}",
        city = model.city_name,
        country = model.country,
        description = model.description,
        min = model.temp_min,
        max = model.temp_max,
        humidity = model.humidity,
        wind = model.wind_speed,
        sunrise = model.sunrise,
        sunset = model.sunset,
        as_of = model.as_of,
    )
}
