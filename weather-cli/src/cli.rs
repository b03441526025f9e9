use std::sync::Arc;

use anyhow::{Context, anyhow, bail};
use clap::{ArgAction, Parser, Subcommand};
use inquire::{Confirm, InquireError, Password, PasswordDisplayMode, Select};
use weather_core::{
    Config, FileSettingsStore, FixedLocationProvider, IpLocationProvider, LocationFix,
    LocationProvider, Preferences, Units, WeatherOrchestrator, provider_from_config, regions,
};

use crate::{render, session};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Current weather for a city or your location")]
pub struct Cli {
    /// Don't read or write the saved search; keep everything in memory.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    /// More log output on stderr (-v debug, -vv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Defaults to `show`.
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred units.
    Configure {
        /// standard, metric or imperial; prompts when absent.
        #[arg(long)]
        units: Option<String>,
    },

    /// Startup flow: ask once about location, otherwise restore the last search.
    Show {
        /// Never prompt; restore the last search.
        #[arg(long)]
        no_prompt: bool,
    },

    /// Weather for a city, remembered for next time.
    Search {
        /// City name, at least 3 characters.
        city: String,

        /// State name or code, e.g. "IL" or "Illinois".
        #[arg(long)]
        state: Option<String>,

        /// Country name or ISO 3166 code, e.g. "US". Defaults to US when
        /// `--state` names a US state.
        #[arg(long)]
        country: Option<String>,
    },

    /// Weather for your current position.
    Locate {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,
    },

    /// Menu-driven session with search, location and refresh.
    Interactive,

    /// List US state codes accepted by `--state`.
    States,

    /// List country codes accepted by `--country`.
    Countries,
}

impl Cli {
    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "weather_core=debug,weather=debug,info",
            _ => "trace",
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let command = self.command.unwrap_or(Command::Show { no_prompt: false });

        match command {
            Command::Configure { units } => configure(units),
            Command::States => {
                for state in regions::US_STATES {
                    println!("{}  {}", state.code, state.name);
                }
                Ok(())
            }
            Command::Countries => {
                for country in regions::COUNTRIES {
                    println!("{}  {}", country.code, country.name);
                }
                Ok(())
            }
            Command::Show { no_prompt } => {
                let config = Config::load()?;
                let mut orch = build_orchestrator(&config, self.ephemeral)?;
                show(&mut orch, &config, no_prompt).await?;
                render::report(&orch, config.units)
            }
            Command::Search { city, state, country } => {
                let config = Config::load()?;
                let mut orch = build_orchestrator(&config, self.ephemeral)?;
                let (state, country) = regions::search_codes(state.as_deref(), country.as_deref());

                orch.fetch_by_city_name(Some(&city), state.as_deref(), country.as_deref())
                    .await?;
                render::report(&orch, config.units)
            }
            Command::Locate { lat, lon } => {
                let config = Config::load()?;
                let mut orch = build_orchestrator(&config, self.ephemeral)?;
                let provider = location_provider(&config, lat.zip(lon))?;

                if orch.locate(provider).await?.is_none() {
                    tracing::warn!(fixed = lat.is_some(), "locate finished without a fix");
                    bail!(
                        "Could not determine your location.\n\
                         Hint: pass --lat/--lon or run `weather search <city>`."
                    );
                }
                render::report(&orch, config.units)
            }
            Command::Interactive => {
                let config = Config::load()?;
                let orch = build_orchestrator(&config, self.ephemeral)?;
                session::run(orch, &config).await
            }
        }
    }
}

pub fn build_orchestrator(config: &Config, ephemeral: bool) -> anyhow::Result<WeatherOrchestrator> {
    let provider = provider_from_config(config)?;

    let prefs = if ephemeral {
        Preferences::in_memory()
    } else {
        let path = Config::settings_file_path()?;
        Preferences::new(Arc::new(FileSettingsStore::open(path)?))
    };

    Ok(WeatherOrchestrator::new(provider, prefs))
}

pub fn location_provider(
    config: &Config,
    coordinates: Option<(f64, f64)>,
) -> anyhow::Result<Arc<dyn LocationProvider>> {
    Ok(match coordinates {
        Some((lat, lon)) => Arc::new(FixedLocationProvider::new(LocationFix::new(lat, lon))),
        None => Arc::new(IpLocationProvider::new(config.geo_base_url(), config.timeout())?),
    })
}

/// First launch asks whether location may be used; later launches restore
/// the last search.
async fn show(orch: &mut WeatherOrchestrator, config: &Config, no_prompt: bool) -> anyhow::Result<()> {
    if no_prompt || orch.permission_was_asked_before() {
        tracing::debug!(no_prompt, "restoring last search");
        orch.fetch_by_city_name(None, None, None).await?;
        return Ok(());
    }

    let allowed = Confirm::new("Look up your approximate location from your IP address?")
        .with_default(true)
        .with_help_message("Asked once; later runs show your last search")
        .prompt()
        .context("Failed to read answer")?;
    orch.permission_was_asked()?;
    tracing::info!(allowed, "location permission answered");

    if allowed {
        let provider = location_provider(config, None)?;
        if orch.locate(provider).await?.is_some() {
            return Ok(());
        }
        tracing::info!("no location fix, falling back to last search");
    }

    orch.fetch_by_city_name(None, None, None).await?;
    Ok(())
}

fn configure(units: Option<String>) -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = match Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .with_help_message("Leave empty to keep the current key")
        .prompt()
    {
        Ok(key) => key,
        Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
            return Err(anyhow!("Configuration cancelled"));
        }
        Err(e) => return Err(e).context("Failed to read API key"),
    };
    if !api_key.trim().is_empty() {
        config.set_api_key(api_key);
    }

    config.units = match units {
        Some(u) => Units::try_from(u.as_str())?,
        None => {
            let options = vec![Units::Imperial, Units::Metric, Units::Standard];
            let cursor = options.iter().position(|u| *u == config.units).unwrap_or(0);
            Select::new("Units:", options)
                .with_starting_cursor(cursor)
                .prompt()
                .context("Failed to read units")?
        }
    };

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
