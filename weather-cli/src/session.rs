//! Menu-driven session around a single orchestrator.

use std::fmt;

use anyhow::Context;
use inquire::{CustomUserError, InquireError, Select, Text, validator::Validation};
use weather_core::{Config, WeatherOrchestrator, model::MIN_CITY_NAME_LEN, regions};

use crate::{cli::location_provider, render};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Search,
    UseLocation,
    Refresh,
    Quit,
}

impl Action {
    const ALL: [Action; 4] = [Action::Search, Action::UseLocation, Action::Refresh, Action::Quit];
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Search => "Search for a city",
            Action::UseLocation => "Use my location",
            Action::Refresh => "Refresh",
            Action::Quit => "Quit",
        })
    }
}

fn is_cancel(e: &InquireError) -> bool {
    matches!(e, InquireError::OperationCanceled | InquireError::OperationInterrupted)
}

pub async fn run(mut orch: WeatherOrchestrator, config: &Config) -> anyhow::Result<()> {
    let indicator = render::spawn_loading_indicator(orch.subscribe());

    // Same starting point as `show --no-prompt`: the last search, if any.
    if let Err(e) = orch.fetch_by_city_name(None, None, None).await {
        eprintln!("Saved search ignored: {e}");
    }
    show_state(&orch, config);

    loop {
        let action = match Select::new("What next?", Action::ALL.to_vec()).prompt() {
            Ok(a) => a,
            Err(e) if is_cancel(&e) => break,
            Err(e) => return Err(e).context("Failed to read menu choice"),
        };

        match action {
            Action::Search => {
                let Some((city, state, country)) = prompt_search()? else {
                    continue;
                };
                if let Err(e) = orch
                    .fetch_by_city_name(Some(&city), Some(&state), Some(&country))
                    .await
                {
                    eprintln!("{e}");
                    continue;
                }
            }
            Action::UseLocation => {
                let provider = location_provider(config, None)?;
                match orch.locate(provider).await {
                    Ok(Some(_)) => {}
                    Ok(None) => eprintln!("Could not determine your location."),
                    Err(e) => eprintln!("{e}"),
                }
            }
            Action::Refresh => orch.refresh().await,
            Action::Quit => break,
        }

        show_state(&orch, config);
    }

    drop(orch);
    if let Err(e) = indicator.await {
        tracing::warn!("Loading indicator task failed: {e}");
    }
    Ok(())
}

/// Print the snapshot and any pending error, then clear the error so it is
/// not shown twice.
fn show_state(orch: &WeatherOrchestrator, config: &Config) {
    let state = orch.state();

    if let Some(error) = &state.error {
        eprintln!("Error: {error}");
        orch.reset_error();
    }

    if let Some(snapshot) = &state.snapshot {
        print!("{}", render::snapshot_text(snapshot, config.units));
    }
}

/// City, state code and country code; `None` if the user backed out.
fn prompt_search() -> anyhow::Result<Option<(String, String, String)>> {
    let city = Text::new("City:")
        .with_validator(|input: &str| {
            if input.trim().chars().count() >= MIN_CITY_NAME_LEN {
                Ok(Validation::Valid)
            } else {
                Ok(Validation::Invalid(
                    format!("City name must be at least {MIN_CITY_NAME_LEN} characters long")
                        .into(),
                ))
            }
        })
        .prompt();

    let city = match city {
        Ok(c) => c,
        Err(e) if is_cancel(&e) => {
            tracing::debug!("search prompt cancelled");
            return Ok(None);
        }
        Err(e) => return Err(e).context("Failed to read city"),
    };

    let state = Text::new("State (optional):")
        .with_help_message("US state name or code, e.g. IL")
        .prompt_skippable()
        .context("Failed to read state")?;

    let country = Text::new("Country (optional):")
        .with_help_message("Name or ISO 3166 code, e.g. US; defaults to US for a US state")
        .with_autocomplete(country_suggestions)
        .prompt_skippable()
        .context("Failed to read country")?;

    let (state, country) = regions::search_codes(state.as_deref(), country.as_deref());
    Ok(Some((city, state.unwrap_or_default(), country.unwrap_or_default())))
}

fn country_suggestions(input: &str) -> Result<Vec<String>, CustomUserError> {
    let needle = input.trim().to_lowercase();
    if needle.is_empty() {
        return Ok(Vec::new());
    }

    Ok(regions::COUNTRIES
        .iter()
        .filter(|r| r.name.to_lowercase().starts_with(&needle))
        .map(|r| r.name.to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn country_suggestions_match_name_prefix() {
        let got = country_suggestions("germ").unwrap();
        assert_eq!(got, vec!["Germany".to_string()]);
    }

    #[test]
    fn country_suggestions_empty_for_blank_input() {
        assert!(country_suggestions("  ").unwrap().is_empty());
    }
}
