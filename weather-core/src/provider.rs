use crate::{
    Config,
    model::{LocationFix, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod openweather;

/// The Weather Query Service: current conditions by coordinates or by a
/// free-text `city,state,country` query.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn by_coordinates(&self, fix: LocationFix) -> anyhow::Result<WeatherSnapshot>;

    async fn by_query(&self, query: &str) -> anyhow::Result<WeatherSnapshot>;
}

/// Construct the OpenWeather provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherProvider>> {
    let api_key = config.resolve_api_key()?;

    let provider = OpenWeatherProvider::builder(api_key)
        .base_url(config.base_url())
        .units(config.units)
        .timeout(config.timeout())
        .build()?;

    Ok(Arc::new(provider))
}
