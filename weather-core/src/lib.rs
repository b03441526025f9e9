//! Core library for the `weather` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather client behind the `WeatherProvider` trait
//! - Location providers with one-shot subscriptions
//! - The settings store that remembers the last search
//! - `WeatherOrchestrator`, which ties them together into observable state
//!
//! It is used by `weather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod location;
pub mod model;
pub mod orchestrator;
pub mod provider;
pub mod regions;
pub mod settings;

pub use config::Config;
pub use location::{
    FixedLocationProvider, IpLocationProvider, LocationError, LocationProvider,
    LocationSubscription,
};
pub use model::{
    ErrorState, FetchMode, LocationFix, SearchCriteria, SearchError, Units, WeatherSnapshot,
};
pub use orchestrator::{ViewState, WeatherOrchestrator};
pub use provider::{WeatherProvider, provider_from_config};
pub use settings::{FileSettingsStore, MemorySettingsStore, Preferences, SettingsStore};
