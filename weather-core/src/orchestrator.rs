//! Fetch orchestration: which source to query, what to persist, and the
//! loading/error/data state observers render from.

use std::{future::Future, sync::Arc};

use tokio::sync::watch;

use crate::{
    location::{LocationError, LocationProvider, LocationSubscription},
    model::{ErrorState, FetchMode, LocationFix, SearchCriteria, SearchError, WeatherSnapshot},
    provider::WeatherProvider,
    settings::Preferences,
};

/// Everything a surface needs to draw the current screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub snapshot: Option<WeatherSnapshot>,
    pub is_loading: bool,
    pub error: Option<ErrorState>,
    pub last_location: Option<LocationFix>,
    pub mode: FetchMode,
}

/// Coordinates the weather provider, the settings store and location fixes.
///
/// Operations that fetch take `&mut self`, so a single orchestrator never has
/// two requests in flight.
#[derive(Debug)]
pub struct WeatherOrchestrator {
    provider: Arc<dyn WeatherProvider>,
    prefs: Preferences,
    state: watch::Sender<ViewState>,
}

impl WeatherOrchestrator {
    pub fn new(provider: Arc<dyn WeatherProvider>, prefs: Preferences) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self { provider, prefs, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    pub fn preferences(&self) -> &Preferences {
        &self.prefs
    }

    pub async fn fetch_by_location(&mut self, latitude: f64, longitude: f64) {
        let fix = LocationFix::new(latitude, longitude);
        let provider = Arc::clone(&self.provider);

        tracing::info!(%fix, "fetching weather by location");
        self.run_fetch(FetchMode::ByLocation, async move { provider.by_coordinates(fix).await })
            .await;
    }

    /// Search by city, or repeat the saved search when `city` is `None`.
    ///
    /// A new city is saved with exactly the codes given; omitted codes become
    /// empty. Repeating the saved search reuses its saved codes. With no city
    /// given and none saved this is a no-op that leaves loading off.
    pub async fn fetch_by_city_name(
        &mut self,
        city: Option<&str>,
        state_code: Option<&str>,
        country_code: Option<&str>,
    ) -> Result<(), SearchError> {
        let criteria = match city {
            Some(city) => SearchCriteria::new(city, state_code, country_code)?,
            None => {
                let Some(saved_city) = self.prefs.city_name() else {
                    tracing::debug!("no city given or saved, nothing to fetch");
                    self.state.send_modify(|s| s.is_loading = false);
                    return Ok(());
                };
                let saved_state = self.prefs.state_code();
                let saved_country = self.prefs.country_code();
                SearchCriteria::new(
                    &saved_city,
                    state_code.or(saved_state.as_deref()),
                    country_code.or(saved_country.as_deref()),
                )?
            }
        };

        self.persist_search(&criteria);

        let query = criteria.query();
        let provider = Arc::clone(&self.provider);

        tracing::info!(%query, "fetching weather by city");
        self.run_fetch(FetchMode::ByCity, async move { provider.by_query(&query).await }).await;
        Ok(())
    }

    /// Repeat the most recently initiated kind of fetch.
    pub async fn refresh(&mut self) {
        let mode = self.state.borrow().mode;
        match mode {
            FetchMode::ByCity => {
                if self.prefs.city_name().is_none() {
                    tracing::warn!("refresh requested without a saved city");
                    self.state.send_modify(|s| s.error = Some(ErrorState::InvalidCity));
                    return;
                }
                if let Err(e) = self.fetch_by_city_name(None, None, None).await {
                    tracing::warn!("saved city is not searchable: {e}");
                    self.state.send_modify(|s| s.error = Some(ErrorState::InvalidCity));
                }
            }
            FetchMode::ByLocation => {
                let last = self.state.borrow().last_location;
                match last {
                    Some(fix) => self.fetch_by_location(fix.latitude, fix.longitude).await,
                    None => {
                        tracing::warn!("refresh requested without a known location");
                        self.state.send_modify(|s| s.error = Some(ErrorState::InvalidLocation));
                    }
                }
            }
        }
    }

    /// Clear the error once it has been shown.
    pub fn reset_error(&self) {
        self.state.send_if_modified(|s| s.error.take().is_some());
    }

    /// Record a fix delivered by a location provider.
    pub fn on_location_fix(&self, fix: LocationFix) {
        self.state.send_modify(|s| s.last_location = Some(fix));
    }

    /// Read one fix from `provider` and fetch weather for it.
    ///
    /// Returns `Ok(None)` when the provider delivered nothing; state is left
    /// untouched apart from loading being off.
    pub async fn locate(
        &mut self,
        provider: Arc<dyn LocationProvider>,
    ) -> Result<Option<LocationFix>, LocationError> {
        let subscription = LocationSubscription::start(provider)?;

        let Some(fix) = subscription.first_fix().await else {
            tracing::warn!("location provider delivered no fix");
            self.state.send_modify(|s| s.is_loading = false);
            return Ok(None);
        };

        self.on_location_fix(fix);
        self.fetch_by_location(fix.latitude, fix.longitude).await;
        Ok(Some(fix))
    }

    pub fn permission_was_asked(&self) -> anyhow::Result<()> {
        self.prefs.mark_permission_asked()
    }

    pub fn permission_was_asked_before(&self) -> bool {
        self.prefs.permission_was_asked_before()
    }

    fn persist_search(&self, criteria: &SearchCriteria) {
        let saved = self
            .prefs
            .save_city_name(criteria.city())
            .and_then(|_| self.prefs.save_state_code(criteria.state_code()))
            .and_then(|_| self.prefs.save_country_code(criteria.country_code()));

        match saved {
            Ok(()) => tracing::debug!(city = criteria.city(), "saved last search"),
            // The fetch itself can still succeed; the search just won't be restored.
            Err(e) => tracing::warn!("Failed to save last search: {e:#}"),
        }
    }

    async fn run_fetch<F>(&mut self, mode: FetchMode, fetch: F)
    where
        F: Future<Output = anyhow::Result<WeatherSnapshot>>,
    {
        self.state.send_modify(|s| {
            s.mode = mode;
            s.is_loading = true;
        });

        let result = fetch.await;

        self.state.send_modify(|s| {
            match result {
                Ok(snapshot) => {
                    tracing::info!(city = ?snapshot.city_name, "weather updated");
                    s.snapshot = Some(snapshot);
                }
                Err(e) => {
                    tracing::error!("Weather fetch failed: {e:#}");
                    s.error = Some(ErrorState::Generic(format!("{e:#}")));
                }
            }
            s.is_loading = false;
        });
    }
}
