//! Location providers and the one-shot subscription used to read a single fix.

use anyhow::{Context, anyhow};
use parking_lot::Mutex;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, sync::Arc, time::Duration};
use tokio::{
    sync::mpsc::{self, UnboundedReceiver, UnboundedSender},
    task::JoinHandle,
};

use crate::model::LocationFix;

/// Where a provider delivers batches of fixes.
pub type FixSink = UnboundedSender<Vec<LocationFix>>;

#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location updates are already running")]
    AlreadyActive,
    #[error("Location service unavailable: {0}")]
    Unavailable(String),
}

/// A source of location fixes with an explicit start/stop lifecycle.
///
/// After `start_updates` the provider sends zero or more batches to `sink`
/// until `stop_updates` is called. Dropping the sink without sending means no
/// fix is available.
pub trait LocationProvider: Send + Sync + Debug {
    fn start_updates(&self, sink: FixSink) -> Result<(), LocationError>;
    fn stop_updates(&self);
}

/// Always reports the same fix, e.g. coordinates given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocationProvider {
    fix: LocationFix,
}

impl FixedLocationProvider {
    pub fn new(fix: LocationFix) -> Self {
        Self { fix }
    }
}

impl LocationProvider for FixedLocationProvider {
    fn start_updates(&self, sink: FixSink) -> Result<(), LocationError> {
        // A closed receiver just means nobody is listening any more.
        let _ = sink.send(vec![self.fix]);
        Ok(())
    }

    fn stop_updates(&self) {}
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
}

/// Approximate position from an IP geolocation service (ip-api.com JSON).
#[derive(Debug)]
pub struct IpLocationProvider {
    base_url: String,
    http: Client,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl IpLocationProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client for IP geolocation")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
            task: Mutex::new(None),
        })
    }

    async fn lookup(http: &Client, base_url: &str) -> anyhow::Result<LocationFix> {
        let url = format!("{base_url}/json");

        let res = http
            .get(&url)
            .query(&[("fields", "status,message,lat,lon,city")])
            .send()
            .await
            .context("Failed to send request to IP geolocation service")?;

        let status = res.status();
        if !status.is_success() {
            return Err(anyhow!("IP geolocation request failed with status {status}"));
        }

        let body: IpApiResponse =
            res.json().await.context("Failed to parse IP geolocation JSON")?;

        if body.status != "success" {
            return Err(anyhow!(
                "IP geolocation failed: {}",
                body.message.unwrap_or_else(|| body.status.clone())
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                tracing::info!(city = ?body.city, lat, lon, "resolved approximate location");
                Ok(LocationFix::new(lat, lon))
            }
            _ => Err(anyhow!("IP geolocation response had no coordinates")),
        }
    }
}

impl LocationProvider for IpLocationProvider {
    fn start_updates(&self, sink: FixSink) -> Result<(), LocationError> {
        let mut task = self.task.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return Err(LocationError::AlreadyActive);
        }

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| LocationError::Unavailable(e.to_string()))?;

        let http = self.http.clone();
        let base_url = self.base_url.clone();

        *task = Some(runtime.spawn(async move {
            match Self::lookup(&http, &base_url).await {
                Ok(fix) => {
                    let _ = sink.send(vec![fix]);
                }
                Err(e) => tracing::warn!("Location lookup failed: {e:#}"),
            }
        }));

        Ok(())
    }

    fn stop_updates(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }
}

/// One registered listener on a [`LocationProvider`].
///
/// Stops the provider when the first batch arrives, when asked to, or when
/// dropped, whichever comes first.
#[derive(Debug)]
pub struct LocationSubscription {
    provider: Arc<dyn LocationProvider>,
    rx: UnboundedReceiver<Vec<LocationFix>>,
    active: bool,
}

impl LocationSubscription {
    pub fn start(provider: Arc<dyn LocationProvider>) -> Result<Self, LocationError> {
        let (tx, rx) = mpsc::unbounded_channel();
        provider.start_updates(tx)?;
        tracing::debug!("location updates started");

        Ok(Self { provider, rx, active: true })
    }

    /// Wait for the first batch, keep its most recent fix and stop.
    pub async fn first_fix(mut self) -> Option<LocationFix> {
        let batch = self.rx.recv().await;
        self.stop();
        batch.and_then(|fixes| fixes.last().copied())
    }

    pub fn stop(&mut self) {
        if self.active {
            self.active = false;
            self.provider.stop_updates();
            tracing::debug!("location updates stopped");
        }
    }
}

impl Drop for LocationSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Sends a scripted batch (or nothing) and counts lifecycle calls.
    #[derive(Debug, Default)]
    struct ScriptedProvider {
        batch: Option<Vec<LocationFix>>,
        starts: AtomicUsize,
        stops: AtomicUsize,
    }

    impl LocationProvider for ScriptedProvider {
        fn start_updates(&self, sink: FixSink) -> Result<(), LocationError> {
            self.starts.fetch_add(1, Ordering::SeqCst);
            if let Some(batch) = &self.batch {
                let _ = sink.send(batch.clone());
                let _ = sink.send(vec![LocationFix::new(0.0, 0.0)]);
            }
            Ok(())
        }

        fn stop_updates(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn first_fix_takes_last_of_first_batch_and_stops_once() {
        let provider = Arc::new(ScriptedProvider {
            batch: Some(vec![LocationFix::new(1.0, 2.0), LocationFix::new(3.0, 4.0)]),
            ..Default::default()
        });

        let sub = LocationSubscription::start(provider.clone()).unwrap();
        let fix = sub.first_fix().await;

        assert_eq!(fix, Some(LocationFix::new(3.0, 4.0)));
        assert_eq!(provider.starts.load(Ordering::SeqCst), 1);
        assert_eq!(provider.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_batch_yields_no_fix() {
        let provider = Arc::new(ScriptedProvider { batch: Some(vec![]), ..Default::default() });

        let fix = LocationSubscription::start(provider.clone()).unwrap().first_fix().await;

        assert_eq!(fix, None);
        assert_eq!(provider.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn closed_sink_yields_no_fix() {
        let provider = Arc::new(ScriptedProvider::default());

        let fix = LocationSubscription::start(provider.clone()).unwrap().first_fix().await;

        assert_eq!(fix, None);
        assert_eq!(provider.stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn dropping_subscription_stops_provider() {
        let provider = Arc::new(ScriptedProvider::default());

        let sub = LocationSubscription::start(provider.clone()).unwrap();
        drop(sub);

        assert_eq!(provider.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fixed_provider_reports_its_fix() {
        let fix = LocationFix::new(47.6, -122.3);
        let provider = Arc::new(FixedLocationProvider::new(fix));

        let got = LocationSubscription::start(provider).unwrap().first_fix().await;
        assert_eq!(got, Some(fix));
    }

    #[test]
    fn ip_provider_needs_a_runtime() {
        let provider = IpLocationProvider::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        let err = provider.start_updates(tx).unwrap_err();
        assert!(matches!(err, LocationError::Unavailable(_)));
    }
}
