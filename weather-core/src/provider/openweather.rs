use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS},
    model::{LocationFix, Units, WeatherSnapshot, icon_url, wind_direction},
};

use super::WeatherProvider;

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    units: Units,
    http: Client,
}

#[derive(Debug)]
pub struct OpenWeatherProviderBuilder {
    api_key: String,
    base_url: String,
    units: Units,
    timeout: Duration,
}

impl OpenWeatherProviderBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> Result<OpenWeatherProvider> {
        let http = Client::builder()
            .timeout(self.timeout)
            .build()
            .context("Failed to build HTTP client for OpenWeather")?;

        Ok(OpenWeatherProvider {
            api_key: self.api_key,
            base_url: self.base_url,
            units: self.units,
            http,
        })
    }
}

impl OpenWeatherProvider {
    pub fn builder(api_key: String) -> OpenWeatherProviderBuilder {
        OpenWeatherProviderBuilder {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            units: Units::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    pub fn units(&self) -> Units {
        self.units
    }

    async fn fetch_current(&self, params: &[(&str, String)], what: &str) -> Result<WeatherSnapshot> {
        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);

        let res = self
            .http
            .get(&url)
            .query(params)
            .query(&[("units", self.units.as_str()), ("appid", self.api_key.as_str())])
            .send()
            .await
            .with_context(|| format!("Failed to send request to OpenWeather ({what})"))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read OpenWeather current response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "OpenWeather request for {} failed with status {}: {}",
                what,
                status,
                upstream_message(&body),
            ));
        }

        let parsed: OwCurrentResponse =
            serde_json::from_str(&body).context("Failed to parse OpenWeather current JSON")?;

        Ok(parsed.into_snapshot(Utc::now()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwMain {
    temp: Option<f64>,
    feels_like: Option<f64>,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: Option<u8>,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: Option<String>,
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: Option<f64>,
    deg: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct OwRain {
    #[serde(rename = "1h")]
    one_hour: Option<f64>,
    #[serde(rename = "3h")]
    three_hours: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: Option<String>,
    dt: Option<i64>,
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
    wind: Option<OwWind>,
    rain: Option<OwRain>,
}

#[derive(Debug, Deserialize)]
struct OwErrorBody {
    message: String,
}

impl OwCurrentResponse {
    fn into_snapshot(self, fetched_at: DateTime<Utc>) -> WeatherSnapshot {
        let main = self.main.unwrap_or_default();
        let weather = self.weather.into_iter().next();
        let (description, icon) = weather.map(|w| (w.description, w.icon)).unwrap_or_default();

        WeatherSnapshot {
            city_name: self.name,
            temperature: main.temp,
            humidity: main.humidity,
            description,
            wind_speed: self.wind.as_ref().and_then(|w| w.speed),
            wind_direction: self
                .wind
                .as_ref()
                .and_then(|w| w.deg)
                .map(|deg| wind_direction(deg).to_string()),
            icon_url: icon.as_deref().map(icon_url),
            feels_like: main.feels_like,
            temp_min: main.temp_min,
            temp_max: main.temp_max,
            rain_1h: self.rain.as_ref().and_then(|r| r.one_hour),
            rain_3h: self.rain.as_ref().and_then(|r| r.three_hours),
            observed_at: self.dt.and_then(unix_to_utc),
            fetched_at: Some(fetched_at),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn by_coordinates(&self, fix: LocationFix) -> Result<WeatherSnapshot> {
        let params = [("lat", fix.latitude.to_string()), ("lon", fix.longitude.to_string())];
        self.fetch_current(&params, "coordinates").await
    }

    async fn by_query(&self, query: &str) -> Result<WeatherSnapshot> {
        let params = [("q", query.to_string())];
        self.fetch_current(&params, &format!("'{query}'")).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

/// OpenWeather error bodies look like `{"cod":"404","message":"city not found"}`.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<OwErrorBody>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| truncate_body(body))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
        "main": {"temp": 61.3, "feels_like": 60.8, "temp_min": 58.1, "temp_max": 63.9, "humidity": 82},
        "wind": {"speed": 9.2, "deg": 200},
        "rain": {"1h": 0.42},
        "dt": 1700000000,
        "name": "Seattle",
        "cod": 200
    }"#;

    #[test]
    fn maps_full_response() {
        let parsed: OwCurrentResponse = serde_json::from_str(FULL).unwrap();
        let now = Utc::now();
        let snap = parsed.into_snapshot(now);

        assert_eq!(snap.city_name.as_deref(), Some("Seattle"));
        assert_eq!(snap.temperature, Some(61.3));
        assert_eq!(snap.humidity, Some(82));
        assert_eq!(snap.description.as_deref(), Some("light rain"));
        assert_eq!(snap.wind_speed, Some(9.2));
        assert_eq!(snap.wind_direction.as_deref(), Some("S"));
        assert_eq!(
            snap.icon_url.as_deref(),
            Some("https://openweathermap.org/img/wn/10d@2x.png")
        );
        assert_eq!(snap.temp_min, Some(58.1));
        assert_eq!(snap.temp_max, Some(63.9));
        assert_eq!(snap.rain_1h, Some(0.42));
        assert_eq!(snap.rain_3h, None);
        assert_eq!(snap.observed_at.map(|t| t.timestamp()), Some(1_700_000_000));
        assert_eq!(snap.fetched_at, Some(now));
    }

    #[test]
    fn tolerates_empty_response() {
        let parsed: OwCurrentResponse = serde_json::from_str("{}").unwrap();
        let snap = parsed.into_snapshot(Utc::now());

        assert_eq!(snap.city_name, None);
        assert_eq!(snap.temperature, None);
        assert_eq!(snap.wind_direction, None);
        assert_eq!(snap.icon_url, None);
        assert_eq!(snap.rain_1h, None);
    }

    #[test]
    fn upstream_message_prefers_json_message() {
        assert_eq!(upstream_message(r#"{"cod":"404","message":"city not found"}"#), "city not found");
        assert_eq!(upstream_message("Bad Gateway"), "Bad Gateway");
    }

    #[test]
    fn truncate_body_limits_length() {
        let long = "x".repeat(500);
        let out = truncate_body(&long);
        assert_eq!(out.len(), 203);
        assert!(out.ends_with("..."));
    }
}
