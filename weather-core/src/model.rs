use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const COMPASS_POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];

/// Minimum number of characters a searched city name must have after trimming.
pub const MIN_CITY_NAME_LEN: usize = 3;

/// Snapshot of current conditions for one place.
///
/// Every field is optional: OpenWeather omits fields freely (no `rain` block on
/// a dry day, no `name` for some coordinates), and the snapshot mirrors that
/// instead of inventing defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city_name: Option<String>,
    pub temperature: Option<f64>,
    pub humidity: Option<u8>,
    pub description: Option<String>,
    pub wind_speed: Option<f64>,
    /// Compass point, see [`wind_direction`].
    pub wind_direction: Option<String>,
    /// Full icon URL, see [`icon_url`].
    pub icon_url: Option<String>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    pub rain_1h: Option<f64>,
    pub rain_3h: Option<f64>,
    pub observed_at: Option<DateTime<Utc>>,
    pub fetched_at: Option<DateTime<Utc>>,
}

/// One reported (latitude, longitude) sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationFix {
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationFix {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl std::fmt::Display for LocationFix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Which source a refresh repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FetchMode {
    #[default]
    ByCity,
    ByLocation,
}

/// Unit system requested from the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    Standard,
    Metric,
    #[default]
    Imperial,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Standard => "standard",
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }

    pub fn temperature_suffix(&self) -> &'static str {
        match self {
            Units::Standard => "K",
            Units::Metric => "°C",
            Units::Imperial => "°F",
        }
    }

    pub fn speed_suffix(&self) -> &'static str {
        match self {
            Units::Standard | Units::Metric => "m/s",
            Units::Imperial => "mph",
        }
    }
}

impl std::fmt::Display for Units {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "standard" | "kelvin" => Ok(Units::Standard),
            "metric" | "celsius" => Ok(Units::Metric),
            "imperial" | "fahrenheit" => Ok(Units::Imperial),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: standard, metric, imperial."
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("City name must be at least {MIN_CITY_NAME_LEN} characters long")]
    CityTooShort,
}

/// A city search: city plus optional state and country codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    city: String,
    state_code: String,
    country_code: String,
}

impl SearchCriteria {
    /// Validate and normalize a search. Fields are trimmed; missing codes
    /// become empty strings.
    pub fn new(
        city: &str,
        state_code: Option<&str>,
        country_code: Option<&str>,
    ) -> Result<Self, SearchError> {
        let city = city.trim();
        if city.chars().count() < MIN_CITY_NAME_LEN {
            return Err(SearchError::CityTooShort);
        }

        Ok(Self {
            city: city.to_string(),
            state_code: state_code.unwrap_or_default().trim().to_string(),
            country_code: country_code.unwrap_or_default().trim().to_string(),
        })
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn state_code(&self) -> &str {
        &self.state_code
    }

    pub fn country_code(&self) -> &str {
        &self.country_code
    }

    /// `city,state,country` with trailing empty segments dropped.
    ///
    /// Only the end is trimmed, so an empty state between a city and a country
    /// stays as `City,,CC`.
    pub fn query(&self) -> String {
        format!("{},{},{}", self.city, self.state_code, self.country_code)
            .trim_end_matches(',')
            .to_string()
    }
}

/// Error shown once by the surface, then cleared with `reset_error`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ErrorState {
    #[error("{0}")]
    Generic(String),
    #[error("There is no saved city to refresh. Search for a city first.")]
    InvalidCity,
    #[error("There is no known location to refresh. Use your location first.")]
    InvalidLocation,
}

/// Nearest of the eight compass points for a bearing in degrees.
pub fn wind_direction(degrees: i32) -> &'static str {
    let index = ((f64::from(degrees) + 22.5) / 45.0).floor() as i64;
    COMPASS_POINTS[index.rem_euclid(8) as usize]
}

pub fn icon_url(icon: &str) -> String {
    format!("https://openweathermap.org/img/wn/{icon}@2x.png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wind_direction_cardinal_and_intercardinal_points() {
        let cases = [
            (0, "N"),
            (45, "NE"),
            (90, "E"),
            (135, "SE"),
            (180, "S"),
            (225, "SW"),
            (270, "W"),
            (315, "NW"),
        ];
        for (deg, expected) in cases {
            assert_eq!(wind_direction(deg), expected, "deg={deg}");
        }
    }

    #[test]
    fn wind_direction_rounds_to_nearest_point() {
        assert_eq!(wind_direction(44), "N");
        assert_eq!(wind_direction(46), "NE");
        assert_eq!(wind_direction(22), "N");
        assert_eq!(wind_direction(23), "NE");
        assert_eq!(wind_direction(338), "N");
    }

    #[test]
    fn wind_direction_wraps_past_full_circle() {
        assert_eq!(wind_direction(360), "N");
        assert_eq!(wind_direction(405), "NE");
    }

    #[test]
    fn icon_url_uses_2x_asset() {
        assert_eq!(icon_url("01d"), "https://openweathermap.org/img/wn/01d@2x.png");
        assert_eq!(icon_url("10n"), "https://openweathermap.org/img/wn/10n@2x.png");
    }

    #[test]
    fn query_city_only() {
        let c = SearchCriteria::new("Paris", Some(""), Some("")).unwrap();
        assert_eq!(c.query(), "Paris");

        let c = SearchCriteria::new("Paris", None, None).unwrap();
        assert_eq!(c.query(), "Paris");
    }

    #[test]
    fn query_keeps_empty_state_before_country() {
        let c = SearchCriteria::new("Paris", Some(""), Some("FR")).unwrap();
        assert_eq!(c.query(), "Paris,,FR");
    }

    #[test]
    fn query_with_all_fields_and_trailing_state() {
        let c = SearchCriteria::new("Paris", Some("IL"), Some("US")).unwrap();
        assert_eq!(c.query(), "Paris,IL,US");

        let c = SearchCriteria::new("Paris", Some("IL"), None).unwrap();
        assert_eq!(c.query(), "Paris,IL");
    }

    #[test]
    fn criteria_trims_fields() {
        let c = SearchCriteria::new("  Lyon ", Some(" "), Some(" FR ")).unwrap();
        assert_eq!(c.city(), "Lyon");
        assert_eq!(c.state_code(), "");
        assert_eq!(c.country_code(), "FR");
    }

    #[test]
    fn short_city_is_rejected_after_trim() {
        assert_eq!(SearchCriteria::new("  ab  ", None, None), Err(SearchError::CityTooShort));
        assert_eq!(SearchCriteria::new("", None, None), Err(SearchError::CityTooShort));
        assert!(SearchCriteria::new("Rom", None, None).is_ok());
    }

    #[test]
    fn units_parse_and_display() {
        assert_eq!(Units::try_from("Metric").unwrap(), Units::Metric);
        assert_eq!(Units::try_from("fahrenheit").unwrap(), Units::Imperial);
        assert_eq!(Units::default().to_string(), "imperial");
        assert!(Units::try_from("furlongs").is_err());
    }

    #[test]
    fn error_state_messages() {
        assert_eq!(ErrorState::Generic("boom".into()).to_string(), "boom");
        assert!(ErrorState::InvalidCity.to_string().contains("no saved city"));
        assert!(ErrorState::InvalidLocation.to_string().contains("no known location"));
    }
}
