//! Integration tests for OpenWeatherProvider against a mock HTTP server.

use std::time::Duration;

use weather_core::{
    LocationFix, Units, WeatherProvider, provider::openweather::OpenWeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn current_body() -> serde_json::Value {
    serde_json::json!({
        "weather": [{"id": 800, "main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 72.5, "feels_like": 71.0, "temp_min": 68.0, "temp_max": 75.2, "humidity": 40},
        "wind": {"speed": 5.75, "deg": 90},
        "dt": 1_700_000_000,
        "name": "Paris"
    })
}

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::builder("TEST_KEY".to_string())
        .base_url(&server.uri())
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn query_request_sends_q_units_and_key() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("q", "Paris,,FR"))
        .and(query_param("units", "imperial"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let snap = provider(&server).by_query("Paris,,FR").await.unwrap();

    assert_eq!(snap.city_name.as_deref(), Some("Paris"));
    assert_eq!(snap.temperature, Some(72.5));
    assert_eq!(snap.humidity, Some(40));
    assert_eq!(snap.wind_direction.as_deref(), Some("E"));
    assert_eq!(snap.icon_url.as_deref(), Some("https://openweathermap.org/img/wn/01d@2x.png"));
}

#[tokio::test]
async fn coordinates_request_sends_lat_lon() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("lat", "47.6"))
        .and(query_param("lon", "-122.3"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_json(current_body()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = OpenWeatherProvider::builder("TEST_KEY".to_string())
        .base_url(&server.uri())
        .units(Units::Metric)
        .build()
        .unwrap();

    let snap = provider.by_coordinates(LocationFix::new(47.6, -122.3)).await.unwrap();
    assert_eq!(snap.description.as_deref(), Some("clear sky"));
}

#[tokio::test]
async fn not_found_surfaces_upstream_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(serde_json::json!({"cod": "404", "message": "city not found"})),
        )
        .mount(&server)
        .await;

    let err = provider(&server).by_query("Nowhereville").await.unwrap_err();
    let msg = err.to_string();

    assert!(msg.contains("404"));
    assert!(msg.contains("city not found"));
}

#[tokio::test]
async fn malformed_body_is_a_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = provider(&server).by_query("Paris").await.unwrap_err();
    assert!(err.to_string().contains("Failed to parse OpenWeather current JSON"));
}

#[tokio::test]
async fn missing_optional_blocks_are_tolerated() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "Somewhere"})),
        )
        .mount(&server)
        .await;

    let snap = provider(&server).by_query("Somewhere").await.unwrap();

    assert_eq!(snap.city_name.as_deref(), Some("Somewhere"));
    assert_eq!(snap.temperature, None);
    assert_eq!(snap.wind_speed, None);
    assert_eq!(snap.rain_3h, None);
}
