//! Wire-format tests for the OpenWeather client against a local mock server.

use skycast_core::provider::openweather::OpenWeatherProvider;
use skycast_core::{Error, LocationQuery, Units, WeatherProvider};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CURRENT_BODY: &str = r#"{
    "name": "Paris",
    "dt": 1700000000,
    "main": {
        "temp": 12.3,
        "feels_like": 11.0,
        "temp_min": 10.1,
        "temp_max": 14.6,
        "humidity": 70,
        "pressure": 1012
    },
    "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}],
    "wind": {"speed": 4.2},
    "sys": {"country": "FR"}
}"#;

const FORECAST_BODY: &str = r#"{
    "city": {"name": "Paris", "country": "FR"},
    "list": [
        {
            "dt": 1700000000,
            "main": {"temp": 11.0, "feels_like": 10.0, "temp_min": 9.0, "temp_max": 12.0, "humidity": 75, "pressure": 1010},
            "weather": [{"id": 500, "main": "Rain", "description": "light rain", "icon": "10d"}],
            "wind": {"speed": 5.0}
        },
        {
            "dt": 1700010800,
            "main": {"temp": 12.5, "feels_like": 11.5, "temp_min": 10.0, "temp_max": 13.0, "humidity": 68, "pressure": 1011},
            "weather": [{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}],
            "wind": {"speed": 4.0}
        }
    ]
}"#;

fn provider(server: &MockServer) -> OpenWeatherProvider {
    OpenWeatherProvider::new("KEY".to_string()).with_base_url(server.uri())
}

#[tokio::test]
async fn current_conditions_by_city_parses_full_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("q", "Paris"))
        .and(query_param("appid", "KEY"))
        .and(query_param("units", "metric"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CURRENT_BODY, "application/json"))
        .mount(&server)
        .await;

    let conditions = provider(&server)
        .current_conditions(&LocationQuery::City("Paris".to_string()), Units::Metric)
        .await
        .unwrap();

    assert_eq!(conditions.location_name, "Paris");
    assert_eq!(conditions.country, "FR");
    assert_eq!(conditions.temperature, 12.3);
    assert_eq!(conditions.feels_like, 11.0);
    assert_eq!(conditions.temp_min, 10.1);
    assert_eq!(conditions.temp_max, 14.6);
    assert_eq!(conditions.humidity, 70);
    assert_eq!(conditions.pressure, 1012);
    assert_eq!(conditions.wind_speed, 4.2);
    assert_eq!(conditions.condition, "Clouds");
    assert_eq!(conditions.description, "few clouds");
    assert_eq!(conditions.icon, "02d");
    assert_eq!(conditions.observed_at.timestamp(), 1_700_000_000);
}

#[tokio::test]
async fn coordinate_queries_send_lat_lon_and_units() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "52.52"))
        .and(query_param("lon", "13.4"))
        .and(query_param("units", "imperial"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(CURRENT_BODY, "application/json"))
        .mount(&server)
        .await;

    let result = provider(&server)
        .current_conditions(
            &LocationQuery::Coordinates { lat: 52.52, lon: 13.4 },
            Units::Imperial,
        )
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn forecast_parses_ordered_samples() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("q", "Paris"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(FORECAST_BODY, "application/json"))
        .mount(&server)
        .await;

    let forecast = provider(&server)
        .forecast(&LocationQuery::City("Paris".to_string()), Units::Metric)
        .await
        .unwrap();

    assert_eq!(forecast.city_name, "Paris");
    assert_eq!(forecast.country, "FR");
    assert_eq!(forecast.entries.len(), 2);
    assert_eq!(forecast.entries[0].condition, "Rain");
    assert_eq!(forecast.entries[1].temperature, 12.5);
    assert!(forecast.entries[0].at < forecast.entries[1].at);
}

#[tokio::test]
async fn non_success_status_is_a_provider_error_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(
            ResponseTemplate::new(401).set_body_raw(r#"{"message": "bad key"}"#, "application/json"),
        )
        .mount(&server)
        .await;

    let err = provider(&server)
        .current_conditions(&LocationQuery::City("Paris".to_string()), Units::Metric)
        .await
        .unwrap_err();

    match err {
        Error::Provider(message) => {
            assert!(message.contains("401"), "unexpected message: {message}");
            assert!(message.contains("bad key"), "unexpected message: {message}");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn multibyte_error_body_is_truncated_without_panicking() {
    let server = MockServer::start().await;
    // 'é' straddles the 200-byte truncation point of the error excerpt.
    let body = format!("{}é{}", "x".repeat(199), "y".repeat(100));
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(500).set_body_raw(body, "text/plain"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .current_conditions(&LocationQuery::City("Malmö".to_string()), Units::Metric)
        .await
        .unwrap_err();

    match err {
        Error::Provider(message) => {
            assert!(message.contains("500"), "unexpected message: {message}");
            assert!(message.contains("xxx..."), "unexpected message: {message}");
        }
        other => panic!("expected provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_is_a_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("not json", "application/json"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .forecast(&LocationQuery::City("Paris".to_string()), Units::Metric)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn missing_weather_array_entry_defaults_to_unknown() {
    let server = MockServer::start().await;
    let body = CURRENT_BODY.replace(
        r#"[{"id": 801, "main": "Clouds", "description": "few clouds", "icon": "02d"}]"#,
        "[]",
    );
    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "application/json"))
        .mount(&server)
        .await;

    let conditions = provider(&server)
        .current_conditions(&LocationQuery::City("Paris".to_string()), Units::Metric)
        .await
        .unwrap();

    assert_eq!(conditions.condition, "Unknown");
}
