//! SMN weather API client
//!
//! Fetches the station readings published by the Servicio Meteorológico
//! Nacional and wraps every attempt in a [`FetchEnvelope`]. A fetch is a single
//! bounded request: no retries, and failures are reported inside the envelope
//! instead of as an `Err`.

use async_trait::async_trait;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

use super::{FetchEnvelope, WeatherReading};
use crate::config::DEFAULT_SOURCE_URL;

/// Default upper bound for the request
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur while fetching station readings
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed, timed out or returned an error status
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Anything that can produce a fetch envelope
///
/// The refresher only depends on this trait, so it can be exercised without
/// network access.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch(&self) -> FetchEnvelope;
}

/// Client for the SMN station feed
#[derive(Debug, Clone)]
pub struct SmnClient {
    http_client: Client,
    url: String,
}

impl SmnClient {
    /// Creates a client for the public SMN endpoint with the default timeout
    pub fn new() -> Result<Self, reqwest::Error> {
        Self::with_url(DEFAULT_SOURCE_URL, DEFAULT_TIMEOUT)
    }

    /// Creates a client for a custom endpoint and timeout
    pub fn with_url(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            url: url.into(),
        })
    }

    /// The endpoint this client queries
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Performs one fetch attempt
    ///
    /// Always returns an envelope: `success: true` with the parsed readings,
    /// or `success: false` with the error message.
    pub async fn fetch(&self) -> FetchEnvelope {
        info!(url = %self.url, "Fetching SMN station readings");

        match self.fetch_readings().await {
            Ok(readings) => {
                info!(stations = readings.len(), "SMN fetch succeeded");
                FetchEnvelope::success(readings, &self.url)
            }
            Err(e) => {
                warn!(error = %e, "SMN fetch failed");
                FetchEnvelope::failure(e.to_string(), &self.url)
            }
        }
    }

    async fn fetch_readings(&self) -> Result<Vec<WeatherReading>, FetchError> {
        let response = self
            .http_client
            .get(&self.url)
            .header(ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        let text = response.text().await?;
        let readings: Vec<WeatherReading> = serde_json::from_str(&text)?;
        Ok(readings)
    }
}

#[async_trait]
impl WeatherSource for SmnClient {
    async fn fetch(&self) -> FetchEnvelope {
        SmnClient::fetch(self).await
    }
}

/// Formats a console summary of an envelope: station count plus the first
/// `sample` readings
pub fn summary(envelope: &FetchEnvelope, sample: usize) -> String {
    let Some(readings) = envelope.readings() else {
        return format!(
            "Could not fetch weather data: {}",
            envelope.error().unwrap_or("unknown error")
        );
    };

    let mut out = String::new();
    let _ = writeln!(out, "=== SMN ARGENTINA WEATHER SUMMARY ===");
    let _ = writeln!(
        out,
        "Fetched: {}",
        envelope.timestamp.with_timezone(&chrono::Local).format("%Y-%m-%d %H:%M:%S")
    );
    let _ = writeln!(out, "Total stations: {}", readings.len());

    for (i, reading) in readings.iter().take(sample).enumerate() {
        let weather = reading.weather.as_ref();
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{}. {}",
            i + 1,
            reading.name.as_deref().unwrap_or("Unnamed")
        );
        let _ = writeln!(
            out,
            "   Province:    {}",
            reading.province.as_deref().unwrap_or("Not specified")
        );
        let _ = writeln!(
            out,
            "   Temperature: {}°C",
            or_na(weather.and_then(|w| w.temp))
        );
        let _ = writeln!(
            out,
            "   Wind:        {} km/h",
            or_na(weather.and_then(|w| w.wind_speed))
        );
        let _ = writeln!(
            out,
            "   Humidity:    {}%",
            or_na(weather.and_then(|w| w.humidity))
        );
        let _ = writeln!(
            out,
            "   Description: {}",
            weather
                .and_then(|w| w.description.as_deref())
                .unwrap_or("N/A")
        );
    }

    out
}

fn or_na(value: Option<f64>) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| v.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::StationWeather;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const VALID_RESPONSE: &str = r#"[
        {"name": "Mendoza", "province": "Mendoza", "weather": {"temp": 18.5, "humidity": 30}},
        {"name": "Ushuaia", "province": "Tierra del Fuego", "weather": {"temp": 2}}
    ]"#;

    async fn client_for(server: &MockServer, timeout: Duration) -> SmnClient {
        SmnClient::with_url(format!("{}/map_items/weather", server.uri()), timeout)
            .expect("client should build")
    }

    #[test]
    fn test_default_client_targets_smn() {
        let client = SmnClient::new().unwrap();
        assert_eq!(client.url(), "https://ws.smn.gob.ar/map_items/weather");
    }

    #[tokio::test]
    async fn test_fetch_success_wraps_readings() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/map_items/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_string(VALID_RESPONSE))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, DEFAULT_TIMEOUT).await;
        let envelope = client.fetch().await;

        assert!(envelope.success);
        assert_eq!(envelope.source, client.url());
        let readings = envelope.readings().expect("readings present");
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].name.as_deref(), Some("Ushuaia"));
    }

    #[tokio::test]
    async fn test_fetch_http_error_becomes_failure_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let envelope = client_for(&server, DEFAULT_TIMEOUT).await.fetch().await;

        assert!(!envelope.success);
        assert!(envelope.error().unwrap().contains("503"));
        assert!(envelope.readings().is_none());
    }

    #[tokio::test]
    async fn test_fetch_malformed_body_becomes_failure_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{ invalid json }"))
            .mount(&server)
            .await;

        let envelope = client_for(&server, DEFAULT_TIMEOUT).await.fetch().await;

        assert!(!envelope.success);
        assert!(envelope.error().unwrap().contains("parse"));
    }

    #[tokio::test]
    async fn test_fetch_timeout_is_a_single_failed_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(VALID_RESPONSE)
                    .set_delay(Duration::from_secs(2)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let envelope = client_for(&server, Duration::from_millis(100))
            .await
            .fetch()
            .await;

        assert!(!envelope.success);
    }

    #[tokio::test]
    async fn test_fetch_unreachable_host_becomes_failure_envelope() {
        let client =
            SmnClient::with_url("http://127.0.0.1:9/map_items/weather", DEFAULT_TIMEOUT).unwrap();
        let envelope = client.fetch().await;
        assert!(!envelope.success);
        assert!(envelope.error().is_some());
    }

    #[test]
    fn test_summary_lists_sample_with_na_fallbacks() {
        let readings = vec![
            WeatherReading {
                name: Some("Rosario".to_string()),
                province: Some("Santa Fe".to_string()),
                weather: Some(StationWeather {
                    temp: Some(25.0),
                    description: Some("Despejado".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            },
            WeatherReading::default(),
        ];
        let envelope = FetchEnvelope::success(readings, "http://example.test");

        let text = summary(&envelope, 5);

        assert!(text.contains("Total stations: 2"));
        assert!(text.contains("1. Rosario"));
        assert!(text.contains("Temperature: 25°C"));
        assert!(text.contains("Wind:        N/A km/h"));
        assert!(text.contains("2. Unnamed"));
        assert!(text.contains("Province:    Not specified"));
    }

    #[test]
    fn test_summary_respects_sample_size() {
        let readings = (0..10)
            .map(|i| WeatherReading {
                name: Some(format!("Station {}", i)),
                ..Default::default()
            })
            .collect();
        let envelope = FetchEnvelope::success(readings, "http://example.test");

        let text = summary(&envelope, 5);
        assert!(text.contains("Station 4"));
        assert!(!text.contains("Station 5"));
    }

    #[test]
    fn test_summary_of_failure() {
        let envelope = FetchEnvelope::failure("connection refused", "http://example.test");
        assert_eq!(
            summary(&envelope, 5),
            "Could not fetch weather data: connection refused"
        );
    }
}
