//! Reverse geocoding client

use super::throttle::MinIntervalLimiter;
use crate::config::GeocoderConfig;
use crate::http::join_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A WGS84 position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` for out-of-range or non-finite values
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        valid.then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Label to show when no address is available
    pub fn fallback_label(&self) -> String {
        format!("{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.fallback_label())
    }
}

#[derive(Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Throttled reverse geocoder
///
/// Never fails: every error path yields `None` so callers can fall back to
/// [`Coordinates::fallback_label`].
#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    http: reqwest::Client,
    base_url: String,
    enabled: bool,
    limiter: Arc<MinIntervalLimiter>,
}

impl ReverseGeocoder {
    pub fn new(http: reqwest::Client, config: &GeocoderConfig, limiter: Arc<MinIntervalLimiter>) -> Self {
        Self {
            http,
            base_url: config.base_url.clone(),
            enabled: config.enabled,
            limiter,
        }
    }

    /// Human-readable address for a position, or `None`
    pub async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<String> {
        if !self.enabled {
            return None;
        }
        let coords = Coordinates::new(latitude, longitude)?;

        self.limiter.acquire().await;

        let url = join_url(&self.base_url, "/reverse");
        let response = self
            .http
            .get(&url)
            .query(&[
                ("format", "jsonv2".to_string()),
                ("lat", coords.latitude.to_string()),
                ("lon", coords.longitude.to_string()),
            ])
            .send()
            .await
            .map_err(|e| tracing::debug!("reverse geocode request failed: {}", e))
            .ok()?;

        if response.status() != reqwest::StatusCode::OK {
            tracing::debug!(status = response.status().as_u16(), "reverse geocode rejected");
            return None;
        }

        let body: ReverseResponse = response
            .json()
            .await
            .map_err(|e| tracing::debug!("malformed reverse geocode payload: {}", e))
            .ok()?;

        body.display_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
    }

    /// Address label, falling back to the formatted coordinates
    pub async fn label_for(&self, coords: Coordinates) -> String {
        self.reverse_geocode(coords.latitude, coords.longitude)
            .await
            .unwrap_or_else(|| coords.fallback_label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn geocoder(server: &MockServer, interval: Duration) -> ReverseGeocoder {
        let config = GeocoderConfig {
            enabled: true,
            base_url: server.uri(),
            min_interval: interval,
        };
        ReverseGeocoder::new(
            reqwest::Client::new(),
            &config,
            Arc::new(MinIntervalLimiter::new(interval)),
        )
    }

    #[test]
    fn test_coordinates_validation() {
        assert!(Coordinates::new(0.3476, 32.5825).is_some());
        assert!(Coordinates::new(91.0, 0.0).is_none());
        assert!(Coordinates::new(0.0, f64::NAN).is_none());
        assert_eq!(
            Coordinates::new(0.347596, 32.58252).unwrap().fallback_label(),
            "0.34760, 32.58252"
        );
    }

    #[tokio::test]
    async fn test_reverse_geocode_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("format", "jsonv2"))
            .and(query_param("lat", "0.3476"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "display_name": "Kampala Road, Kampala, Uganda"
            })))
            .mount(&server)
            .await;

        let geocoder = geocoder(&server, Duration::from_millis(10));
        assert_eq!(
            geocoder.reverse_geocode(0.3476, 32.5825).await.as_deref(),
            Some("Kampala Road, Kampala, Uganda")
        );
    }

    #[tokio::test]
    async fn test_failures_yield_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "Unable to geocode"})))
            .mount(&server)
            .await;

        let geocoder = geocoder(&server, Duration::from_millis(1));
        assert_eq!(geocoder.reverse_geocode(1.0, 32.0).await, None);
        assert_eq!(geocoder.reverse_geocode(1.0, 32.0).await, None);
        assert_eq!(geocoder.reverse_geocode(1.0, 32.0).await, None);
        // invalid coordinates never reach the network
        assert_eq!(geocoder.reverse_geocode(200.0, 32.0).await, None);
    }

    #[tokio::test]
    async fn test_unreachable_provider_yields_fallback_label() {
        let config = GeocoderConfig {
            enabled: true,
            base_url: "http://127.0.0.1:9".to_string(),
            min_interval: Duration::from_millis(1),
        };
        let geocoder = ReverseGeocoder::new(
            reqwest::Client::new(),
            &config,
            Arc::new(MinIntervalLimiter::new(config.min_interval)),
        );
        let coords = Coordinates::new(0.5, 32.5).unwrap();
        assert_eq!(geocoder.label_for(coords).await, "0.50000, 32.50000");
    }

    #[tokio::test]
    async fn test_calls_are_spaced_by_min_interval() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"display_name": "Jinja"})))
            .expect(2)
            .mount(&server)
            .await;

        let geocoder = geocoder(&server, Duration::from_millis(1000));
        geocoder.reverse_geocode(0.42, 33.2).await;
        let second_start = std::time::Instant::now();
        geocoder.reverse_geocode(0.42, 33.2).await;

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 2);
        // the second call had to wait for most of the interval
        assert!(second_start.elapsed() >= Duration::from_millis(900));
    }

    #[tokio::test]
    async fn test_disabled_geocoder() {
        let config = GeocoderConfig {
            enabled: false,
            ..GeocoderConfig::default()
        };
        let geocoder = ReverseGeocoder::new(
            reqwest::Client::new(),
            &config,
            Arc::new(MinIntervalLimiter::default()),
        );
        assert_eq!(geocoder.reverse_geocode(0.3, 32.5).await, None);
    }
}
