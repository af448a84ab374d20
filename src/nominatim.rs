//! Nominatim (OpenStreetMap) HTTP geocoder.
//!
//! The public Nominatim service allows one request per second per client;
//! every request, fallback attempts included, waits on the client's own
//! rate limiter first.

use std::time::Duration;

use serde::Deserialize;

use crate::address::fallback_queries;
use crate::error::GeocodeError;
use crate::lead::Coordinate;
use crate::rate_limit::RateLimiter;
use crate::traits::{GeocodeMatch, Geocoder};

/// Spacing between requests; 1 req/s policy plus a margin.
pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_millis(1100);

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    /// ISO 3166-1 alpha-2 codes results are restricted to (comma separated).
    pub country_codes: String,
    pub user_agent: String,
    pub min_interval: Duration,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            country_codes: "us".to_string(),
            user_agent: "Lead-o-Tron-5000/1.0 (personal-crm-app)".to_string(),
            min_interval: DEFAULT_RATE_LIMIT,
            timeout_secs: 10,
        }
    }
}

#[derive(Debug)]
pub struct NominatimClient {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
    limiter: RateLimiter,
}

impl NominatimClient {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;
        let limiter = RateLimiter::new(config.min_interval);

        Ok(Self {
            config,
            client,
            limiter,
        })
    }

    pub fn config(&self) -> &NominatimConfig {
        &self.config
    }

    /// One rate-limited search request. `Ok(None)` means no result.
    pub fn search(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        self.limiter.wait();

        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .get(url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("limit", "1"),
                ("addressdetails", "0"),
                ("countrycodes", self.config.country_codes.as_str()),
            ])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::Status(status));
        }

        let places: Vec<NominatimPlace> = response.json()?;
        places.into_iter().next().map(NominatimPlace::coordinate).transpose()
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, address: &str) -> Option<GeocodeMatch> {
        for (precision, query) in fallback_queries(address) {
            match self.search(&query) {
                Ok(Some(coordinate)) => {
                    tracing::info!(?precision, %query, %coordinate, "geocoded");
                    return Some(GeocodeMatch {
                        coordinate,
                        precision,
                    });
                }
                Ok(None) => {
                    tracing::debug!(?precision, %query, "no geocoding result");
                }
                Err(err) => {
                    tracing::warn!(?precision, %query, error = %err, "geocoding request failed");
                }
            }
        }

        if !address.trim().is_empty() {
            tracing::warn!(address = address.trim(), "could not geocode");
        }
        None
    }

    fn request_interval(&self) -> Duration {
        self.limiter.min_interval()
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    fn coordinate(self) -> Result<Coordinate, GeocodeError> {
        match (self.lat.trim().parse::<f64>(), self.lon.trim().parse::<f64>()) {
            (Ok(lat), Ok(lon)) => Ok(Coordinate::new(lat, lon)),
            _ => Err(GeocodeError::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_rate_limit_respects_policy() {
        assert!(DEFAULT_RATE_LIMIT >= Duration::from_secs(1));
        assert_eq!(NominatimConfig::default().min_interval, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn test_default_scopes_to_us() {
        assert_eq!(NominatimConfig::default().country_codes, "us");
    }

    #[test]
    fn test_place_parses_string_coordinates() {
        let places: Vec<NominatimPlace> = serde_json::from_str(
            r#"[{
                "place_id": 1,
                "lat": "38.8976633",
                "lon": "-77.0365739",
                "display_name": "White House"
            }]"#,
        )
        .unwrap();
        let coordinate = places.into_iter().next().unwrap().coordinate().unwrap();
        assert_eq!(coordinate, Coordinate::new(38.8976633, -77.0365739));
    }

    #[test]
    fn test_place_rejects_garbage() {
        let place = NominatimPlace {
            lat: "north".to_string(),
            lon: "-77.0".to_string(),
        };
        assert!(matches!(
            place.coordinate(),
            Err(GeocodeError::InvalidCoordinate { .. })
        ));
    }

    #[test]
    fn test_blank_address_sends_no_request() {
        // Unroutable base URL: any request would fail, but none is made.
        let client = NominatimClient::new(NominatimConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            min_interval: Duration::from_secs(60),
            ..NominatimConfig::default()
        })
        .unwrap();

        let start = std::time::Instant::now();
        assert!(client.geocode("   ").is_none());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_unreachable_service_is_not_found() {
        let client = NominatimClient::new(NominatimConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            min_interval: Duration::from_millis(1),
            timeout_secs: 2,
            ..NominatimConfig::default()
        })
        .unwrap();

        assert!(client.geocode("100 Main St, Savannah, GA 31401").is_none());
    }
}
