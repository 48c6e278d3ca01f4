use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::ProviderConfigError;

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "pogodowy-stroz/0.1";
pub const DEFAULT_GEOCODER_TIMEOUT_MS: u64 = 5_000;

pub type GeocoderFuture<'a> =
    Pin<Box<dyn Future<Output = Result<Option<GeocodedPlace>, GeocoderError>> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub latitude: f64,
    pub longitude: f64,
    pub feature_class: String,
    pub feature_type: String,
}

impl GeocodedPlace {
    /// Settlements and administrative areas only; shops, roads and natural
    /// boundaries are rejected.
    pub fn is_settlement_like(&self) -> bool {
        match self.feature_class.as_str() {
            "place" => true,
            "boundary" => self.feature_type == "administrative",
            _ => false,
        }
    }
}

#[derive(Debug, Error)]
pub enum GeocoderError {
    #[error("geocoder request timed out")]
    Timeout,
    #[error("geocoder unavailable: {0}")]
    Unavailable(String),
    #[error("geocoder returned an invalid payload: {0}")]
    InvalidPayload(String),
}

pub trait Geocoder: Send + Sync {
    fn geocode<'a>(&'a self, query: &'a str, country_code: &'a str) -> GeocoderFuture<'a>;
}

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub search_url: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            search_url: DEFAULT_GEOCODER_URL.to_string(),
            user_agent: DEFAULT_GEOCODER_USER_AGENT.to_string(),
            timeout_ms: DEFAULT_GEOCODER_TIMEOUT_MS,
        }
    }
}

#[derive(Clone)]
pub struct NominatimGeocoder {
    client: reqwest::Client,
    config: NominatimConfig,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, ProviderConfigError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|err| ProviderConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    async fn search(&self, query: &str, country_code: &str) -> Result<Option<GeocodedPlace>, GeocoderError> {
        let response = self
            .client
            .get(&self.config.search_url)
            .query(&[
                ("q", query),
                ("countrycodes", country_code),
                ("format", "json"),
                ("limit", "1"),
                ("accept-language", "pl"),
            ])
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    GeocoderError::Timeout
                } else {
                    GeocoderError::Unavailable("request_unavailable".to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocoderError::Unavailable(format!("status={}", status.as_u16())));
        }

        let places = response
            .json::<Vec<NominatimPlace>>()
            .await
            .map_err(|_| GeocoderError::InvalidPayload("response_json_parse_failed".to_string()))?;

        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let latitude = place
            .lat
            .parse::<f64>()
            .map_err(|_| GeocoderError::InvalidPayload("invalid_latitude".to_string()))?;
        let longitude = place
            .lon
            .parse::<f64>()
            .map_err(|_| GeocoderError::InvalidPayload("invalid_longitude".to_string()))?;

        Ok(Some(GeocodedPlace {
            latitude,
            longitude,
            feature_class: place.class,
            feature_type: place.kind,
        }))
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode<'a>(&'a self, query: &'a str, country_code: &'a str) -> GeocoderFuture<'a> {
        Box::pin(self.search(query, country_code))
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    class: String,
    #[serde(rename = "type", default)]
    kind: String,
}

#[cfg(test)]
mod tests {
    use super::GeocodedPlace;

    fn place(class: &str, kind: &str) -> GeocodedPlace {
        GeocodedPlace {
            latitude: 52.0,
            longitude: 21.0,
            feature_class: class.to_string(),
            feature_type: kind.to_string(),
        }
    }

    #[test]
    fn only_places_and_administrative_boundaries_are_settlement_like() {
        assert!(place("place", "village").is_settlement_like());
        assert!(place("boundary", "administrative").is_settlement_like());
        assert!(!place("boundary", "national_park").is_settlement_like());
        assert!(!place("shop", "supermarket").is_settlement_like());
    }
}
