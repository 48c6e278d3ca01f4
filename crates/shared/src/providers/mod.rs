//! Collaborators the dialogue engine talks to: language analysis, geocoding
//! and the IMGW data provider.

use thiserror::Error;

pub mod geocoder;
pub mod imgw;
pub mod nlp;

pub use geocoder::{
    GeocodedPlace, Geocoder, GeocoderError, GeocoderFuture, NominatimConfig, NominatimGeocoder,
};
pub use imgw::{
    DataFetcher, FetchError, FetchFuture, FetchRequest, ImgwClient, ImgwConfig, ProviderPayload,
};
pub use nlp::{KeywordAnalyzer, LanguageAnalyzer};

#[derive(Debug, Error)]
pub enum ProviderConfigError {
    #[error("failed to build http client: {0}")]
    HttpClient(String),
}
