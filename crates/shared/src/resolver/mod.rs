//! Turns candidate strings into a data-source key for the routed intent.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::candidates::Entities;
use crate::dictionaries::ReferenceDictionaries;
use crate::intent::Intent;
use crate::providers::Geocoder;

pub mod geo;
mod hydro;
pub mod matching;
mod warnings;
mod weather;

pub use matching::{KeyMatch, MatchStrategy, find_key};

pub const DEFAULT_MAX_DISTANCE_KM: f64 = 100.0;
pub const GEOCODER_COUNTRY_CODE: &str = "pl";

/// Where a resolved location id came from.
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedLocation {
    /// Normalized dictionary key that matched.
    PlainName(String),
    /// No station under the queried name; the closest one was used instead.
    NearestNeighbor {
        query: String,
        station_name: String,
        distance_km: f64,
    },
}

impl ResolvedLocation {
    pub fn is_nearest_neighbor(&self) -> bool {
        matches!(self, Self::NearestNeighbor { .. })
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::PlainName(name) => name,
            Self::NearestNeighbor { station_name, .. } => station_name,
        }
    }
}

impl fmt::Display for ResolvedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationMatch {
    pub location_id: String,
    pub location: ResolvedLocation,
    pub strategy: MatchStrategy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub intent: Intent,
    pub matched: Option<LocationMatch>,
}

impl Resolution {
    pub fn is_resolved(&self) -> bool {
        self.matched.is_some()
    }
}

/// Everything the resolver reads from the current turn.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionInput<'a> {
    /// Sanitized user text with case and diacritics intact.
    pub text: &'a str,
    pub normalized_text: &'a str,
    pub entities: &'a Entities,
    pub candidates: &'a [String],
    pub city_context: Option<&'a str>,
}

#[derive(Debug, Clone, Copy)]
pub struct ResolverSettings {
    pub max_distance_km: f64,
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self {
            max_distance_km: DEFAULT_MAX_DISTANCE_KM,
        }
    }
}

#[derive(Clone)]
pub struct LocationResolver {
    dictionaries: Arc<ReferenceDictionaries>,
    geocoder: Arc<dyn Geocoder>,
    settings: ResolverSettings,
}

impl LocationResolver {
    pub fn new(
        dictionaries: Arc<ReferenceDictionaries>,
        geocoder: Arc<dyn Geocoder>,
        settings: ResolverSettings,
    ) -> Self {
        Self {
            dictionaries,
            geocoder,
            settings,
        }
    }

    pub fn dictionaries(&self) -> &ReferenceDictionaries {
        &self.dictionaries
    }

    pub async fn resolve(&self, intent: Intent, input: &ResolutionInput<'_>) -> Resolution {
        let matched = match intent {
            Intent::Hydro => hydro::resolve(&self.dictionaries, input),
            Intent::Weather => {
                weather::resolve(
                    &self.dictionaries,
                    self.geocoder.as_ref(),
                    self.settings,
                    input,
                )
                .await
            }
            Intent::Warnings => warnings::resolve(&self.dictionaries, input),
        };

        match &matched {
            Some(found) => debug!(
                intent = intent.as_str(),
                strategy = found.strategy.as_str(),
                location_id = %found.location_id,
                "location resolved"
            ),
            None => debug!(intent = intent.as_str(), "location unresolved"),
        }

        Resolution { intent, matched }
    }
}

fn plain_match(found: KeyMatch<'_>) -> LocationMatch {
    LocationMatch {
        location_id: found.value.to_string(),
        location: ResolvedLocation::PlainName(found.key.to_string()),
        strategy: found.strategy,
    }
}
