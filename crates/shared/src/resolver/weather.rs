use tracing::{debug, warn};

use super::geo::{nearest_station, round_to_tenth};
use super::matching::{MatchStrategy, WEATHER_THRESHOLD, find_key};
use super::{
    GEOCODER_COUNTRY_CODE, LocationMatch, ResolutionInput, ResolvedLocation, ResolverSettings,
    plain_match,
};
use crate::dictionaries::{Coordinates, ReferenceDictionaries};
use crate::intent::is_weather_keyword;
use crate::normalize::normalize;
use crate::providers::Geocoder;

pub(super) async fn resolve(
    dictionaries: &ReferenceDictionaries,
    geocoder: &dyn Geocoder,
    settings: ResolverSettings,
    input: &ResolutionInput<'_>,
) -> Option<LocationMatch> {
    for candidate in input.candidates {
        if let Some(found) = find_key(candidate, dictionaries.station_names(), WEATHER_THRESHOLD) {
            return Some(plain_match(found));
        }

        if let Some(found) = find_key(candidate, dictionaries.settlements(), WEATHER_THRESHOLD)
            && let Some(station_id) = dictionaries.station_for_settlement(found.value)
        {
            return Some(LocationMatch {
                location_id: station_id.to_string(),
                location: ResolvedLocation::PlainName(found.key.to_string()),
                strategy: found.strategy,
            });
        }
    }

    let query = input
        .entities
        .place_like
        .first()
        .map(String::as_str)
        .unwrap_or(input.text);
    let normalized_query = normalize(query);
    if normalized_query.is_empty() || is_weather_keyword(&normalized_query) {
        return None;
    }

    nearest_by_geocoding(dictionaries, geocoder, settings, query).await
}

async fn nearest_by_geocoding(
    dictionaries: &ReferenceDictionaries,
    geocoder: &dyn Geocoder,
    settings: ResolverSettings,
    query: &str,
) -> Option<LocationMatch> {
    let place = match geocoder.geocode(query, GEOCODER_COUNTRY_CODE).await {
        Ok(Some(place)) => place,
        Ok(None) => return None,
        Err(err) => {
            warn!(error = %err, query_chars = query.chars().count(), "geocoding failed");
            return None;
        }
    };

    if !place.is_settlement_like() {
        debug!(
            feature_class = %place.feature_class,
            feature_type = %place.feature_type,
            "geocoded feature is not a settlement"
        );
        return None;
    }

    let point = Coordinates {
        latitude: place.latitude,
        longitude: place.longitude,
    };
    let nearest = nearest_station(dictionaries.stations(), point)?;
    if nearest.distance_km >= settings.max_distance_km {
        debug!(
            distance_km = nearest.distance_km,
            max_distance_km = settings.max_distance_km,
            "nearest station too far"
        );
        return None;
    }

    Some(LocationMatch {
        location_id: nearest.station_id.to_string(),
        location: ResolvedLocation::NearestNeighbor {
            query: query.to_string(),
            station_name: nearest.station.name.clone(),
            distance_km: round_to_tenth(nearest.distance_km),
        },
        strategy: MatchStrategy::NearestStation,
    })
}
