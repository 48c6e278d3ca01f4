use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;
use shared::dialogue::DialogueState;
use shared::dictionaries::{Coordinates, DictionarySources, StationInfo};
use shared::intent::Intent;

/// One scripted conversation replayed against a fresh dialogue session.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationCaseFixture {
    pub case_id: String,
    pub description: String,
    #[serde(default)]
    pub include_in_live_smoke: bool,
    #[serde(default)]
    pub dictionaries: DictionaryFixture,
    /// Mocked geocoder answers keyed by lowercased query.
    #[serde(default)]
    pub geocoder: HashMap<String, GeocodedPlaceFixture>,
    /// Mocked provider outcomes keyed by `"{intent}:{location_id}"`.
    #[serde(default)]
    pub payloads: HashMap<String, PayloadFixture>,
    pub turns: Vec<TurnFixture>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DictionaryFixture {
    #[serde(default)]
    pub districts: IndexMap<String, String>,
    #[serde(default)]
    pub settlements: IndexMap<String, String>,
    #[serde(default)]
    pub settlement_stations: IndexMap<String, String>,
    #[serde(default)]
    pub hydro_stations: IndexMap<String, String>,
    #[serde(default)]
    pub stations: IndexMap<String, StationFixture>,
}

impl DictionaryFixture {
    pub fn to_sources(&self) -> DictionarySources {
        DictionarySources {
            districts: self.districts.clone(),
            settlements: self.settlements.clone(),
            settlement_stations: self.settlement_stations.clone(),
            hydro_stations: self.hydro_stations.clone(),
            stations: self
                .stations
                .iter()
                .map(|(station_id, station)| (station_id.clone(), station.to_station_info()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationFixture {
    pub name: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl StationFixture {
    fn to_station_info(&self) -> StationInfo {
        StationInfo {
            name: self.name.clone(),
            coordinates: match (self.lat, self.lon) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            },
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodedPlaceFixture {
    pub lat: f64,
    pub lon: f64,
    #[serde(default = "default_feature_class")]
    pub class: String,
    #[serde(rename = "type", default = "default_feature_type")]
    pub kind: String,
}

fn default_feature_class() -> String {
    "place".to_string()
}

fn default_feature_type() -> String {
    "town".to_string()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PayloadFixture {
    Ok { summary: String },
    NotFound,
    Unavailable,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TurnFixture {
    pub message: String,
    #[serde(default)]
    pub expect: TurnExpectations,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurnExpectations {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub response_contains: Vec<String>,
    #[serde(default)]
    pub state: Option<DialogueState>,
    /// `Some(None)` asserts that no intent is stored.
    #[serde(default, deserialize_with = "deserialize_explicit_option")]
    pub intent: Option<Option<Intent>>,
}

fn deserialize_explicit_option<'de, D>(deserializer: D) -> Result<Option<Option<Intent>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<Intent>::deserialize(deserializer).map(Some)
}
