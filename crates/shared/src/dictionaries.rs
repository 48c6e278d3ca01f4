use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

use crate::normalize::{normalize, title_case};

pub const DISTRICTS_FILE: &str = "terc_dict.json";
pub const SETTLEMENTS_FILE: &str = "simc_dict.json";
pub const SETTLEMENT_STATIONS_FILE: &str = "map_simc_to_imgw_synop.json";
pub const HYDRO_STATIONS_FILE: &str = "map_hydro.json";
pub const STATION_COORDS_FILE: &str = "station_coords.json";

/// Normalized key to canonical identifier, iterated in file order.
pub type Dictionary = IndexMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub name: String,
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Deserialize)]
struct StationRecord {
    name: String,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
}

/// Outcome of reading a single dictionary file.
#[derive(Debug)]
pub enum DictionaryLoad<T> {
    Loaded(T),
    Missing,
}

#[derive(Debug, Error)]
pub enum DictionaryLoadError {
    #[error("failed to read dictionary {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dictionary {path} is not valid JSON: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("dictionary {path} has a non-scalar value for key {key}")]
    InvalidValue { path: String, key: String },
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DictionaryOutcome {
    Loaded { entries: usize },
    Missing,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct DictionaryStatus {
    pub name: &'static str,
    #[serde(flatten)]
    pub outcome: DictionaryOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DictionaryLoadReport {
    pub dictionaries: Vec<DictionaryStatus>,
}

impl DictionaryLoadReport {
    pub fn total_entries(&self) -> usize {
        self.dictionaries
            .iter()
            .map(|status| match status.outcome {
                DictionaryOutcome::Loaded { entries } => entries,
                _ => 0,
            })
            .sum()
    }

    pub fn has_failures(&self) -> bool {
        self.dictionaries
            .iter()
            .any(|status| matches!(status.outcome, DictionaryOutcome::Failed { .. }))
    }
}

/// Raw dictionary contents before key normalization.
#[derive(Debug, Clone, Default)]
pub struct DictionarySources {
    pub districts: Dictionary,
    pub settlements: Dictionary,
    pub settlement_stations: Dictionary,
    pub hydro_stations: Dictionary,
    pub stations: IndexMap<String, StationInfo>,
}

#[derive(Debug, Clone, Default)]
pub struct ReferenceDictionaries {
    districts: Dictionary,
    settlements: Dictionary,
    settlement_stations: Dictionary,
    station_names: Dictionary,
    hydro_stations: Dictionary,
    stations: IndexMap<String, StationInfo>,
    known_rivers: HashSet<String>,
    district_names: HashMap<String, String>,
}

impl ReferenceDictionaries {
    pub fn from_sources(sources: DictionarySources) -> Self {
        let districts = normalize_keys(sources.districts);
        let settlements = normalize_keys(sources.settlements);
        let hydro_stations = normalize_keys(sources.hydro_stations);

        let station_names = sources
            .stations
            .iter()
            .map(|(station_id, station)| (normalize(&station.name), station_id.clone()))
            .collect::<Dictionary>();

        let known_rivers = hydro_stations
            .keys()
            .filter_map(|key| key.split_whitespace().next())
            .map(ToString::to_string)
            .collect::<HashSet<_>>();

        let district_names = districts
            .iter()
            .map(|(name, code)| (code.clone(), title_case(name)))
            .collect::<HashMap<_, _>>();

        Self {
            districts,
            settlements,
            settlement_stations: sources.settlement_stations,
            station_names,
            hydro_stations,
            stations: sources.stations,
            known_rivers,
            district_names,
        }
    }

    /// Loads every dictionary from `dir`, degrading each failed one to empty.
    pub fn load_from_dir(dir: &Path) -> (Self, DictionaryLoadReport) {
        let mut report = DictionaryLoadReport::default();

        let districts = record(
            &mut report,
            DISTRICTS_FILE,
            load_dictionary(&dir.join(DISTRICTS_FILE)),
            IndexMap::len,
        );
        let settlements = record(
            &mut report,
            SETTLEMENTS_FILE,
            load_dictionary(&dir.join(SETTLEMENTS_FILE)),
            IndexMap::len,
        );
        let settlement_stations = record(
            &mut report,
            SETTLEMENT_STATIONS_FILE,
            load_dictionary(&dir.join(SETTLEMENT_STATIONS_FILE)),
            IndexMap::len,
        );
        let hydro_stations = record(
            &mut report,
            HYDRO_STATIONS_FILE,
            load_dictionary(&dir.join(HYDRO_STATIONS_FILE)),
            IndexMap::len,
        );
        let stations = record(
            &mut report,
            STATION_COORDS_FILE,
            load_station_table(&dir.join(STATION_COORDS_FILE)),
            IndexMap::len,
        );

        let dictionaries = Self::from_sources(DictionarySources {
            districts,
            settlements,
            settlement_stations,
            hydro_stations,
            stations,
        });

        info!(
            data_dir = %dir.display(),
            districts = dictionaries.districts.len(),
            settlements = dictionaries.settlements.len(),
            settlement_stations = dictionaries.settlement_stations.len(),
            hydro_stations = dictionaries.hydro_stations.len(),
            weather_stations = dictionaries.stations.len(),
            known_rivers = dictionaries.known_rivers.len(),
            "reference dictionaries loaded"
        );

        (dictionaries, report)
    }

    pub fn districts(&self) -> &Dictionary {
        &self.districts
    }

    pub fn settlements(&self) -> &Dictionary {
        &self.settlements
    }

    pub fn station_names(&self) -> &Dictionary {
        &self.station_names
    }

    pub fn hydro_stations(&self) -> &Dictionary {
        &self.hydro_stations
    }

    pub fn stations(&self) -> &IndexMap<String, StationInfo> {
        &self.stations
    }

    pub fn known_rivers(&self) -> &HashSet<String> {
        &self.known_rivers
    }

    /// Weather station mapped to a settlement id, if any.
    pub fn station_for_settlement(&self, settlement_id: &str) -> Option<&str> {
        self.settlement_stations
            .get(settlement_id)
            .map(String::as_str)
    }

    pub fn district_display_name(&self, district_code: &str) -> Option<&str> {
        self.district_names.get(district_code).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.districts.is_empty()
            && self.settlements.is_empty()
            && self.station_names.is_empty()
            && self.hydro_stations.is_empty()
    }
}

/// Reads a flat key to identifier document. Numeric values are kept as their
/// decimal text.
pub fn load_dictionary(path: &Path) -> Result<DictionaryLoad<Dictionary>, DictionaryLoadError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(DictionaryLoad::Missing);
    };

    let parsed = serde_json::from_str::<IndexMap<String, Value>>(&raw).map_err(|source| {
        DictionaryLoadError::Parse {
            path: path.display().to_string(),
            source,
        }
    })?;

    let mut dictionary = Dictionary::with_capacity(parsed.len());
    for (key, value) in parsed {
        let identifier = match value {
            Value::String(text) => text,
            Value::Number(number) => number.to_string(),
            _ => {
                return Err(DictionaryLoadError::InvalidValue {
                    path: path.display().to_string(),
                    key,
                });
            }
        };
        dictionary.insert(key, identifier);
    }

    Ok(DictionaryLoad::Loaded(dictionary))
}

/// Reads the weather station table (`{ id: { name, lat, lon } }`).
pub fn load_station_table(
    path: &Path,
) -> Result<DictionaryLoad<IndexMap<String, StationInfo>>, DictionaryLoadError> {
    let Some(raw) = read_optional(path)? else {
        return Ok(DictionaryLoad::Missing);
    };

    let parsed = serde_json::from_str::<IndexMap<String, StationRecord>>(&raw).map_err(
        |source| DictionaryLoadError::Parse {
            path: path.display().to_string(),
            source,
        },
    )?;

    let stations = parsed
        .into_iter()
        .map(|(station_id, record)| {
            let coordinates = match (record.lat, record.lon) {
                (Some(latitude), Some(longitude)) => Some(Coordinates {
                    latitude,
                    longitude,
                }),
                _ => None,
            };
            (
                station_id,
                StationInfo {
                    name: record.name,
                    coordinates,
                },
            )
        })
        .collect();

    Ok(DictionaryLoad::Loaded(stations))
}

fn read_optional(path: &Path) -> Result<Option<String>, DictionaryLoadError> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(Some(raw)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(source) => Err(DictionaryLoadError::Read {
            path: path.display().to_string(),
            source,
        }),
    }
}

fn record<T: Default>(
    report: &mut DictionaryLoadReport,
    name: &'static str,
    result: Result<DictionaryLoad<T>, DictionaryLoadError>,
    count_entries: fn(&T) -> usize,
) -> T {
    let (value, outcome) = match result {
        Ok(DictionaryLoad::Loaded(value)) => {
            let entries = count_entries(&value);
            (value, DictionaryOutcome::Loaded { entries })
        }
        Ok(DictionaryLoad::Missing) => {
            info!(dictionary = name, "dictionary file not found, using empty mapping");
            (T::default(), DictionaryOutcome::Missing)
        }
        Err(err) => {
            error!(dictionary = name, "dictionary failed to load, using empty mapping: {err}");
            (
                T::default(),
                DictionaryOutcome::Failed {
                    reason: err.to_string(),
                },
            )
        }
    };

    report.dictionaries.push(DictionaryStatus { name, outcome });
    value
}

fn normalize_keys(source: Dictionary) -> Dictionary {
    source
        .into_iter()
        .map(|(key, value)| (normalize(&key), value))
        .collect()
}

/// Resolves the default data directory relative to the working directory.
pub fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}
