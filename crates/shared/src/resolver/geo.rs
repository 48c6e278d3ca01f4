use indexmap::IndexMap;

use crate::dictionaries::{Coordinates, StationInfo};

/// Mean Earth radius (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points in kilometres.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat_from = from.latitude.to_radians();
    let lat_to = to.latitude.to_radians();
    let delta_lat = (to.latitude - from.latitude).to_radians();
    let delta_lon = (to.longitude - from.longitude).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat_from.cos() * lat_to.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NearestStation<'d> {
    pub station_id: &'d str,
    pub station: &'d StationInfo,
    pub distance_km: f64,
}

/// Closest station with known coordinates. The first station wins on ties.
pub fn nearest_station(
    stations: &IndexMap<String, StationInfo>,
    point: Coordinates,
) -> Option<NearestStation<'_>> {
    let mut nearest: Option<NearestStation<'_>> = None;

    for (station_id, station) in stations {
        let Some(coordinates) = station.coordinates else {
            continue;
        };

        let distance_km = haversine_km(point, coordinates);
        if nearest.is_none_or(|current| distance_km < current.distance_km) {
            nearest = Some(NearestStation {
                station_id,
                station,
                distance_km,
            });
        }
    }

    nearest
}

pub fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
