use crate::intent::Intent;
use crate::normalize::title_case;
use crate::resolver::ResolvedLocation;

pub const HELP_PROMPT: &str = "W czym pomóc? (Pogoda, Hydro, Ostrzeżenia)";
pub const LOCATION_NOT_FOUND: &str = "Nie znalazłem takiej lokalizacji.";
pub const RETRIES_EXHAUSTED: &str = "Nie rozumiem. Spróbuj: 'Pogoda w Warszawie'.";
pub const SYSTEM_ERROR: &str = "Wystąpił błąd systemu.";

pub fn ask_for_location(intent: Intent) -> &'static str {
    match intent {
        Intent::Weather => "Podaj miasto.",
        Intent::Hydro => "Jaka rzeka i miasto?",
        Intent::Warnings => "Podaj powiat.",
    }
}

/// Provider summary, with a note when a nearby station stands in for the
/// requested place.
pub fn success(location: Option<&ResolvedLocation>, summary: &str) -> String {
    match location {
        Some(ResolvedLocation::NearestNeighbor {
            query,
            station_name,
            distance_km,
        }) => format!(
            "Brak stacji w: {}. Najbliższa: {station_name} ({distance_km:.1} km).\n\n{summary}",
            title_case(query)
        ),
        _ => summary.to_string(),
    }
}
