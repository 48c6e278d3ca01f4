use std::collections::HashSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Weather,
    Hydro,
    Warnings,
}

impl Intent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weather => "weather",
            Self::Hydro => "hydro",
            Self::Warnings => "warnings",
        }
    }
}

// Keyword tables are stored normalized; they are matched against normalized text.
pub const WARNING_KEYWORDS: &[&str] = &[
    "ostrzezenie",
    "ostrzezenia",
    "alert",
    "alerty",
    "zagrozenie",
    "rcb",
];

pub const WEATHER_KEYWORDS: &[&str] = &[
    "pogoda",
    "pogode",
    "temperatura",
    "wiatr",
    "cisnienie",
    "slonce",
    "deszcz",
    "prognoza",
    "stopni",
    "pada",
    "zimno",
    "cieplo",
];

pub const HYDRO_KEYWORDS: &[&str] = &[
    "stan",
    "wody",
    "poziom",
    "rzeka",
    "wodowskaz",
    "hydrologiczny",
    "wylewa",
];

/// Picks the working intent from keyword rules, falling back to the NLP guess.
///
/// Warnings beat weather, weather beats hydro, and a bare river name counts
/// as a hydro question.
pub fn route_intent(
    normalized_text: &str,
    nlp_guess: Option<Intent>,
    known_rivers: &HashSet<String>,
) -> Option<Intent> {
    if contains_any(normalized_text, WARNING_KEYWORDS) {
        return Some(Intent::Warnings);
    }
    if contains_any(normalized_text, WEATHER_KEYWORDS) {
        return Some(Intent::Weather);
    }
    if contains_any(normalized_text, HYDRO_KEYWORDS) {
        return Some(Intent::Hydro);
    }
    if normalized_text
        .split_whitespace()
        .any(|token| known_rivers.contains(token))
    {
        return Some(Intent::Hydro);
    }

    nlp_guess
}

/// True when the text is nothing but a weather keyword.
pub fn is_weather_keyword(normalized_text: &str) -> bool {
    WEATHER_KEYWORDS.contains(&normalized_text)
}

fn contains_any(text: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| text.contains(keyword))
}
