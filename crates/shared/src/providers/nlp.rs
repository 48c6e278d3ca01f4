use crate::candidates::{Entities, STOPWORDS};
use crate::intent::{HYDRO_KEYWORDS, Intent, WARNING_KEYWORDS, WEATHER_KEYWORDS};
use crate::normalize::normalize;

pub trait LanguageAnalyzer: Send + Sync {
    /// Coarse intent guess for already normalized text.
    fn guess_intent(&self, normalized_text: &str) -> Option<Intent>;

    /// Place-like and geographic names found in sanitized text.
    fn extract_entities(&self, text: &str) -> Entities;
}

const GUESS_TABLE: &[(Intent, &[&str])] = &[
    (
        Intent::Weather,
        &[
            "pogoda", "pogode", "pogody", "temperatura", "stopni", "cisnienie", "wiatr",
            "prognoza", "zimno", "cieplo", "meteo",
        ],
    ),
    (
        Intent::Warnings,
        &[
            "ostrzezenie", "ostrzezenia", "alert", "alerty", "zagrozenie", "burza", "burze",
            "grad", "wiatry", "rcb",
        ],
    ),
    (
        Intent::Hydro,
        &[
            "woda", "wody", "rzeka", "rzeki", "stan", "poziom", "hydrologiczne", "wyleje",
            "powodz", "wodowskaz", "cm",
        ],
    ),
];

const QUESTION_WORDS: &[&str] = &[
    "jaka", "jaki", "jakie", "jak", "gdzie", "czy", "co", "kiedy", "prosze", "podaj", "sprawdz",
    "pokaz", "dzien", "dobry", "czesc", "witam", "hej", "dzieki", "dziekuje",
];

const MIN_ENTITY_CHARS: usize = 3;

/// Deterministic analyzer: keyword table for the intent guess and
/// capitalization for proper nouns.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordAnalyzer;

impl KeywordAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl LanguageAnalyzer for KeywordAnalyzer {
    fn guess_intent(&self, normalized_text: &str) -> Option<Intent> {
        GUESS_TABLE
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| normalized_text.contains(keyword)))
            .map(|(intent, _)| *intent)
    }

    fn extract_entities(&self, text: &str) -> Entities {
        let mut entities = Entities::default();
        let mut current_name: Vec<&str> = Vec::new();
        let mut after_nad = false;
        let mut name_is_geographic = false;

        for token in text.split_whitespace() {
            if is_proper_noun(token) {
                if current_name.is_empty() {
                    name_is_geographic = after_nad;
                }
                current_name.push(token);
                after_nad = false;
                continue;
            }

            flush_name(&mut entities, &mut current_name, name_is_geographic);
            after_nad = normalize(token) == "nad";
        }
        flush_name(&mut entities, &mut current_name, name_is_geographic);

        entities
    }
}

fn flush_name(entities: &mut Entities, current_name: &mut Vec<&str>, geographic: bool) {
    if current_name.is_empty() {
        return;
    }

    let name = current_name.join(" ").to_lowercase();
    current_name.clear();

    let target = if geographic {
        &mut entities.geographic
    } else {
        &mut entities.place_like
    };
    if !target.contains(&name) {
        target.push(name);
    }
}

fn is_proper_noun(token: &str) -> bool {
    let starts_upper = token.chars().next().is_some_and(char::is_uppercase);
    if !starts_upper || token.chars().count() < MIN_ENTITY_CHARS {
        return false;
    }

    let normalized = normalize(token);
    !STOPWORDS.contains(&normalized.as_str())
        && !QUESTION_WORDS.contains(&normalized.as_str())
        && !is_keyword(&normalized)
}

fn is_keyword(normalized: &str) -> bool {
    let in_guess_table = GUESS_TABLE
        .iter()
        .any(|(_, keywords)| keywords.contains(&normalized));

    in_guess_table
        || WEATHER_KEYWORDS.contains(&normalized)
        || WARNING_KEYWORDS.contains(&normalized)
        || HYDRO_KEYWORDS.contains(&normalized)
}

#[cfg(test)]
mod tests {
    use super::{KeywordAnalyzer, LanguageAnalyzer};
    use crate::intent::Intent;
    use crate::normalize::normalize;

    #[test]
    fn guess_intent_checks_weather_then_warnings_then_hydro() {
        let analyzer = KeywordAnalyzer::new();

        assert_eq!(
            analyzer.guess_intent(&normalize("Jaka pogoda jutro?")),
            Some(Intent::Weather)
        );
        assert_eq!(
            analyzer.guess_intent(&normalize("Czy będzie burza")),
            Some(Intent::Warnings)
        );
        assert_eq!(
            analyzer.guess_intent(&normalize("Powódź na Odrze")),
            Some(Intent::Hydro)
        );
        assert_eq!(analyzer.guess_intent(&normalize("Dzień dobry")), None);
    }

    #[test]
    fn capitalized_tokens_become_place_like_entities() {
        let analyzer = KeywordAnalyzer::new();

        let entities = analyzer.extract_entities("Pogoda w Zielona Góra");

        assert_eq!(entities.place_like, vec!["zielona góra".to_string()]);
        assert!(entities.geographic.is_empty());
    }

    #[test]
    fn names_after_nad_are_geographic() {
        let analyzer = KeywordAnalyzer::new();

        let entities = analyzer.extract_entities("Stan wody w Krakowie nad Wisłą");

        assert_eq!(entities.place_like, vec!["krakowie".to_string()]);
        assert_eq!(entities.geographic, vec!["wisłą".to_string()]);
    }

    #[test]
    fn keywords_and_short_tokens_are_not_entities() {
        let analyzer = KeywordAnalyzer::new();

        let entities = analyzer.extract_entities("Ostrzeżenia Dla Ur");

        assert!(entities.place_like.is_empty());
        assert!(entities.geographic.is_empty());
    }
}
