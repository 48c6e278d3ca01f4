use crate::dictionaries::Dictionary;
use crate::normalize::normalize;

const MIN_SUBSTRING_CHARS: usize = 4;

pub const WEATHER_THRESHOLD: f64 = 0.90;
pub const HYDRO_THRESHOLD: f64 = 0.85;
pub const WARNINGS_THRESHOLD: f64 = 0.85;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchStrategy {
    Exact,
    Substring,
    Fuzzy,
    ContextIntersection,
    TokenPair,
    NearestStation,
}

impl MatchStrategy {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Substring => "substring",
            Self::Fuzzy => "fuzzy",
            Self::ContextIntersection => "context_intersection",
            Self::TokenPair => "token_pair",
            Self::NearestStation => "nearest_station",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyMatch<'d> {
    pub key: &'d str,
    pub value: &'d str,
    pub strategy: MatchStrategy,
}

/// Looks a single candidate up in `dictionary`.
///
/// Exact hits return immediately, then the first key (in dictionary order)
/// that contains or is contained in the candidate, then the closest key by
/// normalized Levenshtein similarity if it reaches `threshold`.
pub fn find_key<'d>(candidate: &str, dictionary: &'d Dictionary, threshold: f64) -> Option<KeyMatch<'d>> {
    let candidate = normalize(candidate);
    if candidate.is_empty() {
        return None;
    }

    if let Some(found) = exact_match(&candidate, dictionary) {
        return Some(found);
    }

    if candidate.chars().count() >= MIN_SUBSTRING_CHARS {
        let substring_hit = dictionary.iter().find(|(key, _)| {
            key.chars().count() >= MIN_SUBSTRING_CHARS
                && (key.contains(candidate.as_str()) || candidate.contains(key.as_str()))
        });
        if let Some((key, value)) = substring_hit {
            return Some(KeyMatch {
                key,
                value,
                strategy: MatchStrategy::Substring,
            });
        }
    }

    closest_key(&candidate, dictionary, threshold)
}

/// Exact lookup of an already normalized candidate.
pub fn exact_match<'d>(normalized_candidate: &str, dictionary: &'d Dictionary) -> Option<KeyMatch<'d>> {
    dictionary
        .get_key_value(normalized_candidate)
        .map(|(key, value)| KeyMatch {
            key,
            value,
            strategy: MatchStrategy::Exact,
        })
}

/// First key containing every fragment as a substring.
pub fn first_key_containing_all<'d>(
    dictionary: &'d Dictionary,
    fragments: &[&str],
    strategy: MatchStrategy,
) -> Option<KeyMatch<'d>> {
    dictionary
        .iter()
        .find(|(key, _)| fragments.iter().all(|fragment| key.contains(fragment)))
        .map(|(key, value)| KeyMatch {
            key,
            value,
            strategy,
        })
}

fn closest_key<'d>(candidate: &str, dictionary: &'d Dictionary, threshold: f64) -> Option<KeyMatch<'d>> {
    let mut best: Option<(f64, &'d String, &'d String)> = None;

    for (key, value) in dictionary {
        let score = strsim::normalized_levenshtein(candidate, key);
        // Strict comparison keeps the first key on ties.
        if best.is_none_or(|(best_score, _, _)| score > best_score) {
            best = Some((score, key, value));
        }
    }

    best.filter(|(score, _, _)| *score >= threshold)
        .map(|(_, key, value)| KeyMatch {
            key,
            value,
            strategy: MatchStrategy::Fuzzy,
        })
}

#[cfg(test)]
mod tests {
    use super::{MatchStrategy, find_key, first_key_containing_all};
    use crate::dictionaries::Dictionary;

    fn dictionary(entries: &[(&str, &str)]) -> Dictionary {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn exact_match_wins_over_substring_prefix() {
        let dictionary = dictionary(&[("kolo", "1"), ("kolobrzeg", "2")]);

        let found = find_key("Kołobrzeg", &dictionary, 0.9).expect("should match");

        assert_eq!(found.key, "kolobrzeg");
        assert_eq!(found.value, "2");
        assert_eq!(found.strategy, MatchStrategy::Exact);
    }

    #[test]
    fn substring_matches_partial_multi_word_names_in_dictionary_order() {
        let dictionary = dictionary(&[
            ("bielsko-biala", "1"),
            ("zielona gora", "2"),
            ("gora kalwaria", "3"),
        ]);

        let found = find_key("Zielona", &dictionary, 0.9).expect("should match");
        assert_eq!(found.key, "zielona gora");
        assert_eq!(found.strategy, MatchStrategy::Substring);

        let found = find_key("pogoda zielona gora dzisiaj", &dictionary, 0.9).expect("should match");
        assert_eq!(found.key, "zielona gora");
    }

    #[test]
    fn substring_requires_both_sides_longer_than_three_chars() {
        let dictionary = dictionary(&[("ruda", "1"), ("lad", "2")]);

        assert!(find_key("ruwa", &dictionary, 0.9).is_none());
        assert!(find_key("ladek", &dictionary, 0.9).is_none());
    }

    #[test]
    fn fuzzy_match_respects_threshold() {
        let dictionary = dictionary(&[("szczecinek", "1"), ("warszawa", "2")]);

        let found = find_key("Szczecinak", &dictionary, 0.85).expect("one typo passes 0.85");
        assert_eq!(found.key, "szczecinek");
        assert_eq!(found.strategy, MatchStrategy::Fuzzy);

        assert!(find_key("Warszewa", &dictionary, 0.9).is_none());
        assert!(find_key("xyz", &dictionary, 0.85).is_none());
    }

    #[test]
    fn blank_candidates_never_match() {
        let dictionary = dictionary(&[("opole", "1")]);
        assert!(find_key("   ", &dictionary, 0.0).is_none());
    }

    #[test]
    fn first_key_containing_all_scans_in_order() {
        let dictionary = dictionary(&[
            ("wisla", "A"),
            ("wisla krakow", "B"),
            ("wisla krakow bielany", "C"),
        ]);

        let found = first_key_containing_all(
            &dictionary,
            &["krakow", "wisl"],
            MatchStrategy::TokenPair,
        )
        .expect("should match");
        assert_eq!(found.value, "B");
    }
}
