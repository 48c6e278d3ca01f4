use crate::normalize::normalize;

/// Words ignored when tokenizing input for place names.
pub const STOPWORDS: &[&str] = &[
    "dla", "w", "na", "miasto", "powiat", "gmina", "z", "do", "przy", "kolo", "jest", "jaka",
    "jaki", "czy", "prosze", "podaj", "sprawdz", "teraz", "stan", "wody", "woda", "poziom",
    "rzeka", "rzeki", "potok", "jezioro",
];

const MIN_TOKEN_CHARS: usize = 4;

/// Place-like and geographic names reported by the NLP collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entities {
    pub place_like: Vec<String>,
    pub geographic: Vec<String>,
}

/// Ordered candidates for dictionary lookup: raw text, place-like entities,
/// geographic entities, then content tokens. Duplicates are kept.
pub fn extract_candidates(raw_text: &str, entities: &Entities, stopwords: &[&str]) -> Vec<String> {
    let normalized = normalize(raw_text);
    let mut candidates = Vec::with_capacity(1 + entities.place_like.len() + entities.geographic.len());

    candidates.push(raw_text.to_string());
    candidates.extend(entities.place_like.iter().cloned());
    candidates.extend(entities.geographic.iter().cloned());
    candidates.extend(content_tokens_with(&normalized, stopwords));

    candidates
}

/// Tokens of already normalized text that may name a place.
pub fn content_tokens(normalized_text: &str) -> Vec<String> {
    content_tokens_with(normalized_text, STOPWORDS)
}

fn content_tokens_with(normalized_text: &str, stopwords: &[&str]) -> Vec<String> {
    normalized_text
        .split_whitespace()
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS && !stopwords.contains(token))
        .map(ToString::to_string)
        .collect()
}
