use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Polish inflectional endings stripped by [`normalize_with_stemming`], tried in order.
const INFLECTION_SUFFIXES: &[&str] = &[
    "ach", "ami", "iem", "owi", "om", "ie", "iu", "y", "a", "e", "u", "i",
];
const MIN_STEMMABLE_CHARS: usize = 5;

/// Canonical form used for dictionary keys and candidate comparison.
///
/// Lowercases, maps Polish letters to their ASCII base, drops any remaining
/// combining marks after NFD decomposition and collapses whitespace.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let substituted = lowered.chars().map(fold_polish_letter).collect::<String>();
    let stripped = substituted
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>();

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// [`normalize`] followed by removal of one inflectional suffix.
///
/// Only meant for fuzzy pre-matching; dictionary keys are never stemmed.
pub fn normalize_with_stemming(text: &str) -> String {
    let normalized = normalize(text);
    if normalized.chars().count() < MIN_STEMMABLE_CHARS {
        return normalized;
    }

    for suffix in INFLECTION_SUFFIXES {
        if let Some(stem) = normalized.strip_suffix(suffix) {
            return stem.to_string();
        }
    }

    normalized
}

/// Light cleanup applied before NLP and geocoding.
///
/// Letters (Polish ones included) and digits survive untouched, everything else
/// becomes a space. Case and diacritics are kept because the geocoder and the
/// entity extractor are sensitive to them.
pub fn sanitize(text: &str) -> String {
    let replaced = text
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>();

    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Uppercases the first letter of every whitespace-separated word.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_polish_letter(c: char) -> char {
    match c {
        'ą' => 'a',
        'ć' => 'c',
        'ę' => 'e',
        'ł' => 'l',
        'ń' => 'n',
        'ó' => 'o',
        'ś' => 's',
        'ź' | 'ż' => 'z',
        other => other,
    }
}
