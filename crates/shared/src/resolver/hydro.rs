use super::matching::{
    HYDRO_THRESHOLD, MatchStrategy, exact_match, find_key, first_key_containing_all,
};
use super::{LocationMatch, ResolutionInput, plain_match};
use crate::candidates::content_tokens;
use crate::dictionaries::ReferenceDictionaries;
use crate::normalize::{normalize, normalize_with_stemming};

const MIN_STEM_CHARS: usize = 4;

/// Hydro lookup. Keys combine river and station names, so intersections are
/// tried before single-candidate matching; a lone river name would otherwise
/// win over the river-at-city key the user actually described.
pub(super) fn resolve(
    dictionaries: &ReferenceDictionaries,
    input: &ResolutionInput<'_>,
) -> Option<LocationMatch> {
    let hydro = dictionaries.hydro_stations();
    if hydro.is_empty() {
        return None;
    }

    if let Some(found) = with_city_context(dictionaries, input) {
        return Some(found);
    }

    let exact = exact_candidate(dictionaries, input);
    let covered = exact
        .as_ref()
        .map(|(_, tokens)| tokens.as_slice())
        .unwrap_or_default();
    if let Some(found) = token_pairs(dictionaries, input.normalized_text, covered) {
        return Some(found);
    }
    if let Some((found, _)) = exact {
        return Some(found);
    }

    if let Some(found) = input
        .candidates
        .iter()
        .find_map(|candidate| find_key(candidate, hydro, HYDRO_THRESHOLD))
    {
        return Some(plain_match(found));
    }

    context_only(dictionaries, input)
}

fn with_city_context(
    dictionaries: &ReferenceDictionaries,
    input: &ResolutionInput<'_>,
) -> Option<LocationMatch> {
    let context = normalize(input.city_context?);
    if context.is_empty() {
        return None;
    }
    let hydro = dictionaries.hydro_stations();

    for candidate in input.candidates {
        let candidate = normalize(candidate);
        if candidate.is_empty() {
            continue;
        }
        if let Some(found) = first_key_containing_all(
            hydro,
            &[candidate.as_str(), context.as_str()],
            MatchStrategy::ContextIntersection,
        ) {
            return Some(plain_match(found));
        }
    }

    None
}

/// First candidate that is itself a hydro key, with the tokens it spans.
fn exact_candidate(
    dictionaries: &ReferenceDictionaries,
    input: &ResolutionInput<'_>,
) -> Option<(LocationMatch, Vec<String>)> {
    input.candidates.iter().find_map(|candidate| {
        let candidate = normalize(candidate);
        let found = exact_match(&candidate, dictionaries.hydro_stations())?;
        let tokens = candidate.split_whitespace().map(ToString::to_string).collect();
        Some((plain_match(found), tokens))
    })
}

/// "stan wody" with no named place: the city from an earlier turn is all we have.
fn context_only(
    dictionaries: &ReferenceDictionaries,
    input: &ResolutionInput<'_>,
) -> Option<LocationMatch> {
    if !input.entities.place_like.is_empty() || !input.entities.geographic.is_empty() {
        return None;
    }
    let context = normalize(input.city_context?);
    if context.is_empty() {
        return None;
    }

    first_key_containing_all(
        dictionaries.hydro_stations(),
        &[context.as_str()],
        MatchStrategy::ContextIntersection,
    )
    .map(plain_match)
}

/// Ordered pairs of content tokens. Pairs made only of `covered` tokens add
/// nothing over the exact candidate that spans them and are skipped.
fn token_pairs(
    dictionaries: &ReferenceDictionaries,
    normalized_text: &str,
    covered: &[String],
) -> Option<LocationMatch> {
    let tokens = content_tokens(normalized_text);
    if tokens.len() < 2 {
        return None;
    }
    let fragments = tokens.iter().cloned().map(pair_fragment).collect::<Vec<_>>();

    for (first_index, first) in fragments.iter().enumerate() {
        for (second_index, second) in fragments.iter().enumerate() {
            if first_index == second_index {
                continue;
            }
            if covered.contains(&tokens[first_index]) && covered.contains(&tokens[second_index]) {
                continue;
            }
            if let Some(found) = first_key_containing_all(
                dictionaries.hydro_stations(),
                &[first.as_str(), second.as_str()],
                MatchStrategy::TokenPair,
            ) {
                return Some(plain_match(found));
            }
        }
    }

    None
}

/// Inflected tokens ("krakowie", "wisla") are cut back to a stem so they
/// still occur inside base-form keys.
fn pair_fragment(token: String) -> String {
    let stem = normalize_with_stemming(&token);
    if stem.chars().count() >= MIN_STEM_CHARS {
        stem
    } else {
        token
    }
}
