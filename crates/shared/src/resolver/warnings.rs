use super::matching::{WARNINGS_THRESHOLD, find_key};
use super::{LocationMatch, ResolutionInput, plain_match};
use crate::dictionaries::ReferenceDictionaries;

pub(super) fn resolve(
    dictionaries: &ReferenceDictionaries,
    input: &ResolutionInput<'_>,
) -> Option<LocationMatch> {
    let districts = dictionaries.districts();

    input
        .candidates
        .iter()
        .map(String::as_str)
        .chain(input.city_context)
        .find_map(|candidate| find_key(candidate, districts, WARNINGS_THRESHOLD))
        .map(plain_match)
}
