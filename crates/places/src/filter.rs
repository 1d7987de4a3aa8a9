use crate::model::Place;

const SUBJECT_STOP_WORDS: &[&str] = &[
    "in",
    "near",
    "best",
    "top",
    "famous",
    "hot",
    "spicy",
    "places",
    "restaurants",
];

/// Outcome of the subject-term pass: either exact matches, or the full set
/// relabelled as alternatives with a user-facing caveat.
#[derive(Debug, Clone)]
pub struct FilterOutcome {
    pub kept: Vec<Place>,
    pub fallback_message: Option<String>,
}

/// Keep only candidates whose address mentions the city, taken as the first
/// comma-delimited segment of the location string.
pub fn filter_by_location(places: Vec<Place>, location: &str) -> Vec<Place> {
    let city = location
        .split(',')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();
    if city.is_empty() {
        return places;
    }

    places
        .into_iter()
        .filter(|place| place.address.to_lowercase().contains(&city))
        .collect()
}

/// The first meaningful token of the raw user query, after stop words. This
/// is what the user actually asked for ("pizza" in "best pizza places in
/// Delhi").
pub fn main_subject(raw_query: &str) -> Option<String> {
    raw_query
        .to_lowercase()
        .split_whitespace()
        .map(|token| token.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .find(|token| token.len() > 2 && !SUBJECT_STOP_WORDS.contains(&token.as_str()))
}

/// Partition candidates into literal subject matches versus everything else.
/// When no candidate mentions the subject at all ("asked for pizza, got
/// noodle shops"), the alternatives are shown but flagged, never silently
/// substituted.
pub fn filter_by_subject(places: Vec<Place>, raw_query: &str) -> FilterOutcome {
    let Some(subject) = main_subject(raw_query) else {
        return FilterOutcome {
            kept: places,
            fallback_message: None,
        };
    };

    let (exact, alternatives): (Vec<Place>, Vec<Place>) = places.into_iter().partition(|place| {
        serde_json::to_string(place)
            .map(|text| text.to_lowercase().contains(&subject))
            .unwrap_or(false)
    });

    if !exact.is_empty() {
        FilterOutcome {
            kept: exact,
            fallback_message: None,
        }
    } else {
        let fallback_message = (!alternatives.is_empty()).then(|| {
            format!(
                "We couldn't find exact matches for \"{subject}\" in this area. \
                 Here are some popular alternatives instead."
            )
        });
        FilterOutcome {
            kept: alternatives,
            fallback_message,
        }
    }
}
