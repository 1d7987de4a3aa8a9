use serde::Serialize;

use enrich::EnrichedPlace;
use places::Place;

use crate::schema::{Annotation, clean_dishes};

/// Final outward-facing record: provider facts plus model judgment. The
/// scraped review text stays internal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub rating_count: Option<u64>,
    pub link: String,
    pub website: Option<String>,
    pub phone: Option<String>,
    pub categories: Vec<String>,
    pub is_relevant: bool,
    pub match_reason: String,
    pub famous_dishes: Vec<String>,
    pub tip: Option<String>,
    pub note: Option<String>,
}

/// Locate the candidate an annotation refers to: exact case-insensitive
/// title match, then title-contains-name, then nothing. The caller decides
/// what to do when nothing matches (the pipeline defaults to the first
/// candidate, which can mis-attribute when names are similar; swap this
/// function out to change the strategy).
pub fn match_candidate<'a>(
    candidates: &'a [EnrichedPlace],
    name: &str,
) -> Option<&'a EnrichedPlace> {
    let needle = name.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }

    candidates
        .iter()
        .find(|c| c.place.title.to_lowercase() == needle)
        .or_else(|| {
            candidates
                .iter()
                .find(|c| c.place.title.to_lowercase().contains(&needle))
        })
}

/// Merge annotations back onto the authoritative place records. Factual
/// fields always come from the search provider and are backfilled from the
/// model only where the provider left a gap; subjective fields always come
/// from the model. Pure and idempotent.
pub fn reconcile(candidates: &[EnrichedPlace], annotations: &[Annotation]) -> Vec<Recommendation> {
    if candidates.is_empty() {
        return Vec::new();
    }

    if annotations.is_empty() {
        return candidates
            .iter()
            .map(|c| merge(&c.place, &Annotation::default()))
            .collect();
    }

    annotations
        .iter()
        .filter_map(|annotation| {
            match_candidate(candidates, &annotation.name)
                .or_else(|| candidates.first())
                .map(|candidate| merge(&candidate.place, annotation))
        })
        .collect()
}

fn merge(place: &Place, annotation: &Annotation) -> Recommendation {
    Recommendation {
        name: if place.title.is_empty() {
            annotation.name.clone()
        } else {
            place.title.clone()
        },
        address: non_empty_or(&place.address, annotation.address.as_deref()),
        rating: place.rating.or(annotation.rating),
        rating_count: place.rating_count,
        link: non_empty_or(&place.link, annotation.link.as_deref()),
        website: place
            .website
            .clone()
            .or_else(|| annotation.website.clone()),
        phone: place.phone.clone().or_else(|| annotation.phone.clone()),
        categories: if place.categories.is_empty() {
            annotation.categories.clone()
        } else {
            place.categories.clone()
        },
        is_relevant: annotation.is_relevant,
        match_reason: annotation.match_reason.clone().unwrap_or_default(),
        famous_dishes: clean_dishes(&annotation.famous_dishes),
        tip: annotation.tip.clone().filter(|t| !t.trim().is_empty()),
        note: annotation.note.clone().filter(|n| !n.trim().is_empty()),
    }
}

fn non_empty_or(primary: &str, fallback: Option<&str>) -> String {
    if primary.is_empty() {
        fallback.unwrap_or_default().to_string()
    } else {
        primary.to_string()
    }
}
