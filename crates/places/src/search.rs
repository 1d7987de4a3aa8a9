use std::collections::HashSet;
use std::sync::LazyLock;

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use regex::Regex;
use tracing::{debug, warn};

use crate::client::SerperClient;
use crate::model::Place;

/// Missing places credentials abort the whole request, unlike per-sub-search
/// network failures which are swallowed. Downcast through `anyhow` to tell
/// the two apart at the HTTP boundary.
#[derive(Debug, thiserror::Error)]
#[error("places search credentials are not configured")]
pub struct MissingApiKey;

static SPLIT_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r",| and ").unwrap());
static FILLER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)hidden gems|authentic|famous|best|top|places").unwrap());

/// A source of place candidates. The production implementation fans out to
/// the search provider; tests substitute scripted sources.
#[async_trait]
pub trait PlaceSource: Send + Sync {
    async fn search(&self, query: &str, location: &str) -> Result<Vec<Place>>;
}

pub struct SerperPlaceSource {
    client: SerperClient,
}

impl SerperPlaceSource {
    pub fn new(client: SerperClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PlaceSource for SerperPlaceSource {
    async fn search(&self, query: &str, location: &str) -> Result<Vec<Place>> {
        if !self.client.has_key() {
            return Err(MissingApiKey.into());
        }

        let sub_queries = split_query(query);
        debug!(count = sub_queries.len(), queries = ?sub_queries, "Running parallel place searches");

        let searches = sub_queries
            .iter()
            .map(|q| run_sub_search(&self.client, q, location));
        let results = join_all(searches).await;

        Ok(dedup_places(results.into_iter().flatten().collect()))
    }
}

/// Break a compound refined query ("Awadhi cuisine, street food and cafes")
/// into independent sub-phrases, stripping generic filler. Sub-phrases that
/// end up shorter than 3 characters are dropped; if nothing survives, the
/// original query is searched as-is.
pub fn split_query(query: &str) -> Vec<String> {
    if !query.contains(',') && !query.contains(" and ") {
        return vec![query.to_string()];
    }

    let parts: Vec<String> = SPLIT_RE
        .split(query)
        .map(|part| FILLER_RE.replace_all(part, "").trim().to_string())
        .filter(|part| part.len() > 2)
        .collect();

    if parts.is_empty() {
        vec![query.to_string()]
    } else {
        parts
    }
}

// One failed sub-search contributes nothing instead of failing the batch.
async fn run_sub_search(client: &SerperClient, query: &str, location: &str) -> Vec<Place> {
    let search_string = if query.to_lowercase().contains(&location.to_lowercase()) {
        query.to_string()
    } else {
        format!("{query} near {location}")
    };

    match client.places(&search_string, location).await {
        Ok(raw_places) => raw_places.into_iter().map(Place::from_raw).collect(),
        Err(e) => {
            warn!(sub_query = query, error = %e, "Sub-search failed");
            Vec::new()
        }
    }
}

/// Keep the first occurrence of each identity key, in arrival order.
pub fn dedup_places(places: Vec<Place>) -> Vec<Place> {
    let mut seen = HashSet::new();
    places
        .into_iter()
        .filter(|place| seen.insert(place.unique_id().to_string()))
        .collect()
}
