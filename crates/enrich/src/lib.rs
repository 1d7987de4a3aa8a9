pub mod reader;

use std::cmp::Ordering;
use std::time::Duration;

use futures::future::join_all;
use tokio::time::timeout;
use tracing::warn;

use places::{OrganicResult, Place, SerperClient};

pub use reader::ReaderClient;

/// Character budget for reader-extracted page text. Maps and restaurant
/// pages are heavy; the review section sits deep in the page.
pub const READER_CHAR_LIMIT: usize = 25_000;

/// Per-candidate wall-clock bound covering both snippet search and reader
/// fallback.
pub const ENRICH_TIMEOUT: Duration = Duration::from_secs(8);

/// Yielded when a candidate is reachable but no review text turned up.
pub const NO_REVIEWS_SENTINEL: &str = "No detailed public reviews found.";

/// A place candidate decorated with public review text. Identity and factual
/// fields stay untouched.
#[derive(Debug, Clone)]
pub struct EnrichedPlace {
    pub place: Place,
    pub scraped_content: String,
}

pub struct Enricher {
    serper: SerperClient,
    reader: ReaderClient,
}

impl Enricher {
    pub fn new(serper: SerperClient, reader: ReaderClient) -> Self {
        Self { serper, reader }
    }

    /// Enrich the whole candidate set in parallel; order is preserved.
    pub async fn enrich_all(&self, places: Vec<Place>) -> Vec<EnrichedPlace> {
        join_all(places.into_iter().map(|place| self.enrich(place))).await
    }

    /// Attach review text to one candidate. Never fails and never drops the
    /// candidate: timeouts and fetch errors degrade to sentinel content, and
    /// a candidate with no website and no link comes back with empty content
    /// without any provider call.
    pub async fn enrich(&self, place: Place) -> EnrichedPlace {
        let has_website = place.website.as_deref().is_some_and(|w| !w.is_empty());
        if !has_website && place.link.is_empty() {
            return EnrichedPlace {
                place,
                scraped_content: String::new(),
            };
        }

        let scraped_content = match timeout(ENRICH_TIMEOUT, self.fetch_content(&place)).await {
            Ok(content) if !content.is_empty() => content,
            Ok(_) => NO_REVIEWS_SENTINEL.to_string(),
            Err(_) => {
                warn!(place = %place.title, "Enrichment timed out");
                NO_REVIEWS_SENTINEL.to_string()
            }
        };

        EnrichedPlace {
            place,
            scraped_content,
        }
    }

    async fn fetch_content(&self, place: &Place) -> String {
        // Review snippets first: honest summaries surfaced by a web search
        // for the place, which beats scraping pages that block crawlers.
        let review_query = format!(
            "reviews of {} {} food menu must try",
            place.title, place.address
        );

        match self.serper.organic(&review_query, 5).await {
            Ok(results) if !results.is_empty() => {
                let formatted = format_snippets(&results);
                if !formatted.is_empty() {
                    return formatted;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(place = %place.title, error = %e, "Snippet search failed");
            }
        }

        // Fall back to extracting the official website, if there is one.
        if let Some(website) = place.website.as_deref().filter(|w| !w.is_empty()) {
            match self.reader.fetch(website).await {
                Ok(text) => return text,
                Err(e) => {
                    warn!(place = %place.title, error = %e, "Reader fetch failed");
                }
            }
        }

        String::new()
    }
}

/// Collate organic snippets into the block handed to the judge.
pub fn format_snippets(results: &[OrganicResult]) -> String {
    let lines: Vec<String> = results
        .iter()
        .filter(|r| !r.snippet.trim().is_empty())
        .map(|r| format!("- \"{}\" (Source: {})", r.snippet.trim(), r.title))
        .collect();

    if lines.is_empty() {
        return String::new();
    }

    format!("Public Reviews & Highlights:\n{}", lines.join("\n"))
}

/// Top N candidates by descending rating; a missing rating sorts last. Ties
/// keep arrival order.
pub fn top_candidates(mut places: Vec<Place>, n: usize) -> Vec<Place> {
    places.sort_by(|a, b| {
        b.rating
            .unwrap_or(0.0)
            .partial_cmp(&a.rating.unwrap_or(0.0))
            .unwrap_or(Ordering::Equal)
    });
    places.truncate(n);
    places
}
