use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::model::RawPlace;

const PLACES_URL: &str = "https://google.serper.dev/places";
const SEARCH_URL: &str = "https://google.serper.dev/search";

/// Thin client for the Serper places/web search endpoints.
#[derive(Clone)]
pub struct SerperClient {
    api_key: String,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct PlacesResponse {
    #[serde(default)]
    places: Vec<RawPlace>,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    organic: Vec<OrganicResult>,
}

/// One web search hit; the snippet carries the review text we care about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrganicResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub link: String,
}

impl SerperClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            client: reqwest::Client::new(),
        }
    }

    pub fn has_key(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// Keyword search against the places index.
    pub async fn places(&self, query: &str, location: &str) -> Result<Vec<RawPlace>> {
        let body = json!({
            "q": query,
            "location": location,
            "gl": "in",
            "hl": "en",
        });

        let response = self
            .client
            .post(PLACES_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send places search request")?;

        if !response.status().is_success() {
            anyhow::bail!("Places search failed: {}", response.status());
        }

        let places_response: PlacesResponse = response
            .json()
            .await
            .context("Failed to parse places search response")?;

        Ok(places_response.places)
    }

    /// Plain web search, used to pull public review snippets.
    pub async fn organic(&self, query: &str, num: usize) -> Result<Vec<OrganicResult>> {
        let body = json!({
            "q": query,
            "gl": "in",
            "num": num,
        });

        let response = self
            .client
            .post(SEARCH_URL)
            .header("X-API-KEY", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to send snippet search request")?;

        if !response.status().is_success() {
            anyhow::bail!("Snippet search failed: {}", response.status());
        }

        let search_response: SearchResponse = response
            .json()
            .await
            .context("Failed to parse snippet search response")?;

        Ok(search_response.organic)
    }
}
