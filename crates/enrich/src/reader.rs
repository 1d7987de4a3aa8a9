use anyhow::{Context, Result};
use tracing::warn;
use url::Url;

use crate::READER_CHAR_LIMIT;

/// Content-extraction client: fetches a page through the r.jina.ai reader
/// proxy, which returns markdown instead of raw HTML.
#[derive(Clone)]
pub struct ReaderClient {
    client: reqwest::Client,
}

impl ReaderClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }

    /// Fetch readable page text, truncated to the reader budget. Invalid
    /// URLs and non-2xx responses yield empty text rather than an error.
    pub async fn fetch(&self, raw_url: &str) -> Result<String> {
        let Some(normalized) = normalize_url(raw_url) else {
            return Ok(String::new());
        };

        let reader_url = format!("https://r.jina.ai/{normalized}");

        let response = self
            .client
            .get(&reader_url)
            .header("X-Respond-With", "markdown")
            .header("User-Agent", "foodscout-agent/1.0")
            .send()
            .await
            .context("Failed to reach reader")?;

        if !response.status().is_success() {
            warn!(url = raw_url, status = %response.status(), "Reader fetch failed");
            return Ok(String::new());
        }

        let text = response.text().await.context("Failed to read reader body")?;
        Ok(text.chars().take(READER_CHAR_LIMIT).collect())
    }
}

impl Default for ReaderClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Ensure a scheme is present and the URL parses; None means skip scraping.
pub fn normalize_url(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }

    let lower = raw.to_lowercase();
    let with_scheme = if lower.starts_with("http://") || lower.starts_with("https://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    Url::parse(&with_scheme).ok().map(|url| url.to_string())
}
