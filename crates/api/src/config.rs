use std::env;

/// Runtime configuration, read once from the environment at startup.
///
/// Only the places-search credential is mandatory for serving requests; a
/// missing model credential just means that provider fails and the failover
/// chain takes over.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub serper_api_key: String,
    pub groq_api_key: String,
    pub gemini_api_key: String,
    pub bind_addr: String,
    /// How many top-rated candidates get enriched and judged.
    pub top_candidates: usize,
    /// Location assumed when the client sends none.
    pub default_location: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self {
            serper_api_key: env::var("SERPER_API_KEY").unwrap_or_default(),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            gemini_api_key: env::var("GEMINI_API_KEY").unwrap_or_default(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            ..Self::default()
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            serper_api_key: String::new(),
            groq_api_key: String::new(),
            gemini_api_key: String::new(),
            bind_addr: "0.0.0.0:3000".to_string(),
            top_candidates: 5,
            default_location: "India".to_string(),
        }
    }
}
