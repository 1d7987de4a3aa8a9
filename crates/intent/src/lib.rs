pub mod prompt;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use llm::LlmRouter;

/// Shown when the classifier decides the query is not about food or drink
/// and the model did not phrase its own rejection.
pub const REJECTION_MESSAGE: &str =
    "I can only help with food and drinks. Try a dish, a cuisine, or a craving instead.";

/// Normalized search intent produced once per request by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinedIntent {
    pub is_food: bool,
    pub search_query: String,
    pub location_string: String,
    pub was_corrected: bool,
    pub corrected_term: Option<String>,
    pub rejection_message: Option<String>,
}

impl RefinedIntent {
    /// Built straight from the inputs when no model provider is reachable.
    /// The pipeline proceeds as if the query were already a search phrase.
    pub fn passthrough(raw_query: &str, location_hint: &str) -> Self {
        Self {
            is_food: true,
            search_query: raw_query.trim().to_string(),
            location_string: location_hint.trim().to_string(),
            was_corrected: false,
            corrected_term: None,
            rejection_message: None,
        }
    }
}

/// Lenient mirror of the model's output shape.
#[derive(Debug, Default, Deserialize)]
struct RawRefine {
    #[serde(default = "default_true")]
    is_food: bool,
    #[serde(default)]
    search_query: String,
    #[serde(default)]
    location_string: String,
    #[serde(default)]
    was_corrected: bool,
    #[serde(default)]
    corrected_term: Option<String>,
    #[serde(default)]
    rejection_message: Option<String>,
}

fn default_true() -> bool {
    true
}

pub struct Refiner {
    router: Arc<LlmRouter>,
}

impl Refiner {
    pub fn new(router: Arc<LlmRouter>) -> Self {
        Self { router }
    }

    /// Turn a free-text mood query plus a location hint into a normalized
    /// search intent. Provider failures never propagate; the caller always
    /// gets a usable intent built from the inputs.
    pub async fn refine(&self, raw_query: &str, location_hint: &str) -> RefinedIntent {
        let prompt = prompt::build_refine_prompt(raw_query, location_hint);

        let value = match self.router.generate_json("refine", &prompt).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Query refinement failed, passing inputs through");
                return RefinedIntent::passthrough(raw_query, location_hint);
            }
        };

        let raw: RawRefine = match serde_json::from_value(value) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Refine response had an unexpected shape");
                return RefinedIntent::passthrough(raw_query, location_hint);
            }
        };

        if !raw.is_food {
            return RefinedIntent {
                is_food: false,
                search_query: String::new(),
                location_string: location_hint.trim().to_string(),
                was_corrected: false,
                corrected_term: None,
                rejection_message: Some(
                    raw.rejection_message
                        .filter(|m| !m.trim().is_empty())
                        .unwrap_or_else(|| REJECTION_MESSAGE.to_string()),
                ),
            };
        }

        let search_query = clean_search_query(&raw.search_query);
        let location_string = raw.location_string.trim().to_string();

        RefinedIntent {
            is_food: true,
            search_query: if search_query.is_empty() {
                raw_query.trim().to_string()
            } else {
                search_query
            },
            location_string: if location_string.is_empty() {
                location_hint.trim().to_string()
            } else {
                location_string
            },
            was_corrected: raw.was_corrected,
            corrected_term: raw.corrected_term.filter(|t| !t.trim().is_empty()),
            rejection_message: None,
        }
    }
}

/// Remove model artifacts like stray pipes and quotes ("Pizza | Veg").
fn clean_search_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| *c != '|' && *c != '"')
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
