use std::sync::Arc;

use tracing::warn;

use enrich::EnrichedPlace;
use llm::LlmRouter;

use crate::heuristic::heuristic_annotations;
use crate::prompt;
use crate::schema::{AnalysisResponse, Annotation, clean_dishes};

/// The AI judge. Model failover (primary then secondary) happens inside the
/// router; if both tiers fail or return an unusable shape, the deterministic
/// heuristic annotates the candidates so the user never sees an empty
/// verdict.
pub struct Analyzer {
    router: Arc<LlmRouter>,
}

impl Analyzer {
    pub fn new(router: Arc<LlmRouter>) -> Self {
        Self { router }
    }

    /// One structured judgment request covering every candidate.
    pub async fn analyze(&self, candidates: &[EnrichedPlace], user_mood: &str) -> Vec<Annotation> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let prompt = prompt::build_analysis_prompt(candidates, user_mood);

        let value = match self.router.generate_json("analyze", &prompt).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "All model providers failed, using heuristic annotations");
                return heuristic_annotations(candidates);
            }
        };

        let response: AnalysisResponse = match serde_json::from_value(value) {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Analysis response had an unexpected shape");
                return heuristic_annotations(candidates);
            }
        };

        if response.recommendations.is_empty() {
            warn!("Analysis response was empty, using heuristic annotations");
            return heuristic_annotations(candidates);
        }

        response
            .recommendations
            .into_iter()
            .map(|mut annotation| {
                annotation.famous_dishes = clean_dishes(&annotation.famous_dishes);
                annotation
            })
            .collect()
    }

    /// Broadened search phrase for the single zero-results retry. Always a
    /// plain string that embeds the location; provider failure degrades to a
    /// generic restaurants query.
    pub async fn fallback_query(&self, original_query: &str, location: &str) -> String {
        let prompt = prompt::build_fallback_query_prompt(original_query, location);

        match self.router.generate("fallback_query", &prompt).await {
            Ok(text) => {
                let query = text.trim().trim_matches('"').to_string();
                if query.is_empty() {
                    format!("Restaurants in {location}")
                } else if !query.to_lowercase().contains(&location.to_lowercase()) {
                    format!("{query} in {location}")
                } else {
                    query
                }
            }
            Err(e) => {
                warn!(error = %e, "Fallback query generation failed");
                format!("Restaurants in {location}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use async_trait::async_trait;
    use llm::ChatProvider;
    use places::Place;

    struct CannedProvider {
        reply: Result<&'static str, &'static str>,
    }

    impl CannedProvider {
        fn ok(reply: &'static str) -> Arc<Self> {
            Arc::new(Self { reply: Ok(reply) })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self { reply: Err("down") })
        }
    }

    #[async_trait]
    impl ChatProvider for CannedProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => anyhow::bail!(msg),
            }
        }
    }

    fn analyzer_with(provider: Arc<CannedProvider>) -> Analyzer {
        Analyzer::new(Arc::new(LlmRouter::new(provider, CannedProvider::failing())))
    }

    fn candidates() -> Vec<EnrichedPlace> {
        vec![EnrichedPlace {
            place: Place {
                title: "Pizza Palace".to_string(),
                categories: vec!["Pizza restaurant".to_string()],
                rating: Some(4.5),
                ..Default::default()
            },
            scraped_content: "Public Reviews & Highlights:\n- \"try the margherita\"".to_string(),
        }]
    }

    #[tokio::test]
    async fn model_annotations_are_cleaned() {
        let analyzer = analyzer_with(CannedProvider::ok(
            r#"{"recommendations": [{"name": "Pizza Palace",
                "match_reason": "Wood-fired crusts",
                "famous_dishes": ["Margherita", "food is awesome"]}]}"#,
        ));

        let annotations = analyzer.analyze(&candidates(), "pizza night").await;
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].famous_dishes, vec!["Margherita"]);
    }

    #[tokio::test]
    async fn total_provider_failure_uses_heuristic() {
        let analyzer = Analyzer::new(Arc::new(LlmRouter::new(
            CannedProvider::failing(),
            CannedProvider::failing(),
        )));

        let annotations = analyzer.analyze(&candidates(), "pizza night").await;
        assert_eq!(annotations.len(), 1);
        assert_eq!(annotations[0].name, "Pizza Palace");
        assert_eq!(annotations[0].famous_dishes, vec!["Pepperoni Pizza", "Garlic Bread"]);
    }

    #[tokio::test]
    async fn empty_model_output_uses_heuristic() {
        let analyzer = analyzer_with(CannedProvider::ok(r#"{"recommendations": []}"#));
        let annotations = analyzer.analyze(&candidates(), "pizza night").await;
        assert!(!annotations.is_empty());
    }

    #[tokio::test]
    async fn no_candidates_no_call() {
        let analyzer = analyzer_with(CannedProvider::failing());
        assert!(analyzer.analyze(&[], "anything").await.is_empty());
    }

    #[tokio::test]
    async fn fallback_query_always_contains_location() {
        let analyzer = analyzer_with(CannedProvider::ok("Ice Cream Shop"));
        let query = analyzer.fallback_query("Fruit Ice Cream", "Mau").await;
        assert!(query.to_lowercase().contains("mau"));

        let analyzer = Analyzer::new(Arc::new(LlmRouter::new(
            CannedProvider::failing(),
            CannedProvider::failing(),
        )));
        let query = analyzer.fallback_query("Fruit Ice Cream", "Mau").await;
        assert_eq!(query, "Restaurants in Mau");
    }
}
