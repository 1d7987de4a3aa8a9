use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use serde::Serialize;
use tracing::info;

use enrich::Enricher;
use intent::Refiner;
use judge::{Analyzer, Recommendation, reconcile};
use places::{PlaceSource, filter_by_location, filter_by_subject};

use crate::metrics::Metrics;

/// Request context echoed back alongside the recommendations.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseContext {
    pub original_query: String,
    pub location_used: String,
    pub is_fallback: bool,
    pub message: Option<String>,
    pub was_corrected: bool,
    pub corrected_term: Option<String>,
}

#[derive(Debug)]
pub enum PipelineOutcome {
    /// The classifier decided this is not a food query; nothing else ran.
    Rejected { message: String },
    /// The pipeline ran to the end (possibly with zero results).
    Completed {
        data: Vec<Recommendation>,
        context: ResponseContext,
    },
}

/// The full query-orchestration pipeline: refine -> search -> filter ->
/// enrich -> judge -> reconcile. One instance per process; the only state
/// shared across requests lives in the model router's failover flag.
pub struct Pipeline {
    refiner: Refiner,
    place_source: Arc<dyn PlaceSource>,
    enricher: Enricher,
    analyzer: Analyzer,
    metrics: Arc<Metrics>,
    top_candidates: usize,
}

impl Pipeline {
    pub fn new(
        refiner: Refiner,
        place_source: Arc<dyn PlaceSource>,
        enricher: Enricher,
        analyzer: Analyzer,
        metrics: Arc<Metrics>,
        top_candidates: usize,
    ) -> Self {
        Self {
            refiner,
            place_source,
            enricher,
            analyzer,
            metrics,
            top_candidates,
        }
    }

    /// Run one request end to end. Only the fatal configuration error from
    /// the place search propagates; everything else degrades inside its
    /// stage.
    pub async fn run(&self, query: &str, user_location: &str) -> Result<PipelineOutcome> {
        // Stage 1: intent refinement.
        let started = Instant::now();
        let refined = self.refiner.refine(query, user_location).await;
        self.metrics.record_refine(started.elapsed());

        if !refined.is_food {
            self.metrics.record_rejection();
            return Ok(PipelineOutcome::Rejected {
                message: refined
                    .rejection_message
                    .unwrap_or_else(|| intent::REJECTION_MESSAGE.to_string()),
            });
        }

        let location = refined.location_string.clone();
        info!(query = %refined.search_query, location = %location, "Refined search intent");

        // Stage 2: place search plus strict location containment.
        let started = Instant::now();
        let mut candidates = self
            .place_source
            .search(&refined.search_query, &location)
            .await?;
        candidates = filter_by_location(candidates, &location);

        // Zero results get exactly one broadened retry.
        let mut is_fallback = false;
        if candidates.is_empty() {
            info!("No results, trying one broadened fallback query");
            let fallback_query = self.analyzer.fallback_query(query, &location).await;
            candidates = self.place_source.search(&fallback_query, &location).await?;
            is_fallback = true;
            self.metrics.record_fallback_search();
        }
        self.metrics.record_search(started.elapsed());

        if candidates.is_empty() {
            self.metrics.record_empty_result();
            return Ok(PipelineOutcome::Completed {
                data: Vec::new(),
                context: ResponseContext {
                    original_query: query.to_string(),
                    location_used: location,
                    is_fallback,
                    message: Some("No places found.".to_string()),
                    was_corrected: refined.was_corrected,
                    corrected_term: refined.corrected_term,
                },
            });
        }

        // Stage 3: literal subject matching against the raw query.
        let outcome = filter_by_subject(candidates, query);

        // Stage 4: enrich the top candidates in parallel.
        let started = Instant::now();
        let top = enrich::top_candidates(outcome.kept, self.top_candidates);
        let enriched = self.enricher.enrich_all(top).await;
        self.metrics.record_enrich(started.elapsed());

        // Stage 5: model judgment with failover and heuristic last resort.
        let started = Instant::now();
        let annotations = self.analyzer.analyze(&enriched, query).await;
        self.metrics.record_analyze(started.elapsed());

        // Stage 6: merge verdicts back onto the authoritative records.
        let data = reconcile(&enriched, &annotations);

        Ok(PipelineOutcome::Completed {
            data,
            context: ResponseContext {
                original_query: query.to_string(),
                location_used: location,
                is_fallback,
                message: outcome.fallback_message,
                was_corrected: refined.was_corrected,
                corrected_term: refined.corrected_term,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use llm::{ChatProvider, LlmRouter};
    use places::{Place, SerperClient};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Answers refine/analyze/fallback prompts with canned payloads, keyed
    /// off markers in the prompt text.
    struct ScriptedModel {
        refine_reply: &'static str,
    }

    #[async_trait]
    impl ChatProvider for ScriptedModel {
        fn name(&self) -> &'static str {
            "scripted"
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
            if prompt.contains("Google Maps search expert") {
                return Ok(self.refine_reply.to_string());
            }
            if prompt.contains("Friendly foodie guide") {
                return Ok(r#"{"recommendations": [
                    {"name": "Pizza Palace", "match_reason": "Wood-fired crusts",
                     "famous_dishes": ["Margherita"], "tip": "Go early"}
                ]}"#
                    .to_string());
            }
            // Fallback query prompt.
            Ok("Restaurants".to_string())
        }
    }

    struct ScriptedPlaces {
        batches: tokio::sync::Mutex<Vec<Vec<Place>>>,
        calls: AtomicUsize,
    }

    impl ScriptedPlaces {
        fn new(batches: Vec<Vec<Place>>) -> Arc<Self> {
            Arc::new(Self {
                batches: tokio::sync::Mutex::new(batches),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl PlaceSource for ScriptedPlaces {
        async fn search(&self, _query: &str, _location: &str) -> anyhow::Result<Vec<Place>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            let mut batches = self.batches.lock().await;
            if batches.is_empty() {
                Ok(Vec::new())
            } else {
                Ok(batches.remove(0))
            }
        }
    }

    fn pipeline_with(
        refine_reply: &'static str,
        source: Arc<ScriptedPlaces>,
    ) -> Pipeline {
        let router = Arc::new(LlmRouter::new(
            Arc::new(ScriptedModel { refine_reply }),
            Arc::new(ScriptedModel { refine_reply }),
        ));
        Pipeline::new(
            Refiner::new(router.clone()),
            source,
            Enricher::new(SerperClient::new(String::new()), enrich::ReaderClient::new()),
            Analyzer::new(router),
            Metrics::new(),
            5,
        )
    }

    // Candidates without links enrich to empty content without touching the
    // network, which keeps these tests offline.
    fn offline_place(title: &str, address: &str) -> Place {
        Place {
            title: title.to_string(),
            address: address.to_string(),
            rating: Some(4.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn non_food_query_short_circuits_before_search() {
        let source = ScriptedPlaces::new(vec![vec![offline_place("Pizza Palace", "Delhi")]]);
        let pipeline = pipeline_with(r#"{"is_food": false}"#, source.clone());

        let outcome = pipeline.run("sweater", "Delhi").await.unwrap();
        match outcome {
            PipelineOutcome::Rejected { message } => {
                assert_eq!(message, intent::REJECTION_MESSAGE);
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn zero_results_trigger_exactly_one_fallback_search() {
        let source = ScriptedPlaces::new(vec![]);
        let pipeline = pipeline_with(
            r#"{"is_food": true, "search_query": "Pizza", "location_string": "Delhi"}"#,
            source.clone(),
        );

        let outcome = pipeline.run("pizza", "Delhi").await.unwrap();
        match outcome {
            PipelineOutcome::Completed { data, context } => {
                assert!(data.is_empty());
                assert!(context.is_fallback);
                assert_eq!(context.message.as_deref(), Some("No places found."));
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn fallback_results_are_served_when_first_search_is_empty() {
        let source = ScriptedPlaces::new(vec![
            Vec::new(),
            vec![offline_place("Pizza Palace", "Connaught Place, Delhi")],
        ]);
        let pipeline = pipeline_with(
            r#"{"is_food": true, "search_query": "Pizza", "location_string": "Delhi"}"#,
            source.clone(),
        );

        let outcome = pipeline.run("pizza", "Delhi").await.unwrap();
        match outcome {
            PipelineOutcome::Completed { data, context } => {
                assert_eq!(data.len(), 1);
                assert!(context.is_fallback);
            }
            other => panic!("expected completion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn happy_path_merges_judgment_onto_place_facts() {
        let source = ScriptedPlaces::new(vec![vec![
            offline_place("Pizza Palace", "Connaught Place, Delhi"),
            offline_place("Noodle House", "Karol Bagh, Delhi"),
        ]]);
        let pipeline = pipeline_with(
            r#"{"is_food": true, "search_query": "Pizza", "location_string": "Delhi",
                "was_corrected": true, "corrected_term": "Pizza"}"#,
            source.clone(),
        );

        let outcome = pipeline.run("Piza in Delhi", "Delhi").await.unwrap();
        match outcome {
            PipelineOutcome::Completed { data, context } => {
                assert_eq!(data.len(), 1);
                assert_eq!(data[0].name, "Pizza Palace");
                assert_eq!(data[0].address, "Connaught Place, Delhi");
                assert_eq!(data[0].match_reason, "Wood-fired crusts");
                assert_eq!(data[0].famous_dishes, vec!["Margherita"]);
                assert!(context.was_corrected);
                assert_eq!(context.corrected_term.as_deref(), Some("Pizza"));
                assert!(!context.is_fallback);
                // "piza" is the literal subject of the raw query, so the
                // exact-match partition is empty and the caveat is set.
                assert!(context.message.as_deref().unwrap().contains("piza"));
            }
            other => panic!("expected completion, got {other:?}"),
        }
        assert_eq!(source.calls(), 1);
    }
}
