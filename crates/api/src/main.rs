mod config;
mod metrics;
mod pipeline;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use enrich::{Enricher, ReaderClient};
use intent::Refiner;
use judge::{Analyzer, Recommendation};
use llm::{ChatProvider, GeminiClient, GroqClient, LlmRouter};
use places::{MissingApiKey, SerperClient, SerperPlaceSource};

use config::AppConfig;
use metrics::{Metrics, MetricsSnapshot};
use pipeline::{Pipeline, PipelineOutcome, ResponseContext};

struct AppState {
    pipeline: Pipeline,
    metrics: Arc<Metrics>,
    config: AppConfig,
}

#[derive(Deserialize)]
struct RecommendRequest {
    query: String,
    #[serde(default, rename = "userLocation")]
    user_location: String,
}

#[derive(Serialize)]
struct RecommendResponse {
    status: &'static str,
    data: Vec<Recommendation>,
    context: Option<ResponseContext>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    places_search_configured: bool,
    primary_model_configured: bool,
    secondary_model_configured: bool,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    if config.serper_api_key.is_empty() {
        error!("SERPER_API_KEY is not set; every search request will fail");
    }

    let primary: Arc<dyn ChatProvider> =
        Arc::new(GroqClient::with_default_model(config.groq_api_key.clone()));
    let secondary: Arc<dyn ChatProvider> =
        Arc::new(GeminiClient::with_default_model(config.gemini_api_key.clone()));
    let router = Arc::new(LlmRouter::new(primary, secondary));

    let serper = SerperClient::new(config.serper_api_key.clone());
    let metrics = Metrics::new();

    let pipeline = Pipeline::new(
        Refiner::new(router.clone()),
        Arc::new(SerperPlaceSource::new(serper.clone())),
        Enricher::new(serper, ReaderClient::new()),
        Analyzer::new(router),
        metrics.clone(),
        config.top_candidates,
    );

    let state = Arc::new(AppState {
        pipeline,
        metrics,
        config: config.clone(),
    });

    let app = Router::new()
        .route("/recommend", post(recommend))
        .route("/health", get(health_check))
        .route("/metrics", get(get_metrics))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .expect("Failed to bind listener");

    info!(addr = %config.bind_addr, "Server listening");

    axum::serve(listener, app).await.expect("Server failed");
}

async fn recommend(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendRequest>,
) -> (StatusCode, Json<RecommendResponse>) {
    let started = Instant::now();
    let location = if req.user_location.trim().is_empty() {
        state.config.default_location.clone()
    } else {
        req.user_location.clone()
    };

    match state.pipeline.run(&req.query, &location).await {
        Ok(PipelineOutcome::Rejected { message }) => {
            state.metrics.record_request(true);
            (
                StatusCode::OK,
                Json(RecommendResponse {
                    status: "error",
                    data: Vec::new(),
                    context: None,
                    message: Some(message),
                }),
            )
        }
        Ok(PipelineOutcome::Completed { data, context }) => {
            state.metrics.record_request(true);
            info!(
                results = data.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Request completed"
            );
            (
                StatusCode::OK,
                Json(RecommendResponse {
                    status: "success",
                    data,
                    context: Some(context),
                    message: None,
                }),
            )
        }
        Err(e) => {
            state.metrics.record_request(false);
            if e.downcast_ref::<MissingApiKey>().is_some() {
                error!("Request aborted: places search credentials missing");
            } else {
                error!(error = %e, "Request failed");
            }
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RecommendResponse {
                    status: "error",
                    data: Vec::new(),
                    context: None,
                    message: Some("Internal Server Error".to_string()),
                }),
            )
        }
    }
}

async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        places_search_configured: !state.config.serper_api_key.is_empty(),
        primary_model_configured: !state.config.groq_api_key.is_empty(),
        secondary_model_configured: !state.config.gemini_api_key.is_empty(),
    })
}

async fn get_metrics(State(state): State<Arc<AppState>>) -> Json<MetricsSnapshot> {
    Json(state.metrics.snapshot())
}
