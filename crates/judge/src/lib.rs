pub mod analyzer;
pub mod heuristic;
pub mod prompt;
pub mod reconcile;
pub mod schema;

pub use analyzer::Analyzer;
pub use heuristic::heuristic_annotations;
pub use reconcile::{Recommendation, match_candidate, reconcile};
pub use schema::{AnalysisResponse, Annotation, clean_dishes};
