pub mod gemini;
pub mod groq;
pub mod provider;
pub mod router;

pub use gemini::GeminiClient;
pub use groq::GroqClient;
pub use provider::ChatProvider;
pub use router::LlmRouter;

/// Strip markdown code fences that chat models wrap around JSON output.
pub fn clean_model_json(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}
