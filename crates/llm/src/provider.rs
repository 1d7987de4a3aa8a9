use anyhow::Result;
use async_trait::async_trait;

/// A generative-model backend that answers one prompt with one text
/// completion. Implemented by the real provider clients and by test stubs.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Whether a credential is configured. Unconfigured providers fail fast
    /// without a network round trip.
    fn is_configured(&self) -> bool;

    async fn generate(&self, prompt: &str) -> Result<String>;
}
