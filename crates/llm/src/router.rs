use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::clean_model_json;
use crate::provider::ChatProvider;

/// Routes one logical model task through a primary and a secondary provider.
///
/// Once the primary fails, `prefer_secondary` flips and stays set for the
/// lifetime of this router, so later calls go straight to the secondary
/// instead of paying the primary's failure latency again. The flag is scoped
/// to the router instance rather than a process global, and `reset` puts the
/// primary back in front.
pub struct LlmRouter {
    primary: Arc<dyn ChatProvider>,
    secondary: Arc<dyn ChatProvider>,
    prefer_secondary: AtomicBool,
}

impl LlmRouter {
    pub fn new(primary: Arc<dyn ChatProvider>, secondary: Arc<dyn ChatProvider>) -> Self {
        Self {
            primary,
            secondary,
            prefer_secondary: AtomicBool::new(false),
        }
    }

    pub fn prefers_secondary(&self) -> bool {
        self.prefer_secondary.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.prefer_secondary.store(false, Ordering::Relaxed);
    }

    /// Run a plain-text generation, failing over once to the other provider.
    pub async fn generate(&self, task: &str, prompt: &str) -> Result<String> {
        self.generate_checked(task, prompt, |text| {
            if text.trim().is_empty() {
                anyhow::bail!("empty completion");
            }
            Ok(text.trim().to_string())
        })
        .await
    }

    /// Run a generation whose output must be a JSON object. A completion that
    /// does not parse counts as that provider's failure and triggers the same
    /// failover as a transport error.
    pub async fn generate_json(&self, task: &str, prompt: &str) -> Result<serde_json::Value> {
        self.generate_checked(task, prompt, |text| {
            let cleaned = clean_model_json(&text);
            serde_json::from_str::<serde_json::Value>(&cleaned)
                .context("completion was not valid JSON")
        })
        .await
    }

    async fn generate_checked<T>(
        &self,
        task: &str,
        prompt: &str,
        check: impl Fn(String) -> Result<T>,
    ) -> Result<T> {
        let order: [&Arc<dyn ChatProvider>; 2] = if self.prefers_secondary() {
            [&self.secondary, &self.primary]
        } else {
            [&self.primary, &self.secondary]
        };

        let mut last_error = None;
        for provider in order {
            match provider.generate(prompt).await.and_then(&check) {
                Ok(value) => {
                    return Ok(value);
                }
                Err(e) => {
                    warn!(
                        task = task,
                        provider = provider.name(),
                        error = %e,
                        "Model provider failed"
                    );
                    if provider.name() == self.primary.name()
                        && !self.prefer_secondary.swap(true, Ordering::Relaxed)
                    {
                        info!(
                            task = task,
                            "Primary model provider failed, preferring secondary from now on"
                        );
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| anyhow::anyhow!("no model provider available"))
            .context(format!("All model providers failed for task '{task}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct StubProvider {
        name: &'static str,
        reply: Result<&'static str, &'static str>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn ok(name: &'static str, reply: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Ok(reply),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Err("boom"),
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::Relaxed)
        }
    }

    #[async_trait]
    impl ChatProvider for StubProvider {
        fn name(&self) -> &'static str {
            self.name
        }

        fn is_configured(&self) -> bool {
            true
        }

        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            match self.reply {
                Ok(text) => Ok(text.to_string()),
                Err(msg) => anyhow::bail!(msg),
            }
        }
    }

    #[tokio::test]
    async fn primary_success_keeps_primary_in_front() {
        let primary = StubProvider::ok("groq", "{\"ok\": true}");
        let secondary = StubProvider::ok("gemini", "{\"ok\": false}");
        let router = LlmRouter::new(primary.clone(), secondary.clone());

        let value = router.generate_json("test", "prompt").await.unwrap();
        assert_eq!(value["ok"], true);
        assert!(!router.prefers_secondary());
        assert_eq!(secondary.calls(), 0);
    }

    #[tokio::test]
    async fn primary_failure_sticks_to_secondary() {
        let primary = StubProvider::failing("groq");
        let secondary = StubProvider::ok("gemini", "{\"ok\": true}");
        let router = LlmRouter::new(primary.clone(), secondary.clone());

        router.generate_json("test", "prompt").await.unwrap();
        assert!(router.prefers_secondary());
        assert_eq!(primary.calls(), 1);

        // Subsequent calls must not touch the primary again.
        router.generate_json("test", "prompt").await.unwrap();
        router.generate_json("test", "prompt").await.unwrap();
        assert_eq!(primary.calls(), 1);
        assert_eq!(secondary.calls(), 3);
    }

    #[tokio::test]
    async fn malformed_json_counts_as_provider_failure() {
        let primary = StubProvider::ok("groq", "this is not json");
        let secondary = StubProvider::ok("gemini", "```json\n{\"ok\": true}\n```");
        let router = LlmRouter::new(primary, secondary);

        let value = router.generate_json("test", "prompt").await.unwrap();
        assert_eq!(value["ok"], true);
        assert!(router.prefers_secondary());
    }

    #[tokio::test]
    async fn both_failing_returns_error() {
        let primary = StubProvider::failing("groq");
        let secondary = StubProvider::failing("gemini");
        let router = LlmRouter::new(primary, secondary);

        assert!(router.generate("test", "prompt").await.is_err());
    }

    #[tokio::test]
    async fn reset_puts_primary_back_in_front() {
        let primary = StubProvider::failing("groq");
        let secondary = StubProvider::ok("gemini", "hello");
        let router = LlmRouter::new(primary.clone(), secondary);

        router.generate("test", "prompt").await.unwrap();
        assert!(router.prefers_secondary());

        router.reset();
        router.generate("test", "prompt").await.unwrap();
        assert_eq!(primary.calls(), 2);
    }
}
