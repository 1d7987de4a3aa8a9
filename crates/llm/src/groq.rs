use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::provider::ChatProvider;

const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";

/// Primary judgment model, OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct GroqClient {
    api_key: String,
    model: String,
    client: reqwest::Client,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl GroqClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_default_model(api_key: String) -> Self {
        Self::new(api_key, "llama-3.1-8b-instant".to_string())
    }
}

#[async_trait]
impl ChatProvider for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        if !self.is_configured() {
            anyhow::bail!("Groq API key is not configured");
        }

        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: 0.0,
        };

        let response = self
            .client
            .post(GROQ_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send request to Groq")?;

        if !response.status().is_success() {
            anyhow::bail!("Groq request failed: {}", response.status());
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Groq response")?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .context("Groq response contained no choices")?;

        Ok(content)
    }
}
