//! OpenAI-compatible chat completions client.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{build_http, handle_response};
use crate::config::Config;
use crate::error::{ClientError, ClientResult};

/// Anything that turns a system + user prompt into model text.
///
/// The enricher only depends on this trait so tests can plug in stubs.
#[async_trait::async_trait]
pub trait CompletionService: Send + Sync {
    /// Run one completion and return the model's raw text.
    async fn complete(&self, system: &str, user: &str) -> ClientResult<String>;
}

/// Chat completions client for any OpenAI-compatible endpoint.
#[derive(Clone)]
pub struct CompletionClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout: Duration,
}

impl CompletionClient {
    /// Create a new client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            http: build_http(config, config.llm_timeout)?,
            base_url: config.llm_base_url.trim_end_matches('/').to_string(),
            api_key: config.llm_api_key.clone(),
            model: config.llm_model.clone(),
            timeout: config.llm_timeout,
        })
    }

    /// Model requests are sent to.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Check if an API key is configured.
    #[must_use]
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }
}

#[async_trait::async_trait]
impl CompletionService for CompletionClient {
    async fn complete(&self, system: &str, user: &str) -> ClientResult<String> {
        let Some(key) = &self.api_key else {
            return Err(ClientError::not_configured("no completion API key"));
        };

        let request = ChatRequest {
            model: &self.model,
            messages: [
                Message { role: "system", content: system },
                Message { role: "user", content: user },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: 0.3,
        };

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(key)
            .json(&request)
            .send()
            .await
            .map_err(|e| ClientError::from_reqwest(e, self.timeout))?;
        let response = handle_response(response).await?;

        let body = response.text().await.map_err(|e| ClientError::from_reqwest(e, self.timeout))?;
        let parsed: ChatResponse = serde_json::from_str(&body)?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(ClientError::EmptyResponse)
    }
}

impl std::fmt::Debug for CompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionClient")
            .field("model", &self.model)
            .field("has_api_key", &self.has_api_key())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [Message<'a>; 2],
    response_format: ResponseFormat,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}
