// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Client for OpenAI-style chat-completions endpoints (HuggingFace router).

use std::time::Duration;

use async_trait::async_trait;
use sitesmith_core::{
    AdapterType, CompletionProvider, CompletionRequest, HealthStatus, LlmError, PluginAdapter,
    SitesmithError,
};
use tracing::debug;

use crate::types::{ChatMessage, ChatRequest, ChatResponse};

/// Marker placed between the system instructions and the user prompt when
/// both travel in a single user message.
const USER_PROMPT_MARKER: &str = "\n\nЗапрос пользователя: ";

/// Chat-completions client authenticated with a bearer key.
#[derive(Debug, Clone)]
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: String,
}

impl ChatCompletionsClient {
    pub fn new(
        url: String,
        model: String,
        api_key: String,
        timeout: Duration,
    ) -> Result<Self, SitesmithError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SitesmithError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            url,
            model,
            api_key,
        })
    }
}

/// Folds the system prompt into the single user message.
fn message_content(request: &CompletionRequest) -> String {
    match request.system.as_deref().filter(|s| !s.trim().is_empty()) {
        Some(system) => format!("{system}{USER_PROMPT_MARKER}{}", request.prompt),
        None => request.prompt.clone(),
    }
}

#[async_trait]
impl PluginAdapter for ChatCompletionsClient {
    fn name(&self) -> &str {
        "chat-completions"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, SitesmithError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SitesmithError> {
        Ok(())
    }
}

#[async_trait]
impl CompletionProvider for ChatCompletionsClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::EmptyInput);
        }

        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: message_content(request),
            }],
            stream: false,
        };

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport {
                message: format!("request to {} failed: {e}", self.url),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, model = %self.model, bytes = text.len(), "chat completion received");

        if !status.is_success() {
            return Err(LlmError::UpstreamStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse =
            serde_json::from_str(&text).map_err(|e| LlmError::PayloadInvalid {
                message: format!("failed to parse chat completion: {e}"),
            })?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(content)
    }
}
