// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for Ollama-style `/api/generate` endpoints.
//!
//! One request per call, no retries. Every failure is mapped onto a
//! distinct [`LlmError`] variant so callers can tell transport problems
//! from upstream refusals.

use std::time::Duration;

use async_trait::async_trait;
use sitesmith_core::{
    AdapterType, CompletionProvider, CompletionRequest, HealthStatus, LlmError, PluginAdapter,
    SitesmithError,
};
use tracing::debug;

use crate::types::{GenerateRequest, GenerateResponse};

/// Client for a text-completion endpoint at `{base_url}/api/generate`.
#[derive(Debug, Clone)]
pub struct GenerateClient {
    client: reqwest::Client,
    model: String,
    endpoint: String,
}

impl GenerateClient {
    /// Creates a client bound to one base URL, model, and request timeout.
    pub fn new(base_url: &str, model: String, timeout: Duration) -> Result<Self, SitesmithError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SitesmithError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            model,
            endpoint: format!("{}/api/generate", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl PluginAdapter for GenerateClient {
    fn name(&self) -> &str {
        "generate"
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
impl CompletionProvider for GenerateClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        if request.prompt.trim().is_empty() {
            return Err(LlmError::EmptyInput);
        }

        let body = GenerateRequest {
            model: &self.model,
            system: request.system.as_deref().filter(|s| !s.is_empty()),
            prompt: &request.prompt,
            temperature: request.params.temperature,
            max_tokens: request.params.max_tokens,
            stream: request.params.stream,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport {
                message: format!("request to {} failed: {e}", self.endpoint),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| LlmError::Transport {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;
        debug!(status = %status, model = %self.model, bytes = text.len(), "generate response received");

        if !status.is_success() {
            return Err(LlmError::UpstreamStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let completion = if request.params.stream {
            parse_stream_body(&text)?
        } else {
            parse_body(&text)?
        };

        if completion.trim().is_empty() {
            return Err(LlmError::EmptyCompletion);
        }
        Ok(completion)
    }
}

fn parse_body(text: &str) -> Result<String, LlmError> {
    let parsed: GenerateResponse =
        serde_json::from_str(text).map_err(|e| LlmError::PayloadInvalid {
            message: format!("failed to parse generate response: {e}"),
        })?;
    check_error(&parsed)?;
    Ok(parsed.response)
}

/// Streamed answers arrive as one JSON object per line; the text is the
/// concatenation of every chunk's `response`.
fn parse_stream_body(text: &str) -> Result<String, LlmError> {
    let mut completion = String::new();
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        let chunk: GenerateResponse =
            serde_json::from_str(line).map_err(|e| LlmError::PayloadInvalid {
                message: format!("failed to parse streamed chunk: {e}"),
            })?;
        check_error(&chunk)?;
        completion.push_str(&chunk.response);
        if chunk.done {
            break;
        }
    }
    Ok(completion)
}

fn check_error(response: &GenerateResponse) -> Result<(), LlmError> {
    match response.error.as_deref() {
        Some(message) if !message.is_empty() => Err(LlmError::Upstream(message.to_string())),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesmith_core::GenerationParams;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> GenerateClient {
        GenerateClient::new(base_url, "gemma3:12b".into(), Duration::from_secs(5)).unwrap()
    }

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest::new(
            Some("you are a planner".into()),
            prompt,
            GenerationParams {
                temperature: 0.3,
                max_tokens: 512,
                stream: false,
            },
        )
    }

    #[tokio::test]
    async fn generate_returns_response_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .and(body_partial_json(serde_json::json!({
                "model": "gemma3:12b",
                "system": "you are a planner",
                "prompt": "landing page",
                "max_tokens": 512,
                "stream": false
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "PLAN",
                "done": true
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let text = client.generate(&request("landing page")).await.unwrap();
        assert_eq!(text, "PLAN");
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_ignored() {
        let client = test_client("http://localhost:11434/");
        assert_eq!(client.endpoint(), "http://localhost:11434/api/generate");
    }

    #[tokio::test]
    async fn blank_prompt_is_rejected_without_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.generate(&request("   ")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyInput));
    }

    #[tokio::test]
    async fn non_success_status_carries_code_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/generate"))
            .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.generate(&request("hi")).await.unwrap_err();
        match err {
            LlmError::UpstreamStatus { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "model crashed");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unparseable_body_is_payload_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.generate(&request("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::PayloadInvalid { .. }));
    }

    #[tokio::test]
    async fn embedded_error_field_fails_even_with_200() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "",
                "done": true,
                "error": "model not found"
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.generate(&request("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::Upstream(ref m) if m == "model not found"));
    }

    #[tokio::test]
    async fn empty_response_is_empty_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "response": "",
                "done": true
            })))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.generate(&request("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyCompletion));
    }

    #[tokio::test]
    async fn slow_upstream_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_delay(Duration::from_secs(3))
                    .set_body_json(serde_json::json!({"response": "late", "done": true})),
            )
            .mount(&server)
            .await;

        let client =
            GenerateClient::new(&server.uri(), "m".into(), Duration::from_millis(200)).unwrap();
        let err = client.generate(&request("hi")).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport { .. }));
    }

    #[tokio::test]
    async fn streamed_chunks_are_concatenated() {
        let server = MockServer::start().await;
        let body = concat!(
            "{\"response\":\"<!DOCTYPE \",\"done\":false}\n",
            "{\"response\":\"html>\",\"done\":false}\n",
            "{\"response\":\"\",\"done\":true}\n"
        );
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let mut req = request("hi");
        req.params.stream = true;
        let text = client.generate(&req).await.unwrap();
        assert_eq!(text, "<!DOCTYPE html>");
    }
}
