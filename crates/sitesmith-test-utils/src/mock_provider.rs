// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock completion provider for deterministic testing.
//!
//! `MockProvider` implements `CompletionProvider` with pre-configured
//! results and records every request it receives, so tests can assert on
//! call counts and prompt contents without an LLM upstream.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sitesmith_core::{
    AdapterType, CompletionProvider, CompletionRequest, HealthStatus, LlmError, PluginAdapter,
    SitesmithError,
};

/// A mock LLM provider that returns pre-configured results.
///
/// Results are popped from a FIFO queue. When the queue is empty,
/// a default "mock response" text is returned.
pub struct MockProvider {
    responses: Arc<Mutex<VecDeque<Result<String, LlmError>>>>,
    calls: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl MockProvider {
    /// Create a new mock provider with an empty response queue.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a mock provider pre-loaded with successful responses.
    pub fn with_responses<S: Into<String>>(responses: Vec<S>) -> Self {
        Self::with_results(responses.into_iter().map(|r| Ok(r.into())).collect())
    }

    /// Create a mock provider pre-loaded with arbitrary results, failures included.
    pub fn with_results(results: Vec<Result<String, LlmError>>) -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::from(results))),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response to the end of the queue.
    pub async fn add_response(&self, text: impl Into<String>) {
        self.responses.lock().await.push_back(Ok(text.into()));
    }

    /// Add a failure to the end of the queue.
    pub async fn add_error(&self, error: LlmError) {
        self.responses.lock().await.push_back(Err(error));
    }

    /// Every request received so far, oldest first.
    pub async fn calls(&self) -> Vec<CompletionRequest> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    async fn next_response(&self) -> Result<String, LlmError> {
        self.responses
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| Ok("mock response".to_string()))
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
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
impl CompletionProvider for MockProvider {
    fn model(&self) -> &str {
        "mock-model"
    }

    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.calls.lock().await.push(request.clone());
        if request.prompt.trim().is_empty() {
            return Err(LlmError::EmptyInput);
        }
        self.next_response().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesmith_core::GenerationParams;

    fn request(prompt: &str) -> CompletionRequest {
        CompletionRequest::new(None, prompt, GenerationParams::default())
    }

    #[tokio::test]
    async fn default_response_when_queue_empty() {
        let provider = MockProvider::new();
        assert_eq!(provider.generate(&request("hi")).await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn queued_results_returned_in_order() {
        let provider = MockProvider::with_results(vec![
            Ok("first".to_string()),
            Err(LlmError::EmptyCompletion),
        ]);
        assert_eq!(provider.generate(&request("a")).await.unwrap(), "first");
        assert!(matches!(
            provider.generate(&request("b")).await,
            Err(LlmError::EmptyCompletion)
        ));
        assert_eq!(provider.generate(&request("c")).await.unwrap(), "mock response");
    }

    #[tokio::test]
    async fn records_every_request() {
        let provider = MockProvider::with_responses(vec!["x"]);
        provider.generate(&request("one")).await.unwrap();
        provider.generate(&request("two")).await.unwrap();

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].prompt, "one");
        assert_eq!(calls[1].prompt, "two");
    }

    #[tokio::test]
    async fn blank_prompt_does_not_consume_queue() {
        let provider = MockProvider::with_responses(vec!["kept"]);
        assert!(matches!(
            provider.generate(&request(" ")).await,
            Err(LlmError::EmptyInput)
        ));
        assert_eq!(provider.generate(&request("go")).await.unwrap(), "kept");
    }
}
