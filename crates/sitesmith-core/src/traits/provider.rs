// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion provider trait for LLM upstreams.

use async_trait::async_trait;

use crate::error::LlmError;
use crate::traits::adapter::PluginAdapter;
use crate::types::CompletionRequest;

/// A one-shot text completion backend.
///
/// Implementations send exactly one upstream request per call, with no
/// retries and no caching, and return the raw completion text.
#[async_trait]
pub trait CompletionProvider: PluginAdapter {
    /// Model identifier sent with every request.
    fn model(&self) -> &str;

    /// Sends the request and returns the completion text.
    async fn generate(&self, request: &CompletionRequest) -> Result<String, LlmError>;
}
