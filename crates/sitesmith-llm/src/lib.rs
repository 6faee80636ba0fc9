// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM completion clients for the Sitesmith website builder.
//!
//! Two wire protocols are supported: the Ollama-style `/api/generate`
//! endpoint and OpenAI-style chat completions. [`build_provider`] picks
//! one from resolved configuration.

pub mod chat;
pub mod client;
pub mod types;

use std::sync::Arc;

use sitesmith_config::{LlmBackend, LlmSettings};
use sitesmith_core::{CompletionProvider, SitesmithError};

pub use chat::ChatCompletionsClient;
pub use client::GenerateClient;

/// Build the completion provider described by `settings`.
pub fn build_provider(settings: &LlmSettings) -> Result<Arc<dyn CompletionProvider>, SitesmithError> {
    match settings.backend {
        LlmBackend::Generate => Ok(Arc::new(GenerateClient::new(
            &settings.url,
            settings.model.clone(),
            settings.timeout,
        )?)),
        LlmBackend::ChatCompletions => {
            let api_key = settings.api_key.clone().ok_or_else(|| {
                SitesmithError::Config("chat-completions backend requires an API key".into())
            })?;
            Ok(Arc::new(ChatCompletionsClient::new(
                settings.url.clone(),
                settings.model.clone(),
                api_key,
                settings.timeout,
            )?))
        }
    }
}
