// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Sitesmith website builder.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup. The two LLM sections keep every field optional so
//! that missing values surface through the validation pass as a complete list
//! instead of a single deserialization error.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use sitesmith_core::{GenerationParams, SitesmithError};

/// Top-level Sitesmith configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SitesmithConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM used by the requirements-gathering dialog.
    #[serde(default)]
    pub gathering: LlmEndpointConfig,

    /// LLM used by the website generation pipeline.
    #[serde(default)]
    pub builder: LlmEndpointConfig,

    /// Chat-completions upstream (HuggingFace router style).
    #[serde(default)]
    pub huggingface: HuggingFaceConfig,

    /// Database and artifact locations.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Publication sidecars.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Per-user request limits.
    #[serde(default)]
    pub limits: LimitsConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind the server to.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind the server to.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Which wire protocol an LLM section speaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmBackend {
    /// `POST {url}/api/generate` with `{model, system, prompt, ...}`.
    #[default]
    Generate,
    /// `POST {huggingface.chat_url}` with OpenAI-style `messages`.
    ChatCompletions,
}

/// One LLM endpoint as configured by the operator.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmEndpointConfig {
    /// Base URL of the upstream, without the endpoint path.
    #[serde(default)]
    pub url: Option<String>,

    /// Model name sent with every request.
    #[serde(default)]
    pub model: Option<String>,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout: Option<u64>,

    #[serde(default)]
    pub temperature: Option<f64>,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub stream: Option<bool>,

    #[serde(default)]
    pub backend: LlmBackend,
}

/// Fully resolved LLM settings, produced only after validation succeeded.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmSettings {
    pub url: String,
    pub model: String,
    /// Bearer key, present only for the chat-completions backend.
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub params: GenerationParams,
    pub backend: LlmBackend,
}

impl LlmEndpointConfig {
    /// Names of the required keys that are not set, in declaration order.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
            missing.push("url");
        }
        if self.model.as_deref().is_none_or(|m| m.trim().is_empty()) {
            missing.push("model");
        }
        if self.timeout.is_none() {
            missing.push("timeout");
        }
        if self.temperature.is_none() {
            missing.push("temperature");
        }
        if self.max_tokens.is_none() {
            missing.push("max_tokens");
        }
        if self.stream.is_none() {
            missing.push("stream");
        }
        missing
    }

    /// Resolve into concrete settings. Returns `None` while any required key is missing.
    ///
    /// The chat-completions backend falls back to `[huggingface]` for its
    /// URL and model and always carries the bearer key.
    pub fn resolve(&self, hf: &HuggingFaceConfig) -> Option<LlmSettings> {
        let (url, model, api_key) = match self.backend {
            LlmBackend::Generate => (
                self.url.clone().filter(|u| !u.trim().is_empty())?,
                self.model.clone().filter(|m| !m.trim().is_empty())?,
                None,
            ),
            LlmBackend::ChatCompletions => (
                self.url
                    .clone()
                    .filter(|u| !u.trim().is_empty())
                    .unwrap_or_else(|| hf.chat_url.clone()),
                self.model
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| hf.model.clone()),
                Some(hf.api_key.clone().filter(|k| !k.trim().is_empty())?),
            ),
        };

        Some(LlmSettings {
            url,
            model,
            api_key,
            timeout: Duration::from_secs(self.timeout?),
            params: GenerationParams {
                temperature: self.temperature?,
                max_tokens: self.max_tokens?,
                stream: self.stream?,
            },
            backend: self.backend,
        })
    }

    /// Like [`resolve`](Self::resolve), but names the section and its missing
    /// keys in the error.
    pub fn settings(
        &self,
        section: &str,
        hf: &HuggingFaceConfig,
    ) -> Result<LlmSettings, SitesmithError> {
        self.resolve(hf).ok_or_else(|| {
            let mut missing: Vec<&str> = self.missing_keys();
            if self.backend == LlmBackend::ChatCompletions {
                missing.push("huggingface.api_key");
            }
            SitesmithError::Config(format!(
                "[{section}] is incomplete, missing: {}",
                missing.join(", ")
            ))
        })
    }
}

/// Chat-completions upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HuggingFaceConfig {
    /// Full URL of the chat-completions endpoint.
    #[serde(default = "default_hf_chat_url")]
    pub chat_url: String,

    /// Bearer token. Required only when a section selects `chat_completions`.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_hf_model")]
    pub model: String,
}

impl Default for HuggingFaceConfig {
    fn default() -> Self {
        Self {
            chat_url: default_hf_chat_url(),
            api_key: None,
            model: default_hf_model(),
        }
    }
}

fn default_hf_chat_url() -> String {
    "https://router.huggingface.co/v1/chat/completions".to_string()
}

fn default_hf_model() -> String {
    "ibm-granite/granite-3.3-8b-instruct".to_string()
}

/// Storage configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Directory receiving generated HTML artifacts.
    #[serde(default = "default_result_dir")]
    pub result_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            result_dir: default_result_dir(),
        }
    }
}

fn default_database_path() -> String {
    "sitesmith.db".to_string()
}

fn default_result_dir() -> String {
    "result".to_string()
}

/// Publication sidecar configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PublishConfig {
    /// Deploy endpoint of the object-storage sidecar.
    #[serde(default = "default_object_storage_url")]
    pub object_storage_url: String,

    /// Timeout in seconds for either publication path.
    #[serde(default = "default_publish_timeout")]
    pub timeout: u64,

    /// Program spawned for repository pushes.
    #[serde(default = "default_repository_command")]
    pub repository_command: String,

    /// Arguments passed to `repository_command`.
    #[serde(default = "default_repository_args")]
    pub repository_args: Vec<String>,

    /// Working directory of the push sidecar. `None` inherits ours.
    #[serde(default)]
    pub repository_workdir: Option<String>,

    /// Returned when a push succeeds without reporting a commit URL.
    #[serde(default)]
    pub repository_url: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            object_storage_url: default_object_storage_url(),
            timeout: default_publish_timeout(),
            repository_command: default_repository_command(),
            repository_args: default_repository_args(),
            repository_workdir: None,
            repository_url: None,
        }
    }
}

fn default_object_storage_url() -> String {
    "http://localhost:3004/api/deploy/html".to_string()
}

fn default_publish_timeout() -> u64 {
    60
}

fn default_repository_command() -> String {
    "node".to_string()
}

fn default_repository_args() -> Vec<String> {
    vec!["index.js".to_string()]
}

/// Per-user limits.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Maximum builds per user per local calendar day. `None` means unlimited.
    #[serde(default)]
    pub daily_builds: Option<u32>,
}
