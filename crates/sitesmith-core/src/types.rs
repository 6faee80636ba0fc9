// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the dialog, pipeline, storage, and gateway crates.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter behind a trait object.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Provider,
    Storage,
    Publisher,
}

/// One of the ordered stages of the website generation pipeline.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Analyze,
    Build,
    Verify,
    Sanitize,
}

/// Structured site requirements collected by the dialog.
///
/// An empty string means the field has not been captured yet.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirements {
    #[serde(default)]
    pub site_type: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub note: String,
}

impl Requirements {
    pub fn is_empty(&self) -> bool {
        self.site_type.is_empty() && self.target_audience.is_empty() && self.note.is_empty()
    }
}

/// Author of a dialog or stored message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single dialog turn. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogMessage {
    pub role: Role,
    pub content: String,
}

impl DialogMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Lifecycle state of a generated project.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Building,
    Completed,
    Failed,
}

/// Sampling parameters shared by every stage of one request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f64,
    pub max_tokens: u32,
    pub stream: bool,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
            stream: false,
        }
    }
}

/// A single completion request handed to a [`CompletionProvider`](crate::CompletionProvider).
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Optional system prompt.
    pub system: Option<String>,
    /// The user prompt; must be non-blank.
    pub prompt: String,
    pub params: GenerationParams,
}

impl CompletionRequest {
    pub fn new(system: Option<String>, prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            system,
            prompt: prompt.into(),
            params,
        }
    }
}

/// Result of a successful object-storage upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectStorageReceipt {
    pub remote_path: String,
    pub message: String,
}

/// Arguments of a repository push.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushRequest {
    pub file_path: String,
    pub target_path: String,
    pub commit_message: String,
}

impl PushRequest {
    /// Builds the push for a generated artifact, committing it under its own file name.
    pub fn for_artifact(absolute_path: &str, filename: &str) -> Self {
        Self {
            file_path: absolute_path.to_string(),
            target_path: filename.to_string(),
            commit_message: format!("Add generated website {filename}"),
        }
    }
}
