// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Sitesmith website builder.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::Stage;

/// Failures of a single completion request against an LLM upstream.
#[derive(Debug, Error)]
pub enum LlmError {
    /// The user prompt was blank; no request was sent.
    #[error("user prompt is empty")]
    EmptyInput,

    /// The request could not be completed (connect failure, timeout, body read).
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream answered with a non-success HTTP status.
    #[error("upstream returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    /// The upstream body could not be decoded.
    #[error("upstream payload invalid: {message}")]
    PayloadInvalid { message: String },

    /// The decoded payload carried a non-empty error field.
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The payload decoded but the completion text was empty.
    #[error("upstream returned an empty completion")]
    EmptyCompletion,
}

/// Coarse error classes used at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Upstream,
    Sanitization,
    Persistence,
    Publication,
    Internal,
}

/// The primary error type used across all Sitesmith crates.
#[derive(Debug, Error)]
pub enum SitesmithError {
    /// Configuration errors detected after startup validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Malformed request or empty required field.
    #[error("invalid input: {0}")]
    Input(String),

    /// A completion request failed outside of the pipeline.
    #[error(transparent)]
    Llm(#[from] LlmError),

    /// A pipeline stage failed while talking to the LLM upstream.
    #[error("{stage} stage failed: {source}")]
    Stage {
        stage: Stage,
        #[source]
        source: LlmError,
    },

    /// The analysis stage produced no plan.
    #[error("analysis stage returned an empty plan")]
    EmptyAnalysis,

    /// The build stage produced no HTML.
    #[error("build stage returned empty HTML")]
    EmptyBuild,

    /// The verification stage produced no HTML.
    #[error("verification stage returned empty HTML")]
    EmptyVerification,

    /// Reserved for strict-mode HTML validation.
    #[error("sanitization error: {0}")]
    Sanitization(String),

    /// Storage backend errors (connection, query, row decoding).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Schema migration failed.
    #[error("migration error: {source}")]
    Migration {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The artifact file could not be written.
    #[error("failed to write artifact {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The artifact was written but its project row could not be recorded.
    #[error("artifact {} written but not indexed: {source}", path.display())]
    ArtifactIndex {
        path: PathBuf,
        #[source]
        source: Box<SitesmithError>,
    },

    /// A row addressed by id does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// The surrounding request was cancelled before the operation finished.
    #[error("operation cancelled")]
    Cancelled,

    /// Object-storage upload or repository push failed.
    #[error("publication failed: {message}")]
    Publication {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SitesmithError {
    /// Wraps an LLM failure with the stage it happened in.
    pub fn stage(stage: Stage, source: LlmError) -> Self {
        Self::Stage { stage, source }
    }

    /// Returns the stage this error originated from, if any.
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            Self::Stage { stage, .. } => Some(*stage),
            Self::EmptyAnalysis => Some(Stage::Analyze),
            Self::EmptyBuild => Some(Stage::Build),
            Self::EmptyVerification => Some(Stage::Verify),
            _ => None,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Input(_) => ErrorCategory::Input,
            Self::Llm(_)
            | Self::Stage { .. }
            | Self::EmptyAnalysis
            | Self::EmptyBuild
            | Self::EmptyVerification => ErrorCategory::Upstream,
            Self::Sanitization(_) => ErrorCategory::Sanitization,
            Self::Storage { .. }
            | Self::Migration { .. }
            | Self::ArtifactWrite { .. }
            | Self::ArtifactIndex { .. }
            | Self::NotFound { .. } => ErrorCategory::Persistence,
            Self::Publication { .. } => ErrorCategory::Publication,
            Self::Config(_) | Self::Cancelled | Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// True for the not-found sentinel returned by the persistence layer.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
