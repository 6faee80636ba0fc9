// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Sitesmith website builder.
//!
//! This crate provides the trait definitions, error types, and common types
//! used throughout the Sitesmith workspace. LLM providers, storage, and
//! publication adapters implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

pub use error::{ErrorCategory, LlmError, SitesmithError};
pub use types::{
    AdapterType, CompletionRequest, DialogMessage, GenerationParams, HealthStatus,
    ObjectStorageReceipt, ProjectStatus, PushRequest, Requirements, Role, Stage,
};

pub use traits::{
    adapter_label, CompletionProvider, ObjectStoragePublisher, PluginAdapter, RepositoryPublisher,
};
