// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod provider;
pub mod publisher;

pub use adapter::{adapter_label, PluginAdapter};
pub use provider::CompletionProvider;
pub use publisher::{ObjectStoragePublisher, RepositoryPublisher};
