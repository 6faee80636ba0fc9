// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication adapter traits for generated artifacts.

use async_trait::async_trait;

use crate::error::SitesmithError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ObjectStorageReceipt, PushRequest};

/// Uploads a named HTML artifact to object storage.
#[async_trait]
pub trait ObjectStoragePublisher: PluginAdapter {
    async fn publish(
        &self,
        filename: &str,
        html_content: &str,
    ) -> Result<ObjectStorageReceipt, SitesmithError>;
}

/// Pushes an artifact file as a commit to a remote repository.
#[async_trait]
pub trait RepositoryPublisher: PluginAdapter {
    /// Returns the commit URL on success.
    async fn push(&self, request: &PushRequest) -> Result<String, SitesmithError>;
}
