// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock publication adapters that capture what they were asked to publish.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use sitesmith_core::{
    AdapterType, HealthStatus, ObjectStoragePublisher, ObjectStorageReceipt, PluginAdapter,
    PushRequest, RepositoryPublisher, SitesmithError,
};

/// Object-storage publisher that records uploads.
///
/// Configured with `failing(...)`, every upload returns a publication error.
pub struct MockObjectStorage {
    uploads: Arc<Mutex<Vec<(String, String)>>>,
    failure: Option<String>,
}

impl MockObjectStorage {
    pub fn new() -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            failure: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            uploads: Arc::new(Mutex::new(Vec::new())),
            failure: Some(message.into()),
        }
    }

    /// `(filename, html_content)` pairs in call order.
    pub async fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().await.clone()
    }
}

impl Default for MockObjectStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockObjectStorage {
    fn name(&self) -> &str {
        "mock-object-storage"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    async fn health_check(&self) -> Result<HealthStatus, SitesmithError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SitesmithError> {
        Ok(())
    }
}

#[async_trait]
impl ObjectStoragePublisher for MockObjectStorage {
    async fn publish(
        &self,
        filename: &str,
        html_content: &str,
    ) -> Result<ObjectStorageReceipt, SitesmithError> {
        self.uploads
            .lock()
            .await
            .push((filename.to_string(), html_content.to_string()));

        if let Some(message) = &self.failure {
            return Err(SitesmithError::Publication {
                message: message.clone(),
                source: None,
            });
        }

        Ok(ObjectStorageReceipt {
            remote_path: format!("sites/{filename}"),
            message: "uploaded".to_string(),
        })
    }
}

/// Repository publisher that records pushes and answers with a fixed commit URL.
pub struct MockRepository {
    pushes: Arc<Mutex<Vec<PushRequest>>>,
    commit_url: Result<String, String>,
}

impl MockRepository {
    pub fn new(commit_url: impl Into<String>) -> Self {
        Self {
            pushes: Arc::new(Mutex::new(Vec::new())),
            commit_url: Ok(commit_url.into()),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            pushes: Arc::new(Mutex::new(Vec::new())),
            commit_url: Err(message.into()),
        }
    }

    pub async fn pushes(&self) -> Vec<PushRequest> {
        self.pushes.lock().await.clone()
    }
}

#[async_trait]
impl PluginAdapter for MockRepository {
    fn name(&self) -> &str {
        "mock-repository"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Publisher
    }

    async fn health_check(&self) -> Result<HealthStatus, SitesmithError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), SitesmithError> {
        Ok(())
    }
}

#[async_trait]
impl RepositoryPublisher for MockRepository {
    async fn push(&self, request: &PushRequest) -> Result<String, SitesmithError> {
        self.pushes.lock().await.push(request.clone());
        self.commit_url
            .clone()
            .map_err(|message| SitesmithError::Publication {
                message,
                source: None,
            })
    }
}
