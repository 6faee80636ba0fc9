// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the object-storage deploy sidecar.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitesmith_config::model::PublishConfig;
use sitesmith_core::{
    AdapterType, HealthStatus, ObjectStoragePublisher, ObjectStorageReceipt, PluginAdapter,
    SitesmithError,
};
use tracing::{debug, info, warn};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DeployRequest<'a> {
    html_content: &'a str,
    filename: &'a str,
}

#[derive(Debug, Deserialize)]
struct DeployResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: DeployData,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeployData {
    #[serde(default)]
    message: String,
    #[serde(default)]
    remote_path: String,
}

/// Uploads artifacts by POSTing them to the deploy endpoint.
#[derive(Debug, Clone)]
pub struct HttpObjectStoragePublisher {
    client: reqwest::Client,
    url: String,
}

impl HttpObjectStoragePublisher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SitesmithError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SitesmithError::Config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn from_config(config: &PublishConfig) -> Result<Self, SitesmithError> {
        Self::new(
            config.object_storage_url.clone(),
            Duration::from_secs(config.timeout),
        )
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn publication_error(message: String) -> SitesmithError {
    SitesmithError::Publication {
        message,
        source: None,
    }
}

#[async_trait]
impl PluginAdapter for HttpObjectStoragePublisher {
    fn name(&self) -> &str {
        "object-storage"
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
impl ObjectStoragePublisher for HttpObjectStoragePublisher {
    async fn publish(
        &self,
        filename: &str,
        html_content: &str,
    ) -> Result<ObjectStorageReceipt, SitesmithError> {
        let body = DeployRequest {
            html_content,
            filename,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| SitesmithError::Publication {
                message: format!("failed to reach object storage: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SitesmithError::Publication {
                message: format!("failed to read object storage response: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(status = status.as_u16(), body = %text, "object storage response");

        let parsed: DeployResponse = serde_json::from_str(&text).map_err(|e| {
            if status.is_success() {
                SitesmithError::Publication {
                    message: format!("failed to parse object storage response: {e}"),
                    source: Some(Box::new(e)),
                }
            } else {
                publication_error(format!(
                    "object storage returned status {}: {text}",
                    status.as_u16()
                ))
            }
        })?;

        if !parsed.success {
            let reason = parsed
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| format!("status {}", status.as_u16()));
            warn!(filename, error = %reason, "object storage deployment failed");
            return Err(publication_error(format!("deployment failed: {reason}")));
        }

        info!(filename, remote_path = %parsed.data.remote_path, "artifact uploaded");
        Ok(ObjectStorageReceipt {
            remote_path: parsed.data.remote_path,
            message: parsed.data.message,
        })
    }
}
