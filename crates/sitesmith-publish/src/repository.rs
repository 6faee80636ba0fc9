// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Repository push through a stdio JSON-RPC sidecar.
//!
//! Each push spawns the sidecar, writes one `tools/call` request line to its
//! stdin, closes stdin and scans stdout for the first line that starts with
//! `{`. That line is the response. The child is killed once we stop reading.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sitesmith_config::model::PublishConfig;
use sitesmith_core::{
    AdapterType, HealthStatus, PluginAdapter, PushRequest, RepositoryPublisher, SitesmithError,
};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// Tool name the sidecar exposes for pushes.
pub const PUSH_TOOL: &str = "push_file_to_github";

const COMMIT_URL_PREFIX: &str = "Commit URL: ";

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: u64,
    method: &'static str,
    params: ToolCall<'a>,
}

#[derive(Debug, Serialize)]
struct ToolCall<'a> {
    name: &'static str,
    arguments: PushArguments<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PushArguments<'a> {
    file_path: &'a str,
    target_path: &'a str,
    commit_message: &'a str,
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<ToolResult>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolResult {
    #[serde(default)]
    content: Vec<ContentItem>,
    #[serde(default)]
    is_error: bool,
}

#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    message: String,
}

/// Serializes the single request line, newline included.
pub fn request_line(request: &PushRequest) -> Result<String, SitesmithError> {
    let rpc = RpcRequest {
        jsonrpc: "2.0",
        id: 1,
        method: "tools/call",
        params: ToolCall {
            name: PUSH_TOOL,
            arguments: PushArguments {
                file_path: &request.file_path,
                target_path: &request.target_path,
                commit_message: &request.commit_message,
            },
        },
    };
    let mut line = serde_json::to_string(&rpc)
        .map_err(|e| SitesmithError::Internal(format!("failed to encode push request: {e}")))?;
    line.push('\n');
    Ok(line)
}

/// Finds the URL after `Commit URL: ` in the tool's text output.
pub fn extract_commit_url(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        line.find(COMMIT_URL_PREFIX)
            .map(|idx| line[idx + COMMIT_URL_PREFIX.len()..].trim().to_string())
            .filter(|url| !url.is_empty())
    })
}

/// Interprets the first JSON line of the sidecar's stdout.
///
/// Returns the first content text on success.
pub fn parse_response(line: &str) -> Result<String, SitesmithError> {
    let response: RpcResponse = serde_json::from_str(line).map_err(|e| {
        SitesmithError::Publication {
            message: format!("failed to parse push response: {e}"),
            source: Some(Box::new(e)),
        }
    })?;

    if let Some(error) = response.error {
        return Err(push_error(format!("push failed: {}", error.message)));
    }

    let result = response.result.unwrap_or_default();
    match result.content.into_iter().next() {
        Some(item) if !result.is_error => Ok(item.text),
        Some(item) => Err(push_error(format!("push failed: {}", item.text))),
        None => Err(push_error("push failed: empty response content".to_string())),
    }
}

fn push_error(message: String) -> SitesmithError {
    SitesmithError::Publication {
        message,
        source: None,
    }
}

/// Spawns the push sidecar for every request.
#[derive(Debug, Clone)]
pub struct StdioRepositoryPublisher {
    command: String,
    args: Vec<String>,
    workdir: Option<PathBuf>,
    fallback_url: Option<String>,
    timeout: Duration,
}

impl StdioRepositoryPublisher {
    pub fn new(command: impl Into<String>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            command: command.into(),
            args,
            workdir: None,
            fallback_url: None,
            timeout,
        }
    }

    pub fn from_config(config: &PublishConfig) -> Self {
        let mut publisher = Self::new(
            config.repository_command.clone(),
            config.repository_args.clone(),
            Duration::from_secs(config.timeout),
        );
        publisher.workdir = config.repository_workdir.as_ref().map(PathBuf::from);
        publisher.fallback_url = config.repository_url.clone();
        publisher
    }

    pub fn with_workdir(mut self, workdir: impl Into<PathBuf>) -> Self {
        self.workdir = Some(workdir.into());
        self
    }

    /// URL returned when the sidecar succeeds without a commit URL.
    pub fn with_fallback_url(mut self, url: impl Into<String>) -> Self {
        self.fallback_url = Some(url.into());
        self
    }

    async fn exchange(&self, line: &str) -> Result<String, SitesmithError> {
        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.workdir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|e| SitesmithError::Publication {
            message: format!("failed to start push sidecar `{}`: {e}", self.command),
            source: Some(Box::new(e)),
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| push_error("push sidecar stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| push_error("push sidecar stdout unavailable".to_string()))?;
        let stderr_task = child.stderr.take().map(|mut stderr| {
            tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            })
        });

        stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| SitesmithError::Publication {
                message: format!("failed to write push request: {e}"),
                source: Some(Box::new(e)),
            })?;
        drop(stdin);

        let mut lines = BufReader::new(stdout).lines();
        let mut skipped = Vec::new();
        let found = loop {
            match lines.next_line().await {
                Ok(Some(out)) => {
                    let trimmed = out.trim();
                    if trimmed.starts_with('{') {
                        break Some(trimmed.to_string());
                    }
                    if !trimmed.is_empty() {
                        skipped.push(trimmed.to_string());
                    }
                }
                Ok(None) => break None,
                Err(e) => {
                    return Err(SitesmithError::Publication {
                        message: format!("failed to read push sidecar output: {e}"),
                        source: Some(Box::new(e)),
                    });
                }
            }
        };

        match found {
            Some(json) => {
                let _ = child.start_kill();
                Ok(json)
            }
            None => {
                let status = child.wait().await.ok();
                let stderr = match stderr_task {
                    Some(task) => task.await.unwrap_or_default(),
                    None => String::new(),
                };
                debug!(?status, stdout = ?skipped, stderr = %stderr, "push sidecar output");
                Err(push_error(format!(
                    "no JSON response from push sidecar (exit: {}, stderr: {})",
                    status.map_or_else(|| "unknown".to_string(), |s| s.to_string()),
                    stderr.trim()
                )))
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for StdioRepositoryPublisher {
    fn name(&self) -> &str {
        "repository"
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
impl RepositoryPublisher for StdioRepositoryPublisher {
    async fn push(&self, request: &PushRequest) -> Result<String, SitesmithError> {
        let line = request_line(request)?;

        let json = tokio::time::timeout(self.timeout, self.exchange(&line))
            .await
            .map_err(|_| {
                push_error(format!(
                    "push sidecar timed out after {}s",
                    self.timeout.as_secs()
                ))
            })??;

        let text = parse_response(&json).inspect_err(|e| {
            warn!(target_path = %request.target_path, error = %e, "repository push failed");
        })?;

        let url = extract_commit_url(&text)
            .or_else(|| self.fallback_url.clone())
            .unwrap_or_default();
        info!(target_path = %request.target_path, commit_url = %url, "artifact pushed");
        Ok(url)
    }
}
