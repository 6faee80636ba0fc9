// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sitesmith doctor` command implementation.
//!
//! Runs diagnostic checks against the configured environment: storage,
//! the artifact directory and reachability of the upstream services.

use std::path::Path;
use std::time::{Duration, Instant};

use sitesmith_config::SitesmithConfig;
use sitesmith_core::{HealthStatus, PluginAdapter, SitesmithError};
use sitesmith_storage::Database;

/// Status of a diagnostic check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

/// Result of a single diagnostic check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub duration: Duration,
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, message: impl Into<String>, started: Instant) -> Self {
        Self {
            name: name.to_string(),
            status,
            message: message.into(),
            duration: started.elapsed(),
        }
    }
}

/// Run the `sitesmith doctor` command.
///
/// Fails when any check fails; warnings are reported but do not fail.
pub async fn run_doctor(config: &SitesmithConfig) -> Result<(), SitesmithError> {
    let probe_timeout = Duration::from_secs(5);
    let results = vec![
        check_database(&config.storage.database_path).await,
        check_result_dir(Path::new(&config.storage.result_dir)).await,
        check_upstream("gathering llm", config.gathering.url.as_deref(), probe_timeout).await,
        check_upstream("builder llm", config.builder.url.as_deref(), probe_timeout).await,
        check_upstream(
            "object storage",
            Some(config.publish.object_storage_url.as_str()),
            probe_timeout,
        )
        .await,
        check_repository_command(&config.publish.repository_command),
    ];

    println!();
    println!("  sitesmith doctor");
    println!("  {}", "-".repeat(50));

    for result in &results {
        println!("{}", format_line(result));
    }
    println!();

    let fail_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Fail)
        .count();
    let warn_count = results
        .iter()
        .filter(|r| r.status == CheckStatus::Warn)
        .count();

    if fail_count == 0 && warn_count == 0 {
        println!("  All checks passed.");
        return Ok(());
    }

    let issues = fail_count + warn_count;
    let issue_word = if issues == 1 { "issue" } else { "issues" };
    println!("  {issues} {issue_word} found.");

    if fail_count > 0 {
        return Err(SitesmithError::Internal(format!(
            "{fail_count} doctor check(s) failed"
        )));
    }
    Ok(())
}

fn format_line(result: &CheckResult) -> String {
    let tag = match result.status {
        CheckStatus::Pass => "[OK]  ",
        CheckStatus::Warn => "[WARN]",
        CheckStatus::Fail => "[FAIL]",
    };
    format!(
        "    {tag} {:<18} {} ({}ms)",
        result.name,
        result.message,
        result.duration.as_millis()
    )
}

async fn check_database(db_path: &str) -> CheckResult {
    let started = Instant::now();
    let db = match Database::open(db_path).await {
        Ok(db) => db,
        Err(e) => return CheckResult::new("database", CheckStatus::Fail, e.to_string(), started),
    };

    let result = match db.health_check().await {
        Ok(HealthStatus::Healthy) => {
            CheckResult::new("database", CheckStatus::Pass, db_path.to_string(), started)
        }
        Ok(HealthStatus::Degraded(reason)) => {
            CheckResult::new("database", CheckStatus::Warn, reason, started)
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            CheckResult::new("database", CheckStatus::Fail, reason, started)
        }
        Err(e) => CheckResult::new("database", CheckStatus::Fail, e.to_string(), started),
    };
    let _ = db.close().await;
    result
}

async fn check_result_dir(dir: &Path) -> CheckResult {
    let started = Instant::now();
    if let Err(e) = tokio::fs::create_dir_all(dir).await {
        return CheckResult::new(
            "result dir",
            CheckStatus::Fail,
            format!("cannot create {}: {e}", dir.display()),
            started,
        );
    }

    let probe = dir.join(".sitesmith-doctor");
    match tokio::fs::write(&probe, b"ok").await {
        Ok(()) => {
            let _ = tokio::fs::remove_file(&probe).await;
            CheckResult::new(
                "result dir",
                CheckStatus::Pass,
                format!("{} is writable", dir.display()),
                started,
            )
        }
        Err(e) => CheckResult::new(
            "result dir",
            CheckStatus::Fail,
            format!("{} is not writable: {e}", dir.display()),
            started,
        ),
    }
}

/// Any HTTP answer counts as reachable; only connection failures warn.
async fn check_upstream(name: &str, url: Option<&str>, timeout: Duration) -> CheckResult {
    let started = Instant::now();
    let Some(url) = url.filter(|u| !u.trim().is_empty()) else {
        return CheckResult::new(name, CheckStatus::Warn, "no url configured", started);
    };

    let client = match reqwest::Client::builder().timeout(timeout).build() {
        Ok(client) => client,
        Err(e) => return CheckResult::new(name, CheckStatus::Fail, e.to_string(), started),
    };

    match client.get(url).send().await {
        Ok(resp) => CheckResult::new(
            name,
            CheckStatus::Pass,
            format!("{url} answered {}", resp.status().as_u16()),
            started,
        ),
        Err(e) => CheckResult::new(
            name,
            CheckStatus::Warn,
            format!("{url} unreachable: {e}"),
            started,
        ),
    }
}

fn check_repository_command(command: &str) -> CheckResult {
    let started = Instant::now();
    let found = if command.contains(std::path::MAIN_SEPARATOR) {
        Path::new(command).is_file()
    } else {
        std::env::var_os("PATH")
            .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(command).is_file()))
            .unwrap_or(false)
    };

    if found {
        CheckResult::new(
            "push sidecar",
            CheckStatus::Pass,
            format!("`{command}` found"),
            started,
        )
    } else {
        CheckResult::new(
            "push sidecar",
            CheckStatus::Warn,
            format!("`{command}` not found, repository publishing will fail"),
            started,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn database_check_passes_on_fresh_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doctor.db");
        let result = check_database(path.to_str().unwrap()).await;
        assert_eq!(result.status, CheckStatus::Pass, "{}", result.message);
    }

    #[tokio::test]
    async fn result_dir_check_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested/result");
        let result = check_result_dir(&target).await;
        assert_eq!(result.status, CheckStatus::Pass);
        assert!(target.is_dir());
        assert!(!target.join(".sitesmith-doctor").exists());
    }

    #[tokio::test]
    async fn missing_upstream_url_warns() {
        let result = check_upstream("builder llm", None, Duration::from_secs(1)).await;
        assert_eq!(result.status, CheckStatus::Warn);
    }

    #[test]
    fn missing_command_warns() {
        let result = check_repository_command("definitely-not-a-real-sitesmith-binary");
        assert_eq!(result.status, CheckStatus::Warn);
        assert_eq!(check_repository_command("sh").status, CheckStatus::Pass);
    }

    #[test]
    fn lines_are_tagged() {
        let result = CheckResult {
            name: "database".into(),
            status: CheckStatus::Fail,
            message: "locked".into(),
            duration: Duration::from_millis(3),
        };
        let line = format_line(&result);
        assert!(line.contains("[FAIL]"));
        assert!(line.contains("locked (3ms)"));
    }
}
