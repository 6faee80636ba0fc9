// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Identity and lifecycle shared by every external dependency sitesmith talks to.
//!
//! The two LLM endpoints are `Provider`s, the SQLite store is `Storage`,
//! and the object storage upload and repository push sidecar are
//! `Publisher`s. `sitesmith doctor` and `/health` only see them through
//! this trait.

use async_trait::async_trait;

use crate::error::SitesmithError;
use crate::types::{AdapterType, HealthStatus};

/// An external dependency of the website builder.
#[async_trait]
pub trait PluginAdapter: Send + Sync + 'static {
    /// Short name used in logs and health output, e.g. `"sqlite"`.
    fn name(&self) -> &str;

    /// Version of the adapter implementation.
    fn version(&self) -> semver::Version;

    /// Which role the adapter fills.
    fn adapter_type(&self) -> AdapterType;

    /// Checks that the dependency can serve requests right now.
    ///
    /// A reachable but misbehaving dependency reports `Degraded`; `Err` is
    /// reserved for failures to run the check at all.
    async fn health_check(&self) -> Result<HealthStatus, SitesmithError>;

    /// Releases connections or child processes. Called once at shutdown.
    async fn shutdown(&self) -> Result<(), SitesmithError>;
}

/// `"<type>/<name> v<version>"`, as logged at startup.
pub fn adapter_label(adapter: &dyn PluginAdapter) -> String {
    format!(
        "{}/{} v{}",
        adapter.adapter_type(),
        adapter.name(),
        adapter.version()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Sidecar;

    #[async_trait]
    impl PluginAdapter for Sidecar {
        fn name(&self) -> &str {
            "push-sidecar"
        }

        fn version(&self) -> semver::Version {
            semver::Version::new(0, 3, 1)
        }

        fn adapter_type(&self) -> AdapterType {
            AdapterType::Publisher
        }

        async fn health_check(&self) -> Result<HealthStatus, SitesmithError> {
            Ok(HealthStatus::Degraded("command not on PATH".into()))
        }

        async fn shutdown(&self) -> Result<(), SitesmithError> {
            Ok(())
        }
    }

    #[test]
    fn label_names_role_and_version() {
        assert_eq!(adapter_label(&Sidecar), "Publisher/push-sidecar v0.3.1");
    }

    #[test]
    fn adapters_are_usable_as_trait_objects() {
        let adapters: Vec<Box<dyn PluginAdapter>> = vec![Box::new(Sidecar)];
        let labels: Vec<String> = adapters.iter().map(|a| adapter_label(a.as_ref())).collect();
        assert_eq!(labels, ["Publisher/push-sidecar v0.3.1"]);
    }
}
