// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `sitesmith serve` command implementation.
//!
//! Resolves both LLM endpoints, opens storage, builds the publication
//! adapters and runs the gateway until a shutdown signal arrives.

use std::sync::Arc;

use sitesmith_config::SitesmithConfig;
use sitesmith_core::{adapter_label, ObjectStoragePublisher, RepositoryPublisher, SitesmithError};
use sitesmith_dialog::{RequirementsDialog, SessionStore};
use sitesmith_gateway::{start_server, AppState, ServerConfig};
use sitesmith_pipeline::WebsitePipeline;
use sitesmith_publish::{HttpObjectStoragePublisher, StdioRepositoryPublisher};
use sitesmith_storage::{ArtifactStore, Database};
use tracing::{info, warn};

use crate::shutdown;

/// Runs the `sitesmith serve` command.
pub async fn run_serve(config: SitesmithConfig) -> Result<(), SitesmithError> {
    init_tracing(&config.server.log_level);

    info!("starting sitesmith serve");

    let gathering = config.gathering.settings("gathering", &config.huggingface)?;
    let builder = config.builder.settings("builder", &config.huggingface)?;

    let gathering_provider = sitesmith_llm::build_provider(&gathering)?;
    let builder_provider = sitesmith_llm::build_provider(&builder)?;
    info!(
        gathering = %gathering_provider.model(),
        builder = %builder_provider.model(),
        "llm providers ready"
    );

    let sessions = Arc::new(SessionStore::new());
    let dialog = Arc::new(RequirementsDialog::new(
        Arc::clone(&sessions),
        gathering_provider,
        gathering.params,
    ));
    let pipeline = Arc::new(WebsitePipeline::new(builder_provider, builder.params));

    let db = Database::open(&config.storage.database_path).await?;
    let artifacts = ArtifactStore::new(db, &config.storage.result_dir)?;
    info!(
        database = %config.storage.database_path,
        result_dir = %artifacts.dir().display(),
        "storage ready"
    );

    let object_storage = HttpObjectStoragePublisher::from_config(&config.publish)?;
    let repository = StdioRepositoryPublisher::from_config(&config.publish);
    info!(
        storage = %adapter_label(artifacts.database()),
        object_storage = %adapter_label(&object_storage),
        repository = %adapter_label(&repository),
        "adapters ready"
    );
    let object_storage: Arc<dyn ObjectStoragePublisher> = Arc::new(object_storage);
    let repository: Arc<dyn RepositoryPublisher> = Arc::new(repository);

    let shutdown = shutdown::install_signal_handler();

    let state = AppState {
        dialog,
        pipeline,
        artifacts: artifacts.clone(),
        object_storage,
        repository,
        daily_builds: config.limits.daily_builds,
        shutdown: shutdown.clone(),
    };

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let served = start_server(&server_config, state).await;

    // Stop the signal task if the server exited on its own.
    shutdown.cancel();

    let dropped = sessions.clear().await;
    info!(sessions = dropped, "dialog sessions cleared");

    if let Err(e) = artifacts.database().clone().close().await {
        warn!(error = %e, "failed to close database cleanly");
    }

    info!("sitesmith stopped");
    served
}

/// Initializes the tracing subscriber.
///
/// `RUST_LOG` wins; otherwise our crates log at `log_level` and everything
/// else at `warn`.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}

fn default_filter(log_level: &str) -> String {
    [
        "sitesmith",
        "sitesmith_config",
        "sitesmith_dialog",
        "sitesmith_gateway",
        "sitesmith_llm",
        "sitesmith_pipeline",
        "sitesmith_publish",
        "sitesmith_storage",
        "tower_http",
    ]
    .iter()
    .map(|target| format!("{target}={log_level}"))
    .chain(std::iter::once("warn".to_string()))
    .collect::<Vec<_>>()
    .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_workspace_crates() {
        let filter = default_filter("debug");
        assert!(filter.starts_with("sitesmith=debug,"));
        assert!(filter.contains("sitesmith_pipeline=debug"));
        assert!(filter.ends_with(",warn"));
    }
}
