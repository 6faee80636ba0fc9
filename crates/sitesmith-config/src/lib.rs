// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Sitesmith website builder.
//!
//! Provides TOML configuration parsing with strict validation (`deny_unknown_fields`),
//! XDG file hierarchy lookup, environment variable overrides (including the
//! historical `BUILDER_LLM_*` / `GATHERING_REQUIREMENTS_LLM_*` names), and
//! miette diagnostics with typo suggestions.
//!
//! # Usage
//!
//! ```no_run
//! use sitesmith_config::load_and_validate;
//!
//! let config = load_and_validate().expect("config errors");
//! println!("port: {}", config.server.port);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{LlmBackend, LlmSettings, SitesmithConfig};

/// Load configuration from the XDG hierarchy and environment, then validate it.
pub fn load_and_validate() -> Result<SitesmithConfig, Vec<ConfigError>> {
    match loader::load_config() {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let toml_sources = collect_toml_sources();
            Err(diagnostic::figment_to_config_errors(err, &toml_sources))
        }
    }
}

/// Load configuration from a TOML string and validate it.
pub fn load_and_validate_str(toml_content: &str) -> Result<SitesmithConfig, Vec<ConfigError>> {
    match loader::load_config_from_str(toml_content) {
        Ok(config) => {
            validation::validate_config(&config)?;
            Ok(config)
        }
        Err(err) => {
            let sources = vec![("<inline>".to_string(), toml_content.to_string())];
            Err(diagnostic::figment_to_config_errors(err, &sources))
        }
    }
}

/// Collect TOML source file contents for error span resolution.
fn collect_toml_sources() -> Vec<(String, String)> {
    let mut sources = Vec::new();

    if let Ok(content) = std::fs::read_to_string("sitesmith.toml") {
        let path = std::env::current_dir()
            .map(|d| d.join("sitesmith.toml").display().to_string())
            .unwrap_or_else(|_| "sitesmith.toml".to_string());
        sources.push((path, content));
    }

    if let Some(config_dir) = dirs::config_dir() {
        let path = config_dir.join("sitesmith/sitesmith.toml");
        if let Ok(content) = std::fs::read_to_string(&path) {
            sources.push((path.display().to_string(), content));
        }
    }

    let system_path = std::path::Path::new("/etc/sitesmith/sitesmith.toml");
    if let Ok(content) = std::fs::read_to_string(system_path) {
        sources.push((system_path.display().to_string(), content));
    }

    sources
}
