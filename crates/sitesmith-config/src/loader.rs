// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./sitesmith.toml` > `~/.config/sitesmith/sitesmith.toml`
//! > `/etc/sitesmith/sitesmith.toml`, with `SITESMITH_*` overrides and the
//! unprefixed variable names the deployment scripts already export
//! (`BUILDER_LLM_URL`, `PORT`, ...).

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SitesmithConfig;

/// Top-level sections addressable through `SITESMITH_<SECTION>_<KEY>`.
const SECTIONS: &[&str] = &[
    "server",
    "gathering",
    "builder",
    "huggingface",
    "storage",
    "publish",
    "limits",
];

/// Field suffixes shared by the two legacy LLM variable families.
const LLM_FIELDS: &[&str] = &["url", "model", "timeout", "temperature", "max_tokens", "stream"];

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/sitesmith/sitesmith.toml`
/// 3. `~/.config/sitesmith/sitesmith.toml`
/// 4. `./sitesmith.toml`
/// 5. `SITESMITH_*` environment variables
/// 6. Legacy unprefixed variables
pub fn load_config() -> Result<SitesmithConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<SitesmithConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SitesmithConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SitesmithConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SitesmithConfig::default()))
        .merge(Toml::file(path))
        .merge(prefixed_env_provider())
        .merge(legacy_env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SitesmithConfig::default()))
        .merge(Toml::file("/etc/sitesmith/sitesmith.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("sitesmith/sitesmith.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("sitesmith.toml"))
        .merge(prefixed_env_provider())
        .merge(legacy_env_provider())
}

/// `SITESMITH_BUILDER_MAX_TOKENS` -> `builder.max_tokens`.
///
/// Only the first segment is split off; the remainder is the field name
/// verbatim, so underscores inside field names survive.
fn prefixed_env_provider() -> Env {
    Env::prefixed("SITESMITH_").filter_map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        SECTIONS.iter().find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .filter(|field| !field.is_empty())
                .map(|field| format!("{section}.{field}").into())
        })
    })
}

/// Map the unprefixed variable names onto config keys.
fn legacy_env_provider() -> Env {
    Env::raw().filter_map(|key| {
        let key = key.as_str().to_ascii_lowercase();
        legacy_key(&key).map(Into::into)
    })
}

/// Returns the dotted config key for a lowercased legacy variable name.
pub(crate) fn legacy_key(var: &str) -> Option<String> {
    let llm_section = |prefix: &str, section: &str| {
        var.strip_prefix(prefix)
            .filter(|field| LLM_FIELDS.contains(field))
            .map(|field| format!("{section}.{field}"))
    };

    if let Some(key) = llm_section("gathering_requirements_llm_", "gathering") {
        return Some(key);
    }
    if let Some(key) = llm_section("builder_llm_", "builder") {
        return Some(key);
    }

    match var {
        "port" => Some("server.port".to_string()),
        "huggingface_chat_url" => Some("huggingface.chat_url".to_string()),
        "huggingface_api_key" => Some("huggingface.api_key".to_string()),
        "huggingface_model" => Some("huggingface.model".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_llm_names_map_to_sections() {
        assert_eq!(
            legacy_key("gathering_requirements_llm_url").as_deref(),
            Some("gathering.url")
        );
        assert_eq!(
            legacy_key("builder_llm_max_tokens").as_deref(),
            Some("builder.max_tokens")
        );
        assert_eq!(legacy_key("port").as_deref(), Some("server.port"));
        assert_eq!(
            legacy_key("huggingface_api_key").as_deref(),
            Some("huggingface.api_key")
        );
    }

    #[test]
    fn unrelated_variables_are_ignored() {
        assert_eq!(legacy_key("path"), None);
        assert_eq!(legacy_key("builder_llm_colour"), None);
        assert_eq!(legacy_key("home"), None);
    }
}
