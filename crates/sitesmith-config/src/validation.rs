// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Runs once at startup so that handler code never has to assume a value
//! is present. Collects every problem instead of failing fast.

use crate::diagnostic::{env_var_for, ConfigError};
use crate::model::{LlmBackend, LlmEndpointConfig, SitesmithConfig};

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &SitesmithConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    validate_llm_section("gathering", &config.gathering, &mut errors);
    validate_llm_section("builder", &config.builder, &mut errors);

    let uses_chat_completions = [&config.gathering, &config.builder]
        .iter()
        .any(|section| section.backend == LlmBackend::ChatCompletions);
    if uses_chat_completions {
        if config
            .huggingface
            .api_key
            .as_deref()
            .is_none_or(|k| k.trim().is_empty())
        {
            errors.push(ConfigError::MissingKey {
                key: "huggingface.api_key".to_string(),
                env_var: env_var_for("huggingface.api_key"),
            });
        }
        if !is_http_url(&config.huggingface.chat_url) {
            errors.push(ConfigError::Validation {
                message: format!(
                    "huggingface.chat_url `{}` must be an http(s) URL",
                    config.huggingface.chat_url
                ),
            });
        }
    }

    if config.server.host.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "server.host must not be empty".to_string(),
        });
    }

    if config.server.port == 0 {
        errors.push(ConfigError::Validation {
            message: "server.port must be between 1 and 65535".to_string(),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if config.storage.result_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.result_dir must not be empty".to_string(),
        });
    }

    if !is_http_url(&config.publish.object_storage_url) {
        errors.push(ConfigError::Validation {
            message: format!(
                "publish.object_storage_url `{}` must be an http(s) URL",
                config.publish.object_storage_url
            ),
        });
    }

    if config.publish.timeout == 0 {
        errors.push(ConfigError::Validation {
            message: "publish.timeout must be at least 1 second".to_string(),
        });
    }

    if config.publish.repository_command.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "publish.repository_command must not be empty".to_string(),
        });
    }

    if config.limits.daily_builds == Some(0) {
        errors.push(ConfigError::Validation {
            message: "limits.daily_builds must be positive; omit it for no limit".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_llm_section(name: &str, section: &LlmEndpointConfig, errors: &mut Vec<ConfigError>) {
    for field in section.missing_keys() {
        // The chat-completions backend falls back to [huggingface].
        if matches!(field, "url" | "model") && section.backend == LlmBackend::ChatCompletions {
            continue;
        }
        let key = format!("{name}.{field}");
        errors.push(ConfigError::MissingKey {
            env_var: env_var_for(&key),
            key,
        });
    }

    if let Some(url) = section.url.as_deref()
        && !url.trim().is_empty()
        && !is_http_url(url)
    {
        errors.push(ConfigError::Validation {
            message: format!("{name}.url `{url}` must be an http(s) URL"),
        });
    }

    if section.timeout == Some(0) {
        errors.push(ConfigError::Validation {
            message: format!("{name}.timeout must be at least 1 second"),
        });
    }

    if let Some(temperature) = section.temperature
        && !(0.0..=2.0).contains(&temperature)
    {
        errors.push(ConfigError::Validation {
            message: format!("{name}.temperature must be within 0.0..=2.0, got {temperature}"),
        });
    }

    if section.max_tokens == Some(0) {
        errors.push(ConfigError::Validation {
            message: format!("{name}.max_tokens must be positive"),
        });
    }
}

fn is_http_url(value: &str) -> bool {
    let value = value.trim();
    value.starts_with("http://") || value.starts_with("https://")
}
