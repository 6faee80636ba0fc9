// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Sitesmith configuration system.

use figment::Jail;
use sitesmith_config::diagnostic::ConfigError;
use sitesmith_config::model::{LlmBackend, SitesmithConfig};
use sitesmith_config::{load_and_validate_str, load_config, load_config_from_str};

const COMPLETE_TOML: &str = r#"
[server]
port = 9090

[gathering]
url = "http://localhost:11434"
model = "gemma3:12b"
timeout = 60
temperature = 0.7
max_tokens = 1024
stream = false

[builder]
url = "http://localhost:11434"
model = "qwen2.5-coder:14b"
timeout = 300
temperature = 0.2
max_tokens = 8192
stream = false

[storage]
database_path = "/tmp/sitesmith-test.db"
result_dir = "/tmp/sitesmith-result"
"#;

#[test]
fn complete_toml_deserializes_and_validates() {
    let config = load_and_validate_str(COMPLETE_TOML).expect("complete TOML should validate");
    assert_eq!(config.server.port, 9090);
    assert_eq!(config.gathering.model.as_deref(), Some("gemma3:12b"));
    assert_eq!(config.builder.max_tokens, Some(8192));
    assert_eq!(config.storage.result_dir, "/tmp/sitesmith-result");

    let builder = config.builder.resolve(&config.huggingface).unwrap();
    assert_eq!(builder.timeout.as_secs(), 300);
    assert_eq!(builder.params.temperature, 0.2);
    assert_eq!(builder.backend, LlmBackend::Generate);
    assert!(builder.api_key.is_none());
}

#[test]
fn incomplete_section_names_missing_keys() {
    let config = load_config_from_str(
        r#"
[gathering]
url = "http://localhost:11434"
model = "gemma3:12b"
"#,
    )
    .unwrap();

    let err = config
        .gathering
        .settings("gathering", &config.huggingface)
        .unwrap_err()
        .to_string();
    assert!(err.contains("[gathering]"));
    assert!(err.contains("timeout, temperature, max_tokens, stream"));
    assert!(!err.contains("url"));
}

#[test]
fn missing_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.server.log_level, "info");
    assert_eq!(config.storage.database_path, "sitesmith.db");
    assert_eq!(config.storage.result_dir, "result");
    assert_eq!(
        config.publish.object_storage_url,
        "http://localhost:3004/api/deploy/html"
    );
    assert!(config.limits.daily_builds.is_none());
    assert!(config.builder.url.is_none());
}

#[test]
fn empty_config_fails_validation_with_missing_keys() {
    let errors = load_and_validate_str("").expect_err("LLM sections are required");
    assert!(errors
        .iter()
        .all(|e| matches!(e, ConfigError::MissingKey { .. })));
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::MissingKey { key, .. } if key == "builder.url")));
}

#[test]
fn unknown_field_in_builder_is_rejected_with_suggestion() {
    let toml = r#"
[builder]
modle = "x"
"#;
    let errors = load_and_validate_str(toml).expect_err("should reject unknown field");
    assert!(errors.iter().any(|e| matches!(
        e,
        ConfigError::UnknownKey { key, suggestion: Some(s), .. } if key == "modle" && s == "model"
    )));
}

#[test]
fn unexpected_top_level_section_is_rejected() {
    let toml = r#"
[telegram]
bot_token = "abc"
"#;
    assert!(load_config_from_str(toml).is_err());
}

#[test]
fn wrong_type_reports_invalid_type() {
    let toml = r#"
[server]
port = "eighty"
"#;
    let errors = load_and_validate_str(toml).expect_err("port must be an integer");
    assert!(errors
        .iter()
        .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("port"))));
}

#[test]
fn toml_parses_backend_names() {
    let config: SitesmithConfig = toml::from_str(
        r#"
[builder]
backend = "chat_completions"
"#,
    )
    .unwrap();
    assert_eq!(config.builder.backend, LlmBackend::ChatCompletions);
}

#[test]
fn legacy_environment_names_populate_llm_sections() {
    Jail::expect_with(|jail| {
        jail.set_env("GATHERING_REQUIREMENTS_LLM_URL", "http://gather:11434");
        jail.set_env("GATHERING_REQUIREMENTS_LLM_MODEL", "gemma3:12b");
        jail.set_env("GATHERING_REQUIREMENTS_LLM_TIMEOUT", "30");
        jail.set_env("GATHERING_REQUIREMENTS_LLM_TEMPERATURE", "0.5");
        jail.set_env("GATHERING_REQUIREMENTS_LLM_MAX_TOKENS", "512");
        jail.set_env("GATHERING_REQUIREMENTS_LLM_STREAM", "false");
        jail.set_env("BUILDER_LLM_URL", "http://builder:11434");
        jail.set_env("BUILDER_LLM_MODEL", "qwen2.5-coder");
        jail.set_env("BUILDER_LLM_TIMEOUT", "600");
        jail.set_env("BUILDER_LLM_TEMPERATURE", "0.2");
        jail.set_env("BUILDER_LLM_MAX_TOKENS", "8000");
        jail.set_env("BUILDER_LLM_STREAM", "false");
        jail.set_env("PORT", "9000");

        let config = load_config()?;
        assert_eq!(config.gathering.url.as_deref(), Some("http://gather:11434"));
        assert_eq!(config.gathering.timeout, Some(30));
        assert_eq!(config.gathering.temperature, Some(0.5));
        assert_eq!(config.builder.model.as_deref(), Some("qwen2.5-coder"));
        assert_eq!(config.builder.max_tokens, Some(8000));
        assert_eq!(config.builder.stream, Some(false));
        assert_eq!(config.server.port, 9000);
        Ok(())
    });
}

#[test]
fn prefixed_environment_overrides_toml_file() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "sitesmith.toml",
            r#"
[storage]
result_dir = "from-toml"

[publish]
object_storage_url = "http://toml:3004/api/deploy/html"
"#,
        )?;
        jail.set_env("SITESMITH_STORAGE_RESULT_DIR", "from-env");
        jail.set_env("SITESMITH_LIMITS_DAILY_BUILDS", "3");
        jail.set_env(
            "SITESMITH_PUBLISH_OBJECT_STORAGE_URL",
            "http://env:3004/api/deploy/html",
        );

        let config = load_config()?;
        assert_eq!(config.storage.result_dir, "from-env");
        assert_eq!(config.limits.daily_builds, Some(3));
        assert_eq!(
            config.publish.object_storage_url,
            "http://env:3004/api/deploy/html"
        );
        Ok(())
    });
}
