// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The think, build, verify chain.
//!
//! Stages run strictly in order and never retry. Every stage gets the same
//! sampling parameters. A failure aborts the run and carries the stage it
//! happened in.

use std::sync::Arc;
use std::time::Instant;

use sitesmith_core::{
    CompletionProvider, CompletionRequest, GenerationParams, LlmError, Requirements,
    SitesmithError, Stage,
};
use tracing::{debug, info, warn};

use crate::prompts;
use crate::sanitizer::{extract_html, sanitize};

/// Website generator over one completion provider.
pub struct WebsitePipeline {
    provider: Arc<dyn CompletionProvider>,
    params: GenerationParams,
}

impl WebsitePipeline {
    pub fn new(provider: Arc<dyn CompletionProvider>, params: GenerationParams) -> Self {
        Self { provider, params }
    }

    pub fn params(&self) -> GenerationParams {
        self.params
    }

    /// Runs analyze, build, verify and sanitize. Returns the cleaned HTML.
    pub async fn generate_website(
        &self,
        user_message: &str,
        requirements: &Requirements,
    ) -> Result<String, SitesmithError> {
        let started = Instant::now();

        let analyst = prompts::with_requirements(prompts::ANALYST_PROMPT, requirements);
        let plan = self.run_stage(Stage::Analyze, &analyst, user_message).await?;

        let draft = self
            .run_stage(
                Stage::Build,
                prompts::DEVELOPER_PROMPT,
                &prompts::build_message(user_message, &plan),
            )
            .await?;

        let verified = self
            .run_stage(
                Stage::Verify,
                prompts::QA_PROMPT,
                &prompts::verify_message(&plan, &draft),
            )
            .await?;

        let html = sanitize(&verified);
        if html.is_empty() {
            warn!(stage = %Stage::Sanitize, "verified output contained only decoration");
            return Err(SitesmithError::EmptyVerification);
        }

        info!(
            bytes = html.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "website generated"
        );
        Ok(html)
    }

    /// Legacy variant: one build call, then fenced-block extraction.
    pub async fn generate_website_single_shot(
        &self,
        user_message: &str,
        requirements: &Requirements,
    ) -> Result<String, SitesmithError> {
        let system = prompts::with_requirements(prompts::SINGLE_SHOT_PROMPT, requirements);
        let raw = self.run_stage(Stage::Build, &system, user_message).await?;
        let html = extract_html(&raw);
        info!(bytes = html.len(), "website generated in single shot");
        Ok(html)
    }

    async fn run_stage(
        &self,
        stage: Stage,
        system: &str,
        prompt: &str,
    ) -> Result<String, SitesmithError> {
        let started = Instant::now();
        let request = CompletionRequest::new(Some(system.to_string()), prompt, self.params);

        let result = self.provider.generate(&request).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match result {
            Ok(text) if !text.trim().is_empty() => {
                debug!(%stage, elapsed_ms, bytes = text.len(), "stage completed");
                Ok(text)
            }
            Ok(_) | Err(LlmError::EmptyCompletion) => {
                warn!(%stage, elapsed_ms, "stage returned empty output");
                Err(empty_output(stage))
            }
            Err(e) => {
                warn!(%stage, elapsed_ms, error = %e, "stage failed");
                Err(SitesmithError::stage(stage, e))
            }
        }
    }
}

fn empty_output(stage: Stage) -> SitesmithError {
    match stage {
        Stage::Analyze => SitesmithError::EmptyAnalysis,
        Stage::Build => SitesmithError::EmptyBuild,
        Stage::Verify | Stage::Sanitize => SitesmithError::EmptyVerification,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sitesmith_test_utils::MockProvider;

    fn pipeline(provider: &Arc<MockProvider>) -> WebsitePipeline {
        WebsitePipeline::new(
            Arc::clone(provider) as Arc<dyn CompletionProvider>,
            GenerationParams {
                temperature: 0.4,
                max_tokens: 8000,
                stream: false,
            },
        )
    }

    #[tokio::test]
    async fn happy_path_calls_three_stages_in_order() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "PLAN",
            "```html\n<!DOCTYPE html><html></html>\n```",
            "<!DOCTYPE html><html></html>",
        ]));

        let html = pipeline(&provider)
            .generate_website("сайт кофейни", &Requirements::default())
            .await
            .unwrap();
        assert_eq!(html, "<!DOCTYPE html><html></html>");

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 3);

        assert_eq!(calls[0].system.as_deref(), Some(prompts::ANALYST_PROMPT));
        assert_eq!(calls[0].prompt, "сайт кофейни");

        assert_eq!(calls[1].system.as_deref(), Some(prompts::DEVELOPER_PROMPT));
        assert_eq!(calls[1].prompt, prompts::build_message("сайт кофейни", "PLAN"));

        assert_eq!(calls[2].system.as_deref(), Some(prompts::QA_PROMPT));
        assert_eq!(
            calls[2].prompt,
            prompts::verify_message("PLAN", "```html\n<!DOCTYPE html><html></html>\n```")
        );

        for call in &calls {
            assert_eq!(call.params.max_tokens, 8000);
            assert_eq!(call.params.temperature, 0.4);
        }
    }

    #[tokio::test]
    async fn requirements_reach_the_analyst_only() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "PLAN",
            "<html></html>",
            "<html></html>",
        ]));
        let req = Requirements {
            site_type: "лендинг".into(),
            target_audience: "предприниматели".into(),
            note: String::new(),
        };

        pipeline(&provider).generate_website("x", &req).await.unwrap();
        let calls = provider.calls().await;
        assert!(calls[0].system.as_deref().unwrap().contains("предприниматели"));
        assert_eq!(calls[0].prompt, "x");
        assert!(!calls[1].system.as_deref().unwrap().contains("предприниматели"));
    }

    #[tokio::test]
    async fn empty_plan_stops_pipeline() {
        let provider = Arc::new(MockProvider::with_responses(vec!["   "]));
        let err = pipeline(&provider)
            .generate_website("x", &Requirements::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SitesmithError::EmptyAnalysis));
        assert_eq!(provider.call_count().await, 1);
    }

    #[tokio::test]
    async fn empty_completion_maps_to_stage_specific_error() {
        let provider = Arc::new(MockProvider::with_results(vec![
            Ok("PLAN".into()),
            Err(LlmError::EmptyCompletion),
        ]));
        let err = pipeline(&provider)
            .generate_website("x", &Requirements::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SitesmithError::EmptyBuild));
        assert_eq!(err.failed_stage(), Some(Stage::Build));
    }

    #[tokio::test]
    async fn upstream_failure_carries_stage() {
        let provider = Arc::new(MockProvider::with_results(vec![
            Ok("PLAN".into()),
            Ok("<html></html>".into()),
            Err(LlmError::UpstreamStatus {
                status: 502,
                body: "bad gateway".into(),
            }),
        ]));
        let err = pipeline(&provider)
            .generate_website("x", &Requirements::default())
            .await
            .unwrap_err();
        match err {
            SitesmithError::Stage { stage, source } => {
                assert_eq!(stage, Stage::Verify);
                assert!(matches!(source, LlmError::UpstreamStatus { status: 502, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(provider.call_count().await, 3);
    }

    #[tokio::test]
    async fn verify_output_of_pure_decoration_is_empty_verification() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "PLAN",
            "<html></html>",
            "```html\n```",
        ]));
        let err = pipeline(&provider)
            .generate_website("x", &Requirements::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SitesmithError::EmptyVerification));
    }

    #[tokio::test]
    async fn single_shot_extracts_fenced_block() {
        let provider = Arc::new(MockProvider::with_responses(vec![
            "Вот сайт:\n```html\n<!DOCTYPE html><html></html>\n```\nУдачи!",
        ]));
        let html = pipeline(&provider)
            .generate_website_single_shot("сайт", &Requirements::default())
            .await
            .unwrap();
        assert_eq!(html, "<!DOCTYPE html><html></html>");

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].system.as_deref(), Some(prompts::SINGLE_SHOT_PROMPT));
    }

    #[tokio::test]
    async fn single_shot_empty_build_fails() {
        let provider = Arc::new(MockProvider::with_responses(vec![""]));
        let err = pipeline(&provider)
            .generate_website_single_shot("сайт", &Requirements::default())
            .await
            .unwrap_err();
        assert!(matches!(err, SitesmithError::EmptyBuild));
    }
}
