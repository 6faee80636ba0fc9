// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One requirements-gathering turn: record, prompt, ask, advance.

use std::sync::Arc;

use sitesmith_core::{CompletionProvider, CompletionRequest, GenerationParams, Role, SitesmithError};
use tracing::{debug, info, warn};

use crate::prompt::requirements_prompt;
use crate::session::{normalize_user_id, DialogSession, SessionStore};

/// Assistant reply plus the session state after the turn.
#[derive(Debug, Clone)]
pub struct AskReply {
    pub message: String,
    pub session: DialogSession,
}

/// Drives the dialog against a completion provider.
pub struct RequirementsDialog {
    store: Arc<SessionStore>,
    provider: Arc<dyn CompletionProvider>,
    params: GenerationParams,
}

impl RequirementsDialog {
    pub fn new(
        store: Arc<SessionStore>,
        provider: Arc<dyn CompletionProvider>,
        params: GenerationParams,
    ) -> Self {
        Self {
            store,
            provider,
            params,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    /// Handles one user turn.
    ///
    /// A blank message is an input error and leaves the session untouched.
    /// Otherwise the user message is recorded even when the LLM call fails;
    /// the assistant reply and the requirements transition happen only on
    /// success.
    pub async fn ask(&self, user_id: &str, message: &str) -> Result<AskReply, SitesmithError> {
        let user_id = normalize_user_id(user_id);
        if message.trim().is_empty() {
            return Err(SitesmithError::Input("message is required".to_string()));
        }
        let before = self.store.get_or_create(user_id).await;

        self.store.append_message(user_id, Role::User, message).await;
        let history = self.store.history_as_string(user_id).await;

        let system = requirements_prompt(&history, &before.requirements, before.current_question);
        let request = CompletionRequest::new(Some(system), message, self.params);

        let reply = match self.provider.generate(&request).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!(user_id, error = %e, "requirements turn failed");
                return Err(e.into());
            }
        };

        self.store
            .append_message(user_id, Role::Assistant, reply.clone())
            .await;
        let session = self.store.advance(user_id, message).await;

        debug!(
            user_id,
            site_type = %session.requirements.site_type,
            target_audience = %session.requirements.target_audience,
            note = %session.requirements.note,
            "requirements updated"
        );
        info!(
            user_id,
            current_question = %session.current_question,
            is_complete = session.is_complete,
            "requirements turn completed"
        );

        Ok(AskReply {
            message: reply,
            session,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::CurrentQuestion;
    use sitesmith_core::LlmError;
    use sitesmith_test_utils::MockProvider;
    use tracing_test::traced_test;

    fn dialog(provider: Arc<MockProvider>) -> RequirementsDialog {
        RequirementsDialog::new(
            Arc::new(SessionStore::new()),
            provider,
            GenerationParams::default(),
        )
    }

    #[tokio::test]
    async fn fresh_dialog_records_site_type() {
        let provider = Arc::new(MockProvider::with_responses(vec!["Кто ваша аудитория?"]));
        let dialog = dialog(Arc::clone(&provider));

        let reply = dialog.ask("u1", "лендинг").await.unwrap();
        assert_eq!(reply.message, "Кто ваша аудитория?");
        assert_eq!(reply.session.requirements.site_type, "лендинг");
        assert_eq!(reply.session.current_question, CurrentQuestion::TargetAudience);
        assert!(!reply.session.is_complete);
        assert_eq!(reply.session.history.len(), 2);
        assert_eq!(reply.session.history[0].role, Role::User);
        assert_eq!(reply.session.history[1].role, Role::Assistant);

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].prompt, "лендинг");
        let system = calls[0].system.as_deref().unwrap();
        assert!(system.contains("Пользователь: лендинг"));
    }

    #[tokio::test]
    async fn full_dialog_completes_and_accumulates_notes() {
        let provider = Arc::new(MockProvider::with_responses(vec!["a", "b", "c", "d"]));
        let dialog = dialog(provider);

        dialog.ask("u1", "лендинг").await.unwrap();
        let reply = dialog.ask("u1", "предприниматели").await.unwrap();
        assert_eq!(reply.session.requirements.target_audience, "предприниматели");
        assert_eq!(reply.session.current_question, CurrentQuestion::Complete);
        assert!(reply.session.is_complete);

        dialog.ask("u1", "бюджет небольшой").await.unwrap();
        let reply = dialog.ask("u1", "срок - неделя").await.unwrap();
        assert_eq!(reply.session.requirements.note, "бюджет небольшой; срок - неделя");
        assert_eq!(reply.session.history.len(), 8);
    }

    #[tokio::test]
    async fn blank_message_is_rejected_before_the_llm() {
        let provider = Arc::new(MockProvider::with_responses(vec!["never sent"]));
        let dialog = dialog(Arc::clone(&provider));

        let err = dialog.ask("u1", "  \n ").await.unwrap_err();
        assert!(matches!(err, SitesmithError::Input(_)));
        assert_eq!(provider.call_count().await, 0);
        assert!(dialog.store().snapshot("u1").await.is_none());
    }

    #[tokio::test]
    #[traced_test]
    async fn failed_turn_keeps_user_message_only() {
        let provider = Arc::new(MockProvider::with_results(vec![Err(
            LlmError::EmptyCompletion,
        )]));
        let dialog = dialog(provider);

        let err = dialog.ask("u1", "лендинг").await.unwrap_err();
        assert!(matches!(err, SitesmithError::Llm(LlmError::EmptyCompletion)));

        let session = dialog.store().snapshot("u1").await.unwrap();
        assert_eq!(session.history.len(), 1);
        assert!(session.requirements.is_empty());
        assert_eq!(session.current_question, CurrentQuestion::None);
        assert!(logs_contain("requirements turn failed"));
    }
}
