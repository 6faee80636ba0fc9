// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory dialog sessions keyed by user id.
//!
//! One `RwLock` guards the whole map. Mutators take the write half, history
//! rendering and snapshots take the read half. The lock is never held across
//! an LLM call. Sessions are not durable: a restart discards them.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use sitesmith_core::{DialogMessage, Requirements, Role};
use tokio::sync::RwLock;

use crate::state_machine;

/// User id substituted for a blank one.
pub const DEFAULT_USER_ID: &str = "default";

/// The question the dialog is waiting on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CurrentQuestion {
    /// Nothing asked yet; the next user turn is the site type.
    #[default]
    #[serde(rename = "")]
    None,
    TargetAudience,
    Complete,
}

impl CurrentQuestion {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurrentQuestion::None => "",
            CurrentQuestion::TargetAudience => "target_audience",
            CurrentQuestion::Complete => "complete",
        }
    }
}

impl fmt::Display for CurrentQuestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Conversational state of one user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogSession {
    pub user_id: String,
    pub history: Vec<DialogMessage>,
    pub requirements: Requirements,
    pub is_complete: bool,
    pub current_question: CurrentQuestion,
}

impl DialogSession {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            history: Vec::new(),
            requirements: Requirements::default(),
            is_complete: false,
            current_question: CurrentQuestion::None,
        }
    }
}

/// Maps a blank user id to [`DEFAULT_USER_ID`].
pub fn normalize_user_id(user_id: &str) -> &str {
    if user_id.trim().is_empty() {
        DEFAULT_USER_ID
    } else {
        user_id
    }
}

/// Renders history one line per message, in append order.
pub fn render_history(history: &[DialogMessage]) -> String {
    let mut out = String::new();
    for message in history {
        let marker = match message.role {
            Role::User => "Пользователь",
            Role::Assistant => "Ассистент",
        };
        out.push_str(marker);
        out.push_str(": ");
        out.push_str(&message.content);
        out.push('\n');
    }
    out
}

/// Process-scoped store of dialog sessions.
///
/// Owned by the application state and cleared at shutdown.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, DialogSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the user's session, creating an empty one on first use.
    pub async fn get_or_create(&self, user_id: &str) -> DialogSession {
        let user_id = normalize_user_id(user_id);
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| DialogSession::new(user_id))
            .clone()
    }

    /// Appends one message. No deduplication.
    pub async fn append_message(&self, user_id: &str, role: Role, content: impl Into<String>) {
        let user_id = normalize_user_id(user_id);
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| DialogSession::new(user_id))
            .history
            .push(DialogMessage::new(role, content));
    }

    /// Serialized history of the user's session, empty when there is none.
    pub async fn history_as_string(&self, user_id: &str) -> String {
        let sessions = self.sessions.read().await;
        sessions
            .get(normalize_user_id(user_id))
            .map(|s| render_history(&s.history))
            .unwrap_or_default()
    }

    /// Applies one requirements transition and returns the post-state.
    pub async fn advance(&self, user_id: &str, user_message: &str) -> DialogSession {
        let user_id = normalize_user_id(user_id);
        let mut sessions = self.sessions.write().await;
        let session = sessions
            .entry(user_id.to_string())
            .or_insert_with(|| DialogSession::new(user_id));
        state_machine::advance(session, user_message);
        session.clone()
    }

    pub async fn snapshot(&self, user_id: &str) -> Option<DialogSession> {
        self.sessions
            .read()
            .await
            .get(normalize_user_id(user_id))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drops every session. Returns how many were held.
    pub async fn clear(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let count = sessions.len();
        sessions.clear();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn fresh_session_is_empty() {
        let store = SessionStore::new();
        let session = store.get_or_create("u1").await;
        assert_eq!(session.user_id, "u1");
        assert!(session.history.is_empty());
        assert!(session.requirements.is_empty());
        assert!(!session.is_complete);
        assert_eq!(session.current_question, CurrentQuestion::None);
    }

    #[tokio::test]
    async fn blank_user_id_maps_to_default() {
        let store = SessionStore::new();
        store.append_message("", Role::User, "hi").await;
        store.append_message("  ", Role::User, "again").await;

        let session = store.get_or_create("default").await;
        assert_eq!(session.user_id, "default");
        assert_eq!(session.history.len(), 2);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn history_string_preserves_order_and_markers() {
        let store = SessionStore::new();
        store.append_message("u1", Role::User, "лендинг").await;
        store.append_message("u1", Role::Assistant, "Для кого сайт?").await;
        store.append_message("u1", Role::User, "лендинг").await;

        assert_eq!(
            store.history_as_string("u1").await,
            "Пользователь: лендинг\nАссистент: Для кого сайт?\nПользователь: лендинг\n"
        );
        assert_eq!(store.history_as_string("nobody").await, "");
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = SessionStore::new();
        store.advance("a", "блог").await;
        store.advance("b", "магазин").await;

        assert_eq!(store.snapshot("a").await.unwrap().requirements.site_type, "блог");
        assert_eq!(store.snapshot("b").await.unwrap().requirements.site_type, "магазин");
        assert!(store.snapshot("c").await.is_none());
    }

    #[tokio::test]
    async fn concurrent_appends_are_all_kept() {
        let store = Arc::new(SessionStore::new());
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.append_message("u", Role::User, format!("m{i}")).await;
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(store.get_or_create("u").await.history.len(), 32);
    }

    #[tokio::test]
    async fn clear_drops_everything() {
        let store = SessionStore::new();
        store.get_or_create("a").await;
        store.get_or_create("b").await;
        assert_eq!(store.clear().await, 2);
        assert!(store.is_empty().await);
    }

    #[test]
    fn current_question_serializes_as_wire_strings() {
        assert_eq!(serde_json::to_value(CurrentQuestion::None).unwrap(), "");
        assert_eq!(
            serde_json::to_value(CurrentQuestion::TargetAudience).unwrap(),
            "target_audience"
        );
        assert_eq!(CurrentQuestion::Complete.to_string(), "complete");
    }
}
