// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requirements-gathering dialog for the Sitesmith website builder.
//!
//! - [`SessionStore`]: per-user sessions behind one lock
//! - [`advance`]: the two-question requirements state machine
//! - [`requirements_prompt`]: system prompt for the next assistant turn
//! - [`RequirementsDialog`]: a full `/ask` turn against a completion provider

pub mod prompt;
pub mod service;
pub mod session;
pub mod state_machine;

pub use prompt::requirements_prompt;
pub use service::{AskReply, RequirementsDialog};
pub use session::{
    normalize_user_id, render_history, CurrentQuestion, DialogSession, SessionStore,
    DEFAULT_USER_ID,
};
pub use state_machine::advance;
