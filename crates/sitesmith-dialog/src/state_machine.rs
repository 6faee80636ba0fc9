// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Requirements transition function.
//!
//! Two fixed questions: site type, then target audience. Every user turn
//! after that is appended to the free-form note. User text is stored
//! verbatim; nothing is parsed. The note has no length bound.

use crate::session::{CurrentQuestion, DialogSession};

/// Separator between accumulated notes.
pub const NOTE_SEPARATOR: &str = "; ";

/// Applies one user turn to the session.
pub fn advance(session: &mut DialogSession, user_message: &str) {
    let req = &mut session.requirements;

    if req.site_type.is_empty() && session.current_question == CurrentQuestion::None {
        req.site_type = user_message.to_string();
        session.current_question = CurrentQuestion::TargetAudience;
        return;
    }

    if req.target_audience.is_empty() && session.current_question == CurrentQuestion::TargetAudience
    {
        req.target_audience = user_message.to_string();
        session.current_question = CurrentQuestion::Complete;
        session.is_complete = true;
        return;
    }

    if session.is_complete {
        if req.note.is_empty() {
            req.note = user_message.to_string();
        } else {
            req.note.push_str(NOTE_SEPARATOR);
            req.note.push_str(user_message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_turn_is_site_type() {
        let mut s = DialogSession::new("u1");
        advance(&mut s, "лендинг");
        assert_eq!(s.requirements.site_type, "лендинг");
        assert_eq!(s.current_question, CurrentQuestion::TargetAudience);
        assert!(!s.is_complete);
    }

    #[test]
    fn second_turn_completes() {
        let mut s = DialogSession::new("u1");
        advance(&mut s, "лендинг");
        advance(&mut s, "предприниматели");
        assert_eq!(s.requirements.target_audience, "предприниматели");
        assert_eq!(s.current_question, CurrentQuestion::Complete);
        assert!(s.is_complete);
    }

    #[test]
    fn later_turns_accumulate_notes() {
        let mut s = DialogSession::new("u1");
        for turn in ["лендинг", "предприниматели", "бюджет небольшой", "срок - неделя"] {
            advance(&mut s, turn);
        }
        assert_eq!(s.requirements.note, "бюджет небольшой; срок - неделя");
        assert_eq!(s.requirements.site_type, "лендинг");
    }

    #[test]
    fn empty_first_turn_is_taken_verbatim() {
        let mut s = DialogSession::new("u1");
        advance(&mut s, "");
        assert_eq!(s.requirements.site_type, "");
        assert_eq!(s.current_question, CurrentQuestion::TargetAudience);
    }

    fn progress(s: &DialogSession) -> (bool, bool, bool) {
        (
            !s.requirements.site_type.is_empty(),
            !s.requirements.target_audience.is_empty(),
            s.is_complete,
        )
    }

    proptest! {
        #[test]
        fn progress_never_regresses(turns in proptest::collection::vec(".{0,12}", 0..10)) {
            let mut s = DialogSession::new("p");
            let mut prev = progress(&s);
            let mut prev_question = s.current_question;
            for turn in &turns {
                advance(&mut s, turn);
                let next = progress(&s);
                prop_assert!(next.0 >= prev.0 && next.1 >= prev.1 && next.2 >= prev.2);
                prop_assert!(s.current_question >= prev_question);
                prev = next;
                prev_question = s.current_question;
            }
        }

        #[test]
        fn notes_only_grow_after_completion(turns in proptest::collection::vec("[a-z]{1,8}", 3..8)) {
            let mut s = DialogSession::new("p");
            advance(&mut s, &turns[0]);
            advance(&mut s, &turns[1]);
            let mut prev_len = s.requirements.note.len();
            for turn in &turns[2..] {
                advance(&mut s, turn);
                prop_assert!(s.requirements.note.len() > prev_len);
                prop_assert!(s.requirements.note.ends_with(turn.as_str()));
                prev_len = s.requirements.note.len();
            }
        }
    }
}
