// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! System prompt for the requirements-gathering assistant.

use sitesmith_core::Requirements;

use crate::session::CurrentQuestion;

const BASE_PROMPT: &str = "Ты консультант веб-студии и собираешь требования к будущему сайту. \
Веди диалог на русском языке, коротко и дружелюбно. Задавай ровно один вопрос за раз. \
Не пиши HTML и не предлагай готовый код.";

/// Builds the system prompt for the turn currently being answered.
///
/// `requirements` and `current_question` describe the state before the
/// incoming user message is applied; `history` already contains it.
pub fn requirements_prompt(
    history: &str,
    requirements: &Requirements,
    current_question: CurrentQuestion,
) -> String {
    let mut prompt = String::from(BASE_PROMPT);

    prompt.push_str("\n\nИстория диалога:\n");
    if history.trim().is_empty() {
        prompt.push_str("(пусто)\n");
    } else {
        prompt.push_str(history);
    }

    prompt.push_str("\nУже известно:\n");
    push_field(&mut prompt, "Тип сайта", &requirements.site_type);
    push_field(&mut prompt, "Целевая аудитория", &requirements.target_audience);
    push_field(&mut prompt, "Дополнительно", &requirements.note);

    prompt.push_str("\nЗадача: ");
    prompt.push_str(match current_question {
        CurrentQuestion::None if requirements.site_type.is_empty() => {
            "последнее сообщение пользователя описывает тип сайта. \
Подтверди, что понял, и спроси, кто целевая аудитория сайта."
        }
        CurrentQuestion::TargetAudience if requirements.target_audience.is_empty() => {
            "последнее сообщение пользователя описывает целевую аудиторию. \
Кратко перечисли собранные требования и спроси, есть ли пожелания по срокам, бюджету или оформлению."
        }
        _ => {
            "основные требования собраны. Учти последнее сообщение как дополнительное пожелание \
и сообщи, что можно приступать к созданию сайта."
        }
    });

    prompt
}

fn push_field(prompt: &mut String, label: &str, value: &str) {
    prompt.push_str("- ");
    prompt.push_str(label);
    prompt.push_str(": ");
    prompt.push_str(if value.is_empty() { "не указано" } else { value });
    prompt.push('\n');
}
