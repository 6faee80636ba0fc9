// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Stage prompts. Plain data; the pipeline decides which one goes where.

use sitesmith_core::Requirements;

/// S1: turn the request into a development plan. No markup.
pub const ANALYST_PROMPT: &str = "Ты - системный аналитик веб-студии. Изучи запрос пользователя и составь план разработки одностраничного сайта.

Определи и опиши:
1. Тип сайта и его назначение
2. Список секций сверху вниз с кратким содержанием каждой
3. Цветовую схему (основной, дополнительный и акцентный цвета)
4. Структуру и расположение блоков
5. Ограничения и особые пожелания пользователя

Отвечай структурированным текстом. НЕ пиши HTML, CSS или любой другой код.";

/// S2: produce the document from request plus plan.
pub const DEVELOPER_PROMPT: &str = "Ты - веб-разработчик. Создай красивый сайт-одностраничник по запросу пользователя и плану разработки.

ТРЕБОВАНИЯ:
1. Верни полный HTML-документ в одном файле: DOCTYPE, head, body
2. Все стили размещай во встроенном теге <style> внутри <head>
3. Не используй изображения: обозначай блоки, где должны быть картинки, цветными областями
4. Используй flexbox или grid и адаптивную вёрстку
5. Добавь мета-тег viewport и осмысленный title

Никаких пояснений, комментариев и markdown-разметки до или после кода. Только HTML.";

/// S3: review the draft against the plan and return the corrected document.
pub const QA_PROMPT: &str = "Ты - QA-инженер и опытный верстальщик. Тебе дан план разработки и HTML-код сайта.

Проверь:
1. Соответствует ли код плану: все ли секции, цвета и блоки на месте
2. Валидность HTML: закрытые теги, корректная вложенность
3. CSS: адаптивность, отступы, читаемость
4. Семантику: header, main, section, footer

Исправь найденные проблемы и верни ТОЛЬКО исправленный HTML-код.
Ответ должен начинаться с <!DOCTYPE html> и заканчиваться </html>. Никакого текста до или после.";

/// Single-shot legacy builder: request in, fenced HTML out.
pub const SINGLE_SHOT_PROMPT: &str = "ты - web-разработчик. выдели из запроса пользователя требования к веб-сайту, остальное игнорируй.
нужно сделать красивый сайт-одностраничник.
в ответе верни только html+css в одном файле.
в верстке не используй картинки, обозначай блоки цветами.
ВАЖНО: возвращай валидный html, готовый к запуску в браузере, без лишних пояснений.";

/// Appends collected requirements to a system prompt. No-op when empty.
pub fn with_requirements(system: &str, requirements: &Requirements) -> String {
    if requirements.is_empty() {
        return system.to_string();
    }

    let mut prompt = format!("{system}\n\nТребования, собранные в диалоге с пользователем:\n");
    for (label, value) in [
        ("Тип сайта", &requirements.site_type),
        ("Целевая аудитория", &requirements.target_audience),
        ("Дополнительно", &requirements.note),
    ] {
        if !value.is_empty() {
            prompt.push_str(&format!("- {label}: {value}\n"));
        }
    }
    prompt
}

/// User prompt of S2.
pub fn build_message(user_message: &str, plan: &str) -> String {
    format!(
        "Исходный запрос пользователя: {user_message}\n\nАнализ и план разработки:\n{plan}\n\nТеперь создай HTML-код сайта согласно этому плану."
    )
}

/// User prompt of S3.
pub fn verify_message(plan: &str, html: &str) -> String {
    format!(
        "Исходный план:\n{plan}\n\nСгенерированный HTML:\n{html}\n\nПроверь соответствие плану и улучши код."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_requirements_leave_prompt_alone() {
        assert_eq!(
            with_requirements(ANALYST_PROMPT, &Requirements::default()),
            ANALYST_PROMPT
        );
    }

    #[test]
    fn only_known_fields_are_listed() {
        let req = Requirements {
            site_type: "лендинг".into(),
            target_audience: String::new(),
            note: "тёмная тема".into(),
        };
        let prompt = with_requirements("SYS", &req);
        assert!(prompt.starts_with("SYS\n\n"));
        assert!(prompt.contains("- Тип сайта: лендинг\n"));
        assert!(prompt.contains("- Дополнительно: тёмная тема\n"));
        assert!(!prompt.contains("Целевая аудитория"));
    }

    #[test]
    fn stage_messages_embed_inputs() {
        let build = build_message("сайт кофейни", "PLAN");
        assert!(build.starts_with("Исходный запрос пользователя: сайт кофейни"));
        assert!(build.contains("Анализ и план разработки:\nPLAN"));

        let verify = verify_message("PLAN", "<html></html>");
        assert!(verify.contains("Исходный план:\nPLAN"));
        assert!(verify.contains("Сгенерированный HTML:\n<html></html>"));
    }
}
