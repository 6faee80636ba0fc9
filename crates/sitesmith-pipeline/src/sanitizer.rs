// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Removes code fences and prose decoration around model-generated HTML.
//!
//! Nothing here validates markup. The output is whatever sits between the
//! decoration, trimmed.

use std::sync::LazyLock;

use regex::Regex;

static FENCE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z]*\s*\n?").unwrap());

static FENCE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n?\s*```\s*$").unwrap());

/// First ```` ```html ```` block, used by the single-shot builder.
static FENCED_HTML: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```html\s*\n?(.*?)\n?```").unwrap());

const HTML_CLOSE: &str = "</html>";

/// Strips fences and surrounding prose from `raw`.
///
/// Repeats the cleaning pass until it no longer changes the text, so
/// `sanitize(sanitize(x)) == sanitize(x)` for every input. Each pass only
/// removes characters, which bounds the loop by the input length.
pub fn sanitize(raw: &str) -> String {
    let mut current = clean_pass(raw);
    loop {
        let next = clean_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn clean_pass(raw: &str) -> String {
    let text = raw.trim();
    let text = FENCE_OPEN.replace(text, "");
    let text = FENCE_CLOSE.replace(&text, "");
    let mut text: &str = &text;

    // ASCII lowercasing keeps byte offsets aligned with the original.
    let lower = text.to_ascii_lowercase();
    let start = [lower.find("<!doctype"), lower.find("<html")]
        .into_iter()
        .flatten()
        .min();
    if let Some(start) = start.filter(|&i| i > 0) {
        text = &text[start..];
    }

    let lower = text.to_ascii_lowercase();
    if let Some(end) = lower.rfind(HTML_CLOSE) {
        text = &text[..end + HTML_CLOSE.len()];
    }

    text.trim().to_string()
}

/// Returns the trimmed body of the first ```` ```html ```` block, or `raw`
/// unchanged when there is none.
pub fn extract_html(raw: &str) -> String {
    match FENCED_HTML.captures(raw).and_then(|c| c.get(1)) {
        Some(body) => body.as_str().trim().to_string(),
        None => raw.to_string(),
    }
}
