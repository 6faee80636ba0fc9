// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Website generation pipeline for Sitesmith.
//!
//! [`WebsitePipeline`] drives a completion provider through analysis,
//! build and verification, then [`sanitize`]s the result. The single-shot
//! variant skips analysis and verification and uses [`extract_html`].

pub mod pipeline;
pub mod prompts;
pub mod sanitizer;

pub use pipeline::WebsitePipeline;
pub use sanitizer::{extract_html, sanitize};
