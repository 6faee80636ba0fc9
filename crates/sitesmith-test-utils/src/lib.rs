// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Sitesmith integration tests.
//!
//! Provides mock adapters and a storage harness for fast, deterministic,
//! CI-runnable tests without external services.
//!
//! # Components
//!
//! - [`MockProvider`] - Scripted completion provider that records every call
//! - [`MockObjectStorage`] / [`MockRepository`] - Recording publication stand-ins
//! - [`TestHarness`] - Temp database plus artifact store

pub mod harness;
pub mod mock_provider;
pub mod mock_publisher;

pub use harness::TestHarness;
pub use mock_provider::MockProvider;
pub use mock_publisher::{MockObjectStorage, MockRepository};
