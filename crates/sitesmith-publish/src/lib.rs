// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Publication adapters for Sitesmith.
//!
//! Two ways to ship an artifact out of the local `result/` directory:
//! an HTTP upload to the object-storage deploy sidecar, and a commit pushed
//! by a JSON-RPC sidecar spoken to over stdio.

pub mod object_storage;
pub mod repository;

pub use object_storage::HttpObjectStoragePublisher;
pub use repository::StdioRepositoryPublisher;
