// SPDX-FileCopyrightText: 2026 Sitesmith Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod chats;
pub mod images;
pub mod messages;
pub mod projects;
pub mod requests;
