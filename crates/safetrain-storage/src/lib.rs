// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence layer for the Safetrain credentialing engine.
//!
//! Provides WAL-mode SQLite storage with embedded migrations, a single-writer
//! concurrency model via `tokio-rusqlite`, and typed query operations for
//! learner profiles, the course catalog, lesson/course progress, the
//! gamification ledger, and certificates.
//!
//! Every at-most-once invariant (point awards, certificates, completion)
//! is backed by a unique constraint in the schema; the corresponding write
//! paths use conflict-aware inserts and report whether a row actually
//! changed, so callers get idempotence by construction.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
