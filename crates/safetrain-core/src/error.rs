// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Safetrain credentialing engine.

use thiserror::Error;

/// The primary error type used across all Safetrain crates.
#[derive(Debug, Error)]
pub enum SafetrainError {
    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Playback telemetry was unusable (zero or negative duration).
    /// Non-fatal: the caller drops the sample and continues.
    #[error("invalid media state: duration {duration_seconds}s")]
    InvalidMediaState { duration_seconds: f64 },

    /// A quiz answer arrived out of order or outside the Active state.
    /// Non-fatal: the gate rejects the answer and keeps its state.
    #[error("quiz sequence violation: expected question {expected}, got {got}")]
    SequenceViolation { expected: usize, got: usize },

    /// A certificate for this (user, course) pair already exists.
    /// Expected steady-state condition, surfaced as informational.
    #[error("certificate already issued for user {user_id} on course {course_id}")]
    CertificateAlreadyExists { user_id: String, course_id: String },

    /// The learner's profile has no resolvable display name.
    /// Fatal to certificate issuance only.
    #[error("profile name missing for user {user_id} -- cannot issue certificate")]
    MissingProfileData { user_id: String },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SafetrainError {
    /// Wrap any error as a storage failure.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SafetrainError::Storage {
            source: Box::new(source),
        }
    }
}
