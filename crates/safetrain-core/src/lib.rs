// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Safetrain credentialing engine.
//!
//! This crate provides the error taxonomy and domain types used throughout
//! the Safetrain workspace. It performs no I/O.

pub mod error;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SafetrainError;
pub use types::{
    ActivityType, Certificate, Course, CourseProgress, CourseStatus, GamificationAccount,
    ISO_MILLIS, Lesson, LessonProgress, PointAward, Profile, level_for_points, now_iso,
};
