// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types are defined in `safetrain-core::types` for use across
//! crate boundaries. This module re-exports them for convenience within the
//! storage crate.

pub use safetrain_core::types::{
    Certificate, Course, CourseProgress, CourseStatus, GamificationAccount, Lesson,
    LessonProgress, PointAward, Profile,
};
