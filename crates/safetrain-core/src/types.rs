// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the Safetrain workspace.
//!
//! All timestamps are ISO-8601 UTC strings (`%Y-%m-%dT%H:%M:%S%.3fZ`),
//! matching what the storage layer writes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Canonical storage timestamp format (ISO-8601 UTC with milliseconds).
pub const ISO_MILLIS: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

/// Current UTC time in the canonical storage timestamp format.
pub fn now_iso() -> String {
    chrono::Utc::now().format(ISO_MILLIS).to_string()
}

/// Level is a pure function of points: 100 points per level, starting at 1.
pub fn level_for_points(points: u32) -> u32 {
    points / 100 + 1
}

/// The activity that triggered a point award.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActivityType {
    LessonCompleted,
    CourseCompleted,
    ChecklistCompleted,
    VideoLiked,
}

/// Aggregate course status for one learner.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    NotStarted,
    InProgress,
    Completed,
}

/// Per-(user, lesson) viewing progress. Unique per (user_id, lesson_id).
///
/// Invariants: `watched_percentage` never decreases across persisted updates;
/// `completed == true` implies the watch threshold was crossed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub user_id: String,
    pub lesson_id: String,
    pub watched_percentage: u8,
    pub completed: bool,
    pub last_watched_at: String,
    pub completed_at: Option<String>,
}

/// Per-(user, course) aggregate progress. Unique per (user_id, course_id).
///
/// `status == Completed` iff `lessons_completed` equals the course's total
/// lesson count, and is monotonic -- once completed it never regresses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CourseProgress {
    pub user_id: String,
    pub course_id: String,
    pub lessons_completed: u32,
    pub progress_percentage: f64,
    pub status: CourseStatus,
    pub completed_at: Option<String>,
}

/// Per-learner gamification state. Created lazily on first award.
///
/// Points only increase; `level` is always recomputed from points via
/// [`level_for_points`], never incremented independently.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamificationAccount {
    pub user_id: String,
    pub points: u32,
    pub level: u32,
    pub badges: BTreeSet<String>,
    pub achievements: BTreeSet<String>,
    pub streak_days: u32,
}

impl GamificationAccount {
    /// A fresh account with zero points at level 1.
    pub fn new(user_id: String) -> Self {
        Self {
            user_id,
            points: 0,
            level: 1,
            badges: BTreeSet::new(),
            achievements: BTreeSet::new(),
            streak_days: 0,
        }
    }
}

/// One point award. At most one per (user_id, activity_type, subject_id) --
/// the idempotency spine that prevents double-crediting from retries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointAward {
    pub user_id: String,
    pub activity_type: ActivityType,
    pub subject_id: String,
    pub points: u32,
    pub created_at: String,
}

/// Immutable proof of course completion. At most one per (user_id, course_id).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub certificate_number: String,
    pub user_id: String,
    pub course_id: String,
    pub issued_date: String,
}

/// Course metadata the engine reads: display name and total lesson count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub total_lessons: u32,
}

/// Lesson metadata. `course_id` is nullable -- orphan lessons exist and
/// must not block lesson-scoped progress.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: String,
    pub course_id: Option<String>,
    pub title: String,
}

/// Learner profile. The display name is required for certificate issuance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub full_name: Option<String>,
}
