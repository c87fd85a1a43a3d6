// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Safetrain credentialing engine.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use safetrain_core::ActivityType;
use serde::{Deserialize, Serialize};

/// Top-level Safetrain configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable
/// overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SafetrainConfig {
    /// Portal identity and logging settings.
    #[serde(default)]
    pub portal: PortalConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Watch-progress policy settings.
    #[serde(default)]
    pub progress: ProgressConfig,

    /// Point values awarded per qualifying activity.
    #[serde(default)]
    pub points: PointsConfig,
}

/// Portal identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PortalConfig {
    /// Display name of the portal (appears on certificates).
    #[serde(default = "default_portal_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            name: default_portal_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_portal_name() -> String {
    "Safetrain".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "safetrain.db".to_string()
}

/// Watch-progress policy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProgressConfig {
    /// Watch percentage at which the comprehension quiz unlocks.
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: u8,

    /// Persist progress only at multiples of this percentage. Throttling
    /// policy, not a correctness requirement -- session exit flushes the
    /// true latest value regardless.
    #[serde(default = "default_sampling_granularity")]
    pub sampling_granularity: u8,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            completion_threshold: default_completion_threshold(),
            sampling_granularity: default_sampling_granularity(),
        }
    }
}

fn default_completion_threshold() -> u8 {
    90
}

fn default_sampling_granularity() -> u8 {
    5
}

/// Point values awarded per qualifying activity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PointsConfig {
    /// Points for completing a lesson.
    #[serde(default = "default_lesson_points")]
    pub lesson_completed: u32,

    /// Points for completing every lesson in a course.
    #[serde(default = "default_course_points")]
    pub course_completed: u32,

    /// Points for completing a safety checklist.
    #[serde(default = "default_checklist_points")]
    pub checklist_completed: u32,

    /// Points for liking a short video.
    #[serde(default = "default_video_like_points")]
    pub video_liked: u32,
}

impl PointsConfig {
    /// Look up the configured point value for an activity.
    pub fn points_for(&self, activity: ActivityType) -> u32 {
        match activity {
            ActivityType::LessonCompleted => self.lesson_completed,
            ActivityType::CourseCompleted => self.course_completed,
            ActivityType::ChecklistCompleted => self.checklist_completed,
            ActivityType::VideoLiked => self.video_liked,
        }
    }
}

impl Default for PointsConfig {
    fn default() -> Self {
        Self {
            lesson_completed: default_lesson_points(),
            course_completed: default_course_points(),
            checklist_completed: default_checklist_points(),
            video_liked: default_video_like_points(),
        }
    }
}

fn default_lesson_points() -> u32 {
    10
}

fn default_course_points() -> u32 {
    50
}

fn default_checklist_points() -> u32 {
    15
}

fn default_video_like_points() -> u32 {
    2
}
