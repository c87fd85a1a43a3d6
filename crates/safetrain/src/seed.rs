// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `safetrain seed` command implementation.
//!
//! Seeds a demo course with three lessons and a demo learner profile so the
//! other commands have something to show against a fresh database.

use safetrain_core::{Course, Lesson, Profile, SafetrainError};
use safetrain_storage::Database;
use safetrain_storage::queries::{catalog, profiles};
use tracing::info;

pub async fn run(db: &Database) -> Result<(), SafetrainError> {
    let course_id = uuid::Uuid::new_v4().to_string();
    catalog::create_course(
        db,
        &Course {
            id: course_id.clone(),
            name: "Working at Heights".into(),
            total_lessons: 3,
        },
    )
    .await?;

    for title in ["Harness basics", "Anchor points", "Rescue planning"] {
        catalog::create_lesson(
            db,
            &Lesson {
                id: uuid::Uuid::new_v4().to_string(),
                course_id: Some(course_id.clone()),
                title: title.into(),
            },
        )
        .await?;
    }

    let user_id = uuid::Uuid::new_v4().to_string();
    profiles::upsert_profile(
        db,
        &Profile {
            id: user_id.clone(),
            full_name: Some("Demo Learner".into()),
        },
    )
    .await?;

    info!(course_id, user_id, "demo data seeded");
    println!("seeded course {course_id} with 3 lessons");
    println!("seeded learner {user_id}");
    Ok(())
}
