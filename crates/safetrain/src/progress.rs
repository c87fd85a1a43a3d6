// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `safetrain progress` command implementation.

use safetrain_core::SafetrainError;
use safetrain_storage::Database;
use safetrain_storage::queries::{catalog, progress};

/// Show a learner's aggregate course progress and per-lesson state.
pub async fn run(db: &Database, user_id: &str, course_id: &str) -> Result<(), SafetrainError> {
    let Some(course) = catalog::get_course(db, course_id).await? else {
        println!("course {course_id} not found");
        return Ok(());
    };

    println!("{} ({} lessons)", course.name, course.total_lessons);
    match progress::get_course_progress(db, user_id, course_id).await? {
        Some(cp) => {
            println!(
                "  {}/{} lessons completed ({:.1}%) -- {}",
                cp.lessons_completed, course.total_lessons, cp.progress_percentage, cp.status
            );
            if let Some(at) = cp.completed_at {
                println!("  completed at {at}");
            }
        }
        None => println!("  not started"),
    }
    Ok(())
}
