// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `safetrain complete` command implementation.
//!
//! Administrative completion override: marks a lesson complete for a learner
//! through the same resolver the portal uses, so points, course recompute,
//! badges, and certificate issuance all apply exactly as they would from a
//! quiz pass.

use std::sync::Arc;

use safetrain_config::SafetrainConfig;
use safetrain_core::SafetrainError;
use safetrain_engine::{CertificateIssuer, CompletionResolver, GamificationLedger};
use safetrain_storage::Database;

pub async fn run(
    db: Arc<Database>,
    config: &SafetrainConfig,
    user_id: &str,
    lesson_id: &str,
) -> Result<(), SafetrainError> {
    let resolver = CompletionResolver::new(
        db.clone(),
        config.points.clone(),
        GamificationLedger::new(db.clone()),
        CertificateIssuer::new(db.clone(), config.portal.name.clone()),
    );

    let completion = resolver.complete_lesson(user_id, lesson_id).await?;
    if completion.newly_completed {
        println!("lesson {lesson_id} completed for {user_id}");
    } else {
        println!("lesson {lesson_id} was already completed for {user_id}");
    }

    if let Some(course) = &completion.course {
        println!(
            "course {}: {} lessons done ({:.1}%) -- {}",
            course.course_id, course.lessons_completed, course.progress_percentage, course.status
        );
    }
    if let Some(issued) = &completion.certificate {
        println!("certificate issued: {}", issued.record.certificate_number);
    }
    Ok(())
}
