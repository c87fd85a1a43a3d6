// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Completion resolver: lesson completion, course recompute, side effects.
//!
//! Invoked from the quiz gate's `Passed` transition. Lesson completion is
//! persisted first; course recompute, point awards, and certificate
//! issuance are independent side effects that run on every call, not just
//! the first -- each is idempotent, so a retry after a crash or a failed
//! step backfills whatever is still missing without double-crediting, and
//! none of them rolls back a prior step. A course-scoped failure (missing
//! course link, zero lesson count, absent profile name) never blocks
//! lesson-scoped progress.

use std::sync::Arc;

use safetrain_config::model::PointsConfig;
use safetrain_core::{
    ActivityType, CourseProgress, CourseStatus, LessonProgress, SafetrainError,
};
use safetrain_storage::Database;
use safetrain_storage::queries::{catalog, profiles, progress};
use tracing::{info, warn};

use crate::certificate::{CertificateIssuer, IssuedCertificate};
use crate::ledger::GamificationLedger;

/// Result of resolving a lesson completion.
#[derive(Debug, Clone)]
pub struct LessonCompletion {
    pub lesson: LessonProgress,
    /// Course aggregate after recompute; `None` when the lesson has no
    /// usable course link.
    pub course: Option<CourseProgress>,
    /// Whether this call performed the first-time completion.
    pub newly_completed: bool,
    /// Certificate issued by this call, when the course just completed.
    pub certificate: Option<IssuedCertificate>,
}

/// Resolves quiz passes into persisted completion state and side effects.
pub struct CompletionResolver {
    db: Arc<Database>,
    points: PointsConfig,
    ledger: GamificationLedger,
    issuer: CertificateIssuer,
}

impl CompletionResolver {
    pub fn new(
        db: Arc<Database>,
        points: PointsConfig,
        ledger: GamificationLedger,
        issuer: CertificateIssuer,
    ) -> Self {
        Self {
            db,
            points,
            ledger,
            issuer,
        }
    }

    /// Mark a lesson complete for a learner and fan out the side effects.
    ///
    /// The side effects are not gated on the first-completion edge: the
    /// point awards are keyed no-ops on duplicates, the course aggregate is
    /// recomputed from the completed lesson rows, and issuance tolerates an
    /// existing certificate. Calling this again -- a learner retrying, or a
    /// retry after an earlier call died partway through -- converges on the
    /// same state and backfills any side effect that is still missing.
    pub async fn complete_lesson(
        &self,
        user_id: &str,
        lesson_id: &str,
    ) -> Result<LessonCompletion, SafetrainError> {
        let (lesson, newly_completed) =
            progress::mark_lesson_completed(&self.db, user_id, lesson_id).await?;
        if newly_completed {
            info!(user_id, lesson_id, "lesson completed");
        }

        self.ledger
            .award(
                user_id,
                ActivityType::LessonCompleted,
                self.points.lesson_completed,
                lesson_id,
            )
            .await?;

        let Some(course) = self.course_for_lesson(lesson_id).await? else {
            return Ok(LessonCompletion {
                lesson,
                course: None,
                newly_completed,
                certificate: None,
            });
        };

        let course_progress = progress::recompute_course_progress(
            &self.db,
            user_id,
            &course.id,
            course.total_lessons,
        )
        .await?;

        let mut certificate = None;
        if course_progress.status == CourseStatus::Completed {
            self.ledger
                .award(
                    user_id,
                    ActivityType::CourseCompleted,
                    self.points.course_completed,
                    &course.id,
                )
                .await?;
            certificate = self.try_issue_certificate(user_id, &course).await?;
        }

        Ok(LessonCompletion {
            lesson,
            course: Some(course_progress),
            newly_completed,
            certificate,
        })
    }

    /// Resolve a lesson's course, treating a missing link or a zero lesson
    /// count as "no course": course-scoped work is skipped, lesson-scoped
    /// progress is not.
    async fn course_for_lesson(
        &self,
        lesson_id: &str,
    ) -> Result<Option<safetrain_core::Course>, SafetrainError> {
        let Some(lesson) = catalog::get_lesson(&self.db, lesson_id).await? else {
            warn!(lesson_id, "lesson not in catalog; skipping course recompute");
            return Ok(None);
        };
        let Some(course_id) = lesson.course_id else {
            return Ok(None);
        };
        match catalog::get_course(&self.db, &course_id).await? {
            Some(course) if course.total_lessons > 0 => Ok(Some(course)),
            Some(course) => {
                warn!(
                    course_id = %course.id,
                    "course has zero total lessons; skipping course recompute"
                );
                Ok(None)
            }
            None => {
                warn!(course_id, "course missing; skipping course recompute");
                Ok(None)
            }
        }
    }

    /// Invoke the certificate issuer, tolerating its two expected non-storage
    /// failures: an existing certificate is informational, and a missing
    /// profile name must not block completion (issuance stays retryable once
    /// the profile is filled in).
    async fn try_issue_certificate(
        &self,
        user_id: &str,
        course: &safetrain_core::Course,
    ) -> Result<Option<IssuedCertificate>, SafetrainError> {
        let full_name = profiles::get_profile(&self.db, user_id)
            .await?
            .and_then(|p| p.full_name)
            .unwrap_or_default();

        match self
            .issuer
            .issue(user_id, &course.id, &full_name, &course.name)
            .await
        {
            Ok(issued) => Ok(Some(issued)),
            Err(SafetrainError::CertificateAlreadyExists { .. }) => {
                info!(user_id, course_id = %course.id, "certificate already issued");
                Ok(None)
            }
            Err(SafetrainError::MissingProfileData { .. }) => {
                warn!(
                    user_id,
                    course_id = %course.id,
                    "profile name missing -- certificate not issued"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use safetrain_core::{Course, Lesson, Profile};
    use safetrain_storage::queries::gamification;

    use super::*;

    async fn setup() -> (Arc<Database>, CompletionResolver, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Arc::new(Database::open(db_path.to_str().unwrap()).await.unwrap());
        let resolver = CompletionResolver::new(
            db.clone(),
            PointsConfig::default(),
            GamificationLedger::new(db.clone()),
            CertificateIssuer::new(db.clone(), "Safetrain".into()),
        );
        (db, resolver, dir)
    }

    async fn seed_course(db: &Database, course_id: &str, lessons: &[&str]) {
        catalog::create_course(
            db,
            &Course {
                id: course_id.to_string(),
                name: "Working at Heights".into(),
                total_lessons: lessons.len() as u32,
            },
        )
        .await
        .unwrap();
        for lesson_id in lessons {
            catalog::create_lesson(
                db,
                &Lesson {
                    id: lesson_id.to_string(),
                    course_id: Some(course_id.to_string()),
                    title: format!("Lesson {lesson_id}"),
                },
            )
            .await
            .unwrap();
        }
    }

    async fn seed_profile(db: &Database, user_id: &str, name: Option<&str>) {
        profiles::upsert_profile(
            db,
            &Profile {
                id: user_id.to_string(),
                full_name: name.map(str::to_string),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn double_completion_is_idempotent() {
        let (db, resolver, _dir) = setup().await;
        seed_course(&db, "c-1", &["l-1", "l-2", "l-3"]).await;

        let first = resolver.complete_lesson("u-1", "l-1").await.unwrap();
        assert!(first.newly_completed);
        assert_eq!(first.lesson.watched_percentage, 100);
        let course_after_first = first.course.clone().unwrap();

        let second = resolver.complete_lesson("u-1", "l-1").await.unwrap();
        assert!(!second.newly_completed);
        assert_eq!(second.lesson.completed_at, first.lesson.completed_at);
        assert_eq!(second.course.unwrap(), course_after_first);

        // Points credited exactly once.
        let account = gamification::get_account(&db, "u-1").await.unwrap().unwrap();
        assert_eq!(account.points, 10);
    }

    #[tokio::test]
    async fn course_progresses_then_completes_with_certificate() {
        let (db, resolver, _dir) = setup().await;
        seed_course(&db, "c-1", &["l-1", "l-2", "l-3"]).await;
        seed_profile(&db, "u-ab12", Some("Maria Silva")).await;

        let one = resolver.complete_lesson("u-ab12", "l-1").await.unwrap();
        let course = one.course.unwrap();
        assert_eq!(course.status, CourseStatus::InProgress);
        assert!((course.progress_percentage - 33.33).abs() < 0.1);
        assert!(one.certificate.is_none());

        let two = resolver.complete_lesson("u-ab12", "l-2").await.unwrap();
        let course = two.course.unwrap();
        assert_eq!(course.lessons_completed, 2);
        assert!((course.progress_percentage - 66.67).abs() < 0.1);

        let three = resolver.complete_lesson("u-ab12", "l-3").await.unwrap();
        let course = three.course.unwrap();
        assert_eq!(course.status, CourseStatus::Completed);
        assert_eq!(course.progress_percentage, 100.0);

        let issued = three.certificate.unwrap();
        assert!(issued.record.certificate_number.ends_with("-ab12"));
        assert!(issued.artifact_html.contains("Maria Silva"));

        // 3 lessons * 10 + course 50.
        let account = gamification::get_account(&db, "u-ab12").await.unwrap().unwrap();
        assert_eq!(account.points, 80);
        assert!(account.badges.contains(crate::ledger::EXPERT_BADGE));
    }

    #[tokio::test]
    async fn orphan_lesson_still_completes_and_credits() {
        let (db, resolver, _dir) = setup().await;
        catalog::create_lesson(
            &db,
            &Lesson {
                id: "l-solo".into(),
                course_id: None,
                title: "Toolbox talk".into(),
            },
        )
        .await
        .unwrap();

        let done = resolver.complete_lesson("u-1", "l-solo").await.unwrap();
        assert!(done.newly_completed);
        assert!(done.course.is_none());
        assert!(done.certificate.is_none());

        let account = gamification::get_account(&db, "u-1").await.unwrap().unwrap();
        assert_eq!(account.points, 10);
    }

    #[tokio::test]
    async fn missing_profile_name_skips_certificate_but_not_completion() {
        let (db, resolver, _dir) = setup().await;
        seed_course(&db, "c-1", &["l-1"]).await;
        seed_profile(&db, "u-1", None).await;

        let done = resolver.complete_lesson("u-1", "l-1").await.unwrap();
        assert!(done.newly_completed);
        assert_eq!(done.course.unwrap().status, CourseStatus::Completed);
        assert!(done.certificate.is_none());

        // Course points still credited.
        let account = gamification::get_account(&db, "u-1").await.unwrap().unwrap();
        assert_eq!(account.points, 60);
    }

    #[tokio::test]
    async fn retry_after_partial_failure_backfills_side_effects() {
        let (db, resolver, _dir) = setup().await;
        seed_course(&db, "c-1", &["l-1"]).await;
        seed_profile(&db, "u-ab12", Some("Maria Silva")).await;

        // Lesson row persisted, but the process died before any side effect
        // ran: no points, no course aggregate, no certificate.
        progress::mark_lesson_completed(&db, "u-ab12", "l-1")
            .await
            .unwrap();
        assert!(gamification::get_account(&db, "u-ab12").await.unwrap().is_none());

        // The retry is not the first completion, yet it must still credit
        // points, rebuild the course aggregate, and issue the certificate.
        let done = resolver.complete_lesson("u-ab12", "l-1").await.unwrap();
        assert!(!done.newly_completed);
        let course = done.course.unwrap();
        assert_eq!(course.status, CourseStatus::Completed);
        assert!(done.certificate.is_some());

        let account = gamification::get_account(&db, "u-ab12").await.unwrap().unwrap();
        assert_eq!(account.points, 60);
    }

    #[tokio::test]
    async fn retried_course_completion_does_not_reissue_certificate() {
        let (db, resolver, _dir) = setup().await;
        seed_course(&db, "c-1", &["l-1"]).await;
        seed_profile(&db, "u-ab12", Some("Maria Silva")).await;

        let done = resolver.complete_lesson("u-ab12", "l-1").await.unwrap();
        assert!(done.certificate.is_some());

        // A retried completion call is a no-op end to end.
        let again = resolver.complete_lesson("u-ab12", "l-1").await.unwrap();
        assert!(!again.newly_completed);
        assert!(again.certificate.is_none());

        let account = gamification::get_account(&db, "u-ab12").await.unwrap().unwrap();
        assert_eq!(account.points, 60);
    }

    #[tokio::test]
    async fn uncatalogued_lesson_completes_without_course_work() {
        let (db, resolver, _dir) = setup().await;

        let done = resolver.complete_lesson("u-1", "l-ghost").await.unwrap();
        assert!(done.newly_completed);
        assert!(done.course.is_none());
    }
}
