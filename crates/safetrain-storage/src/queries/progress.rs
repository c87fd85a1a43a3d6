// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Lesson and course progress writes.
//!
//! The lesson upsert enforces monotonic watch percentage in SQL, so a stale
//! or out-of-order sample can never lower a persisted value. Completion is a
//! conflict-aware insert guarded on `completed = 0`; the changed-row count
//! tells the caller whether this invocation was the first completion. The
//! course aggregate is always recomputed from the completed lesson rows,
//! never incremented, so recomputing is safe to repeat.

use rusqlite::params;
use safetrain_core::{CourseStatus, SafetrainError, now_iso};

use crate::database::Database;
use crate::models::{CourseProgress, LessonProgress};

fn read_lesson_progress(
    conn: &rusqlite::Connection,
    user_id: &str,
    lesson_id: &str,
) -> Result<Option<LessonProgress>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT user_id, lesson_id, watched_percentage, completed, last_watched_at, completed_at
         FROM lesson_progress WHERE user_id = ?1 AND lesson_id = ?2",
    )?;
    let result = stmt.query_row(params![user_id, lesson_id], |row| {
        Ok(LessonProgress {
            user_id: row.get(0)?,
            lesson_id: row.get(1)?,
            watched_percentage: row.get(2)?,
            completed: row.get(3)?,
            last_watched_at: row.get(4)?,
            completed_at: row.get(5)?,
        })
    });
    match result {
        Ok(progress) => Ok(Some(progress)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

fn read_course_progress(
    conn: &rusqlite::Connection,
    user_id: &str,
    course_id: &str,
) -> Result<Option<CourseProgress>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT user_id, course_id, lessons_completed, progress_percentage, status, completed_at
         FROM course_progress WHERE user_id = ?1 AND course_id = ?2",
    )?;
    let result = stmt.query_row(params![user_id, course_id], |row| {
        let status: String = row.get(4)?;
        Ok(CourseProgress {
            user_id: row.get(0)?,
            course_id: row.get(1)?,
            lessons_completed: row.get(2)?,
            progress_percentage: row.get(3)?,
            status: status.parse().unwrap_or(CourseStatus::NotStarted),
            completed_at: row.get(5)?,
        })
    });
    match result {
        Ok(progress) => Ok(Some(progress)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Record a watch-percentage sample for (user, lesson).
///
/// Creates the row on first tick. The persisted percentage is
/// `MAX(existing, sample)` -- never lowered. Returns the row as persisted.
pub async fn upsert_watched(
    db: &Database,
    user_id: &str,
    lesson_id: &str,
    percentage: u8,
) -> Result<LessonProgress, SafetrainError> {
    let user_id = user_id.to_string();
    let lesson_id = lesson_id.to_string();
    let now = now_iso();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO lesson_progress
                     (user_id, lesson_id, watched_percentage, completed, last_watched_at)
                 VALUES (?1, ?2, ?3, 0, ?4)
                 ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                     watched_percentage = MAX(lesson_progress.watched_percentage,
                                              excluded.watched_percentage),
                     last_watched_at = excluded.last_watched_at",
                params![user_id, lesson_id, percentage, now],
            )?;
            read_lesson_progress(conn, &user_id, &lesson_id)?.ok_or_else(|| {
                rusqlite::Error::QueryReturnedNoRows
            })
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get lesson progress for (user, lesson), if any.
pub async fn get_lesson_progress(
    db: &Database,
    user_id: &str,
    lesson_id: &str,
) -> Result<Option<LessonProgress>, SafetrainError> {
    let user_id = user_id.to_string();
    let lesson_id = lesson_id.to_string();
    db.connection()
        .call(move |conn| read_lesson_progress(conn, &user_id, &lesson_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Mark a lesson complete for (user, lesson).
///
/// Sets watched percentage to 100 and stamps `completed_at`. The write is
/// guarded on `completed = 0`, so a repeated call changes nothing. Returns
/// the persisted row and whether this call was the first completion.
pub async fn mark_lesson_completed(
    db: &Database,
    user_id: &str,
    lesson_id: &str,
) -> Result<(LessonProgress, bool), SafetrainError> {
    let user_id = user_id.to_string();
    let lesson_id = lesson_id.to_string();
    let now = now_iso();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT INTO lesson_progress
                     (user_id, lesson_id, watched_percentage, completed, last_watched_at, completed_at)
                 VALUES (?1, ?2, 100, 1, ?3, ?3)
                 ON CONFLICT(user_id, lesson_id) DO UPDATE SET
                     watched_percentage = 100,
                     completed = 1,
                     last_watched_at = excluded.last_watched_at,
                     completed_at = excluded.completed_at
                 WHERE lesson_progress.completed = 0",
                params![user_id, lesson_id, now],
            )?;
            let progress = read_lesson_progress(conn, &user_id, &lesson_id)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
            Ok((progress, changed == 1))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Recompute (user, course) aggregate progress from the completed lesson
/// rows.
///
/// `lessons_completed` is derived from a count of the learner's completed
/// lessons in the course, never incremented, so repeated calls converge on
/// the same row and a retry after a partial failure backfills a missing or
/// stale aggregate. Once a course reaches `completed` the row never
/// regresses.
pub async fn recompute_course_progress(
    db: &Database,
    user_id: &str,
    course_id: &str,
    total_lessons: u32,
) -> Result<CourseProgress, SafetrainError> {
    let user_id = user_id.to_string();
    let course_id = course_id.to_string();
    let now = now_iso();
    db.connection()
        .call(move |conn| {
            let completed: u32 = conn.query_row(
                "SELECT COUNT(*) FROM lesson_progress lp
                 JOIN lessons l ON l.id = lp.lesson_id
                 WHERE lp.user_id = ?1 AND l.course_id = ?2 AND lp.completed = 1",
                params![user_id, course_id],
                |row| row.get(0),
            )?;
            conn.execute(
                "INSERT INTO course_progress
                     (user_id, course_id, lessons_completed, progress_percentage, status, completed_at)
                 VALUES (?1, ?2, ?3,
                         MIN(100.0, ?3 * 100.0 / ?4),
                         CASE WHEN ?3 >= ?4 THEN 'completed' ELSE 'in_progress' END,
                         CASE WHEN ?3 >= ?4 THEN ?5 ELSE NULL END)
                 ON CONFLICT(user_id, course_id) DO UPDATE SET
                     lessons_completed = ?3,
                     progress_percentage = MIN(100.0, ?3 * 100.0 / ?4),
                     status = CASE WHEN ?3 >= ?4 THEN 'completed' ELSE 'in_progress' END,
                     completed_at = CASE WHEN ?3 >= ?4 THEN ?5 ELSE NULL END
                 WHERE course_progress.status != 'completed'",
                params![user_id, course_id, completed, total_lessons, now],
            )?;
            read_course_progress(conn, &user_id, &course_id)?
                .ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get course progress for (user, course), if any.
pub async fn get_course_progress(
    db: &Database,
    user_id: &str,
    course_id: &str,
) -> Result<Option<CourseProgress>, SafetrainError> {
    let user_id = user_id.to_string();
    let course_id = course_id.to_string();
    db.connection()
        .call(move |conn| read_course_progress(conn, &user_id, &course_id))
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use crate::models::{Course, Lesson};
    use crate::queries::catalog;

    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    async fn seed_course(db: &Database, course_id: &str, lesson_ids: &[&str]) {
        catalog::create_course(
            db,
            &Course {
                id: course_id.to_string(),
                name: "Working at Heights".into(),
                total_lessons: lesson_ids.len() as u32,
            },
        )
        .await
        .unwrap();
        for lesson_id in lesson_ids {
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

    #[tokio::test]
    async fn first_tick_creates_row() {
        let (db, _dir) = setup_db().await;
        let progress = upsert_watched(&db, "u-1", "l-1", 5).await.unwrap();
        assert_eq!(progress.watched_percentage, 5);
        assert!(!progress.completed);
        assert!(progress.completed_at.is_none());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn watched_percentage_is_monotonic() {
        let (db, _dir) = setup_db().await;
        upsert_watched(&db, "u-1", "l-1", 40).await.unwrap();
        let progress = upsert_watched(&db, "u-1", "l-1", 35).await.unwrap();
        assert_eq!(progress.watched_percentage, 40);

        let progress = upsert_watched(&db, "u-1", "l-1", 55).await.unwrap();
        assert_eq!(progress.watched_percentage, 55);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn completion_is_idempotent() {
        let (db, _dir) = setup_db().await;
        upsert_watched(&db, "u-1", "l-1", 95).await.unwrap();

        let (first, newly) = mark_lesson_completed(&db, "u-1", "l-1").await.unwrap();
        assert!(newly);
        assert!(first.completed);
        assert_eq!(first.watched_percentage, 100);
        let completed_at = first.completed_at.clone().unwrap();

        let (second, newly) = mark_lesson_completed(&db, "u-1", "l-1").await.unwrap();
        assert!(!newly);
        assert_eq!(second.completed_at.as_deref(), Some(completed_at.as_str()));
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn completion_without_prior_ticks_inserts_row() {
        let (db, _dir) = setup_db().await;
        let (progress, newly) = mark_lesson_completed(&db, "u-1", "l-9").await.unwrap();
        assert!(newly);
        assert!(progress.completed);
        assert_eq!(progress.watched_percentage, 100);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn course_recompute_tracks_completed_lessons() {
        let (db, _dir) = setup_db().await;
        seed_course(&db, "c-1", &["l-1", "l-2", "l-3"]).await;

        mark_lesson_completed(&db, "u-1", "l-1").await.unwrap();
        let one = recompute_course_progress(&db, "u-1", "c-1", 3).await.unwrap();
        assert_eq!(one.lessons_completed, 1);
        assert_eq!(one.status, CourseStatus::InProgress);
        assert!((one.progress_percentage - 33.33).abs() < 0.1);
        assert!(one.completed_at.is_none());

        mark_lesson_completed(&db, "u-1", "l-2").await.unwrap();
        let two = recompute_course_progress(&db, "u-1", "c-1", 3).await.unwrap();
        assert_eq!(two.lessons_completed, 2);
        assert!((two.progress_percentage - 66.67).abs() < 0.1);

        mark_lesson_completed(&db, "u-1", "l-3").await.unwrap();
        let three = recompute_course_progress(&db, "u-1", "c-1", 3).await.unwrap();
        assert_eq!(three.lessons_completed, 3);
        assert_eq!(three.status, CourseStatus::Completed);
        assert_eq!(three.progress_percentage, 100.0);
        assert!(three.completed_at.is_some());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recompute_is_idempotent() {
        let (db, _dir) = setup_db().await;
        seed_course(&db, "c-1", &["l-1", "l-2", "l-3"]).await;
        mark_lesson_completed(&db, "u-1", "l-1").await.unwrap();

        let first = recompute_course_progress(&db, "u-1", "c-1", 3).await.unwrap();
        let again = recompute_course_progress(&db, "u-1", "c-1", 3).await.unwrap();
        assert_eq!(again, first);
        assert_eq!(again.lessons_completed, 1);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn completed_course_never_regresses() {
        let (db, _dir) = setup_db().await;
        seed_course(&db, "c-solo", &["l-only"]).await;
        mark_lesson_completed(&db, "u-1", "l-only").await.unwrap();

        let done = recompute_course_progress(&db, "u-1", "c-solo", 1).await.unwrap();
        assert_eq!(done.status, CourseStatus::Completed);
        assert_eq!(done.progress_percentage, 100.0);

        let again = recompute_course_progress(&db, "u-1", "c-solo", 1).await.unwrap();
        assert_eq!(again.lessons_completed, 1);
        assert_eq!(again.status, CourseStatus::Completed);
        assert_eq!(again.completed_at, done.completed_at);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recompute_backfills_missing_aggregate() {
        let (db, _dir) = setup_db().await;
        seed_course(&db, "c-1", &["l-1"]).await;

        // A lesson completed with no aggregate row yet, as after a crash
        // between the lesson write and the course write.
        mark_lesson_completed(&db, "u-1", "l-1").await.unwrap();
        assert!(get_course_progress(&db, "u-1", "c-1").await.unwrap().is_none());

        let rebuilt = recompute_course_progress(&db, "u-1", "c-1", 1).await.unwrap();
        assert_eq!(rebuilt.lessons_completed, 1);
        assert_eq!(rebuilt.status, CourseStatus::Completed);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn recompute_ignores_other_courses_and_users() {
        let (db, _dir) = setup_db().await;
        seed_course(&db, "c-1", &["l-1"]).await;
        seed_course(&db, "c-2", &["l-other"]).await;
        mark_lesson_completed(&db, "u-1", "l-other").await.unwrap();
        mark_lesson_completed(&db, "u-2", "l-1").await.unwrap();

        let progress = recompute_course_progress(&db, "u-1", "c-1", 1).await.unwrap();
        assert_eq!(progress.lessons_completed, 0);
        db.close().await.unwrap();
    }
}
