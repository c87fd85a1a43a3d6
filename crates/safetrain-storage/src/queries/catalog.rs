// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Course and lesson catalog reads.
//!
//! Authoring CRUD is out of scope for the engine; the inserts here exist for
//! seeding and tests only. The engine itself only reads.

use rusqlite::params;
use safetrain_core::SafetrainError;

use crate::database::Database;
use crate::models::{Course, Lesson};

/// Insert a course. Seeding/test helper.
pub async fn create_course(db: &Database, course: &Course) -> Result<(), SafetrainError> {
    let course = course.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO courses (id, name, total_lessons) VALUES (?1, ?2, ?3)",
                params![course.id, course.name, course.total_lessons],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Insert a lesson. Seeding/test helper.
pub async fn create_lesson(db: &Database, lesson: &Lesson) -> Result<(), SafetrainError> {
    let lesson = lesson.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO lessons (id, course_id, title) VALUES (?1, ?2, ?3)",
                params![lesson.id, lesson.course_id, lesson.title],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a course by id.
pub async fn get_course(db: &Database, id: &str) -> Result<Option<Course>, SafetrainError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, total_lessons FROM courses WHERE id = ?1")?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Course {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    total_lessons: row.get(2)?,
                })
            });
            match result {
                Ok(course) => Ok(Some(course)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a lesson by id.
pub async fn get_lesson(db: &Database, id: &str) -> Result<Option<Lesson>, SafetrainError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, course_id, title FROM lessons WHERE id = ?1")?;
            let result = stmt.query_row(params![id], |row| {
                Ok(Lesson {
                    id: row.get(0)?,
                    course_id: row.get(1)?,
                    title: row.get(2)?,
                })
            });
            match result {
                Ok(lesson) => Ok(Some(lesson)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
