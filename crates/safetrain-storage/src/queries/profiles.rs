// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Learner profile reads and writes.

use rusqlite::params;
use safetrain_core::{SafetrainError, now_iso};

use crate::database::Database;
use crate::models::Profile;

/// Create or update a learner profile.
pub async fn upsert_profile(db: &Database, profile: &Profile) -> Result<(), SafetrainError> {
    let profile = profile.clone();
    let created_at = now_iso();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO profiles (id, full_name, created_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET full_name = excluded.full_name",
                params![profile.id, profile.full_name, created_at],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a profile by user id.
pub async fn get_profile(db: &Database, user_id: &str) -> Result<Option<Profile>, SafetrainError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt =
                conn.prepare("SELECT id, full_name FROM profiles WHERE id = ?1")?;
            let result = stmt.query_row(params![user_id], |row| {
                Ok(Profile {
                    id: row.get(0)?,
                    full_name: row.get(1)?,
                })
            });
            match result {
                Ok(profile) => Ok(Some(profile)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}
