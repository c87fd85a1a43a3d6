// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gamification account and point-award writes.
//!
//! `apply_award` is the idempotency spine: the (user_id, activity_type,
//! subject_id) primary key makes a repeated award a silent no-op, and the
//! award key and the points credit land in one transaction, so the key can
//! never exist without its points having been applied.

use std::collections::BTreeSet;

use rusqlite::params;
use safetrain_core::SafetrainError;

use crate::database::Database;
use crate::models::{GamificationAccount, PointAward};

fn parse_string_set(raw: &str) -> BTreeSet<String> {
    serde_json::from_str(raw).unwrap_or_default()
}

fn row_to_account(row: &rusqlite::Row<'_>) -> Result<GamificationAccount, rusqlite::Error> {
    let badges: String = row.get(3)?;
    let achievements: String = row.get(4)?;
    Ok(GamificationAccount {
        user_id: row.get(0)?,
        points: row.get(1)?,
        level: row.get(2)?,
        badges: parse_string_set(&badges),
        achievements: parse_string_set(&achievements),
        streak_days: row.get(5)?,
    })
}

fn read_account(
    conn: &rusqlite::Connection,
    user_id: &str,
) -> Result<Option<GamificationAccount>, rusqlite::Error> {
    let mut stmt = conn.prepare(
        "SELECT user_id, points, level, badges, achievements, streak_days
         FROM gamification_accounts WHERE user_id = ?1",
    )?;
    let result = stmt.query_row(params![user_id], row_to_account);
    match result {
        Ok(account) => Ok(Some(account)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Record a point award and credit its points, atomically.
///
/// The award row and the account update commit in a single transaction:
/// either the (user, activity, subject) key exists with its points applied,
/// or neither write happened. A duplicate key leaves the account untouched.
/// Returns the account after the call and whether the award was applied.
pub async fn apply_award(
    db: &Database,
    award: &PointAward,
) -> Result<(GamificationAccount, bool), SafetrainError> {
    let award = award.clone();
    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "INSERT INTO point_awards (user_id, activity_type, subject_id, points, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(user_id, activity_type, subject_id) DO NOTHING",
                params![
                    award.user_id,
                    award.activity_type.to_string(),
                    award.subject_id,
                    award.points,
                    award.created_at,
                ],
            )?;
            if changed == 1 {
                tx.execute(
                    "INSERT INTO gamification_accounts (user_id, points, level)
                     VALUES (?1, ?2, ?2 / 100 + 1)
                     ON CONFLICT(user_id) DO UPDATE SET
                         points = gamification_accounts.points + ?2,
                         level = (gamification_accounts.points + ?2) / 100 + 1",
                    params![award.user_id, award.points],
                )?;
            }
            let account = read_account(&tx, &award.user_id)?
                .unwrap_or_else(|| GamificationAccount::new(award.user_id.clone()));
            tx.commit()?;
            Ok((account, changed == 1))
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add points to a user's account, creating it lazily on first award.
///
/// The stored level is overwritten from the pure points->level function on
/// every write, never incremented independently. Returns the updated row.
pub async fn add_points(
    db: &Database,
    user_id: &str,
    points: u32,
) -> Result<GamificationAccount, SafetrainError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO gamification_accounts (user_id, points, level)
                 VALUES (?1, ?2, ?2 / 100 + 1)
                 ON CONFLICT(user_id) DO UPDATE SET
                     points = gamification_accounts.points + ?2,
                     level = (gamification_accounts.points + ?2) / 100 + 1",
                params![user_id, points],
            )?;
            read_account(conn, &user_id)?.ok_or(rusqlite::Error::QueryReturnedNoRows)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Add a badge to a user's badge set. Set union: a repeated grant is a no-op.
pub async fn grant_badge(
    db: &Database,
    user_id: &str,
    badge: &str,
) -> Result<GamificationAccount, SafetrainError> {
    let user_id = user_id.to_string();
    let badge = badge.to_string();
    db.connection()
        .call(move |conn| {
            let mut account = read_account(conn, &user_id)?
                .unwrap_or_else(|| GamificationAccount::new(user_id.clone()));
            if account.badges.insert(badge) {
                let badges = serde_json::to_string(&account.badges)
                    .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
                conn.execute(
                    "INSERT INTO gamification_accounts (user_id, badges) VALUES (?1, ?2)
                     ON CONFLICT(user_id) DO UPDATE SET badges = excluded.badges",
                    params![user_id, badges],
                )?;
            }
            Ok(account)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Count recorded awards for (user, activity).
pub async fn count_awards(
    db: &Database,
    user_id: &str,
    activity_type: safetrain_core::ActivityType,
) -> Result<u32, SafetrainError> {
    let user_id = user_id.to_string();
    let activity = activity_type.to_string();
    db.connection()
        .call(move |conn| {
            conn.query_row(
                "SELECT COUNT(*) FROM point_awards WHERE user_id = ?1 AND activity_type = ?2",
                params![user_id, activity],
                |row| row.get(0),
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a user's gamification account, if one exists.
pub async fn get_account(
    db: &Database,
    user_id: &str,
) -> Result<Option<GamificationAccount>, SafetrainError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| read_account(conn, &user_id))
        .await
        .map_err(crate::database::map_tr_err)
}

/// Leaderboard read: top accounts by points, descending.
///
/// Eventually consistent with in-flight awards -- reflects a snapshot no
/// older than the last successful award write.
pub async fn top_accounts(
    db: &Database,
    limit: u32,
) -> Result<Vec<GamificationAccount>, SafetrainError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id, points, level, badges, achievements, streak_days
                 FROM gamification_accounts ORDER BY points DESC, user_id ASC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit], row_to_account)?;
            let mut accounts = Vec::new();
            for row in rows {
                accounts.push(row?);
            }
            Ok(accounts)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
