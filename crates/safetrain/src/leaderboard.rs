// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `safetrain leaderboard` command implementation.

use safetrain_core::SafetrainError;
use safetrain_storage::Database;
use safetrain_storage::queries::gamification;
use serde::Serialize;

/// One leaderboard row for `--json` mode.
#[derive(Debug, Serialize)]
struct LeaderboardRow {
    rank: usize,
    user_id: String,
    points: u32,
    level: u32,
    badges: Vec<String>,
}

/// Print the top accounts by points.
pub async fn run(db: &Database, limit: u32, json: bool) -> Result<(), SafetrainError> {
    let accounts = gamification::top_accounts(db, limit).await?;

    if json {
        let rows: Vec<LeaderboardRow> = accounts
            .iter()
            .enumerate()
            .map(|(i, a)| LeaderboardRow {
                rank: i + 1,
                user_id: a.user_id.clone(),
                points: a.points,
                level: a.level,
                badges: a.badges.iter().cloned().collect(),
            })
            .collect();
        let out = serde_json::to_string_pretty(&rows)
            .map_err(|e| SafetrainError::Internal(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    if accounts.is_empty() {
        println!("no accounts yet");
        return Ok(());
    }
    for (i, account) in accounts.iter().enumerate() {
        let badges: Vec<&str> = account.badges.iter().map(String::as_str).collect();
        println!(
            "{:>3}. {}  {} pts  level {}  [{}]",
            i + 1,
            account.user_id,
            account.points,
            account.level,
            badges.join(", ")
        );
    }
    Ok(())
}
