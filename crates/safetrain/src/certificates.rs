// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `safetrain certificates` command implementation.

use safetrain_core::SafetrainError;
use safetrain_storage::Database;
use safetrain_storage::queries::certificates;

/// List a learner's issued certificates, newest first.
pub async fn run(db: &Database, user_id: &str, json: bool) -> Result<(), SafetrainError> {
    let held = certificates::list_certificates(db, user_id).await?;

    if json {
        let out = serde_json::to_string_pretty(&held)
            .map_err(|e| SafetrainError::Internal(e.to_string()))?;
        println!("{out}");
        return Ok(());
    }

    if held.is_empty() {
        println!("no certificates for {user_id}");
        return Ok(());
    }
    for cert in held {
        println!(
            "{}  course {}  issued {}",
            cert.certificate_number, cert.course_id, cert.issued_date
        );
    }
    Ok(())
}
