// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded database migrations using refinery.
//!
//! SQL migration files are compiled into the binary at build time via
//! `embed_migrations!`. Migrations run automatically on database open.

use safetrain_core::SafetrainError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Run all pending migrations on the database's writer thread.
///
/// Refinery tracks applied migrations in its own `refinery_schema_history`
/// table, so this is a no-op on an up-to-date database.
pub async fn run_migrations(conn: &tokio_rusqlite::Connection) -> Result<(), SafetrainError> {
    let report = conn
        .call(|conn| -> Result<_, rusqlite::Error> {
            Ok(embedded::migrations::runner().run(conn))
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    report.map_err(|e| SafetrainError::Storage {
        source: Box::new(e),
    })?;
    Ok(())
}
