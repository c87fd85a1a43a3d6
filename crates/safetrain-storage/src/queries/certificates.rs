// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Certificate reads and the atomic insert-if-absent write.
//!
//! The UNIQUE(user_id, course_id) constraint is the true integrity guarantee
//! for at-most-one certificate per course; the insert here leans on it
//! instead of a racy existence pre-read.

use rusqlite::params;
use safetrain_core::SafetrainError;

use crate::database::Database;
use crate::models::Certificate;

fn row_to_certificate(row: &rusqlite::Row<'_>) -> Result<Certificate, rusqlite::Error> {
    Ok(Certificate {
        certificate_number: row.get(0)?,
        user_id: row.get(1)?,
        course_id: row.get(2)?,
        issued_date: row.get(3)?,
    })
}

/// Insert a certificate unless one already exists for (user, course).
///
/// Returns `true` if the certificate was inserted, `false` if the pair
/// already holds one.
pub async fn insert_if_absent(
    db: &Database,
    certificate: &Certificate,
) -> Result<bool, SafetrainError> {
    let certificate = certificate.clone();
    db.connection()
        .call(move |conn| {
            let changed = conn.execute(
                "INSERT INTO certificates (certificate_number, user_id, course_id, issued_date)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(user_id, course_id) DO NOTHING",
                params![
                    certificate.certificate_number,
                    certificate.user_id,
                    certificate.course_id,
                    certificate.issued_date,
                ],
            )?;
            Ok(changed == 1)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get the certificate for (user, course), if issued.
pub async fn get_certificate(
    db: &Database,
    user_id: &str,
    course_id: &str,
) -> Result<Option<Certificate>, SafetrainError> {
    let user_id = user_id.to_string();
    let course_id = course_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT certificate_number, user_id, course_id, issued_date
                 FROM certificates WHERE user_id = ?1 AND course_id = ?2",
            )?;
            let result = stmt.query_row(params![user_id, course_id], row_to_certificate);
            match result {
                Ok(certificate) => Ok(Some(certificate)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List a learner's certificates, newest first.
pub async fn list_certificates(
    db: &Database,
    user_id: &str,
) -> Result<Vec<Certificate>, SafetrainError> {
    let user_id = user_id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT certificate_number, user_id, course_id, issued_date
                 FROM certificates WHERE user_id = ?1 ORDER BY issued_date DESC",
            )?;
            let rows = stmt.query_map(params![user_id], row_to_certificate)?;
            let mut certificates = Vec::new();
            for row in rows {
                certificates.push(row?);
            }
            Ok(certificates)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use safetrain_core::now_iso;

    use super::*;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    fn make_certificate(number: &str, user: &str, course: &str) -> Certificate {
        Certificate {
            certificate_number: number.to_string(),
            user_id: user.to_string(),
            course_id: course.to_string(),
            issued_date: now_iso(),
        }
    }

    #[tokio::test]
    async fn second_insert_for_same_pair_is_rejected() {
        let (db, _dir) = setup_db().await;
        let first = make_certificate("CERT-1-ab12", "u-1", "c-1");
        assert!(insert_if_absent(&db, &first).await.unwrap());

        // Retry with a different number must not create a second row.
        let retry = make_certificate("CERT-2-ab12", "u-1", "c-1");
        assert!(!insert_if_absent(&db, &retry).await.unwrap());

        let kept = get_certificate(&db, "u-1", "c-1").await.unwrap().unwrap();
        assert_eq!(kept.certificate_number, "CERT-1-ab12");
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_user_different_courses_both_issue() {
        let (db, _dir) = setup_db().await;
        assert!(
            insert_if_absent(&db, &make_certificate("CERT-1-ab12", "u-1", "c-1"))
                .await
                .unwrap()
        );
        assert!(
            insert_if_absent(&db, &make_certificate("CERT-2-ab12", "u-1", "c-2"))
                .await
                .unwrap()
        );

        let all = list_certificates(&db, "u-1").await.unwrap();
        assert_eq!(all.len(), 2);
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn missing_certificate_reads_none() {
        let (db, _dir) = setup_db().await;
        assert!(get_certificate(&db, "u-1", "c-none").await.unwrap().is_none());
        db.close().await.unwrap();
    }
}
