// SPDX-FileCopyrightText: 2026 Safetrain Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Certificate issuance: at most one per (user, course).
//!
//! The certificate number combines a millisecond timestamp with the last
//! four characters of the user id (`CERT-<millis>-<last4>`). Uniqueness of
//! the number is best-effort; the (user, course) unique constraint in
//! storage is the true integrity guarantee. The renderable artifact is a
//! fixed-layout, print-oriented HTML document; transport is the caller's
//! concern.

use std::sync::Arc;

use safetrain_core::{Certificate, ISO_MILLIS, SafetrainError};
use safetrain_storage::Database;
use safetrain_storage::queries::certificates;
use tracing::info;

/// A freshly issued certificate: the persisted record plus its artifact.
#[derive(Debug, Clone)]
pub struct IssuedCertificate {
    pub record: Certificate,
    pub artifact_html: String,
}

/// Issues course completion certificates against the shared database.
pub struct CertificateIssuer {
    db: Arc<Database>,
    /// Portal display name, printed on the artifact.
    portal_name: String,
}

impl CertificateIssuer {
    pub fn new(db: Arc<Database>, portal_name: String) -> Self {
        Self { db, portal_name }
    }

    /// Issue a certificate for (user, course).
    ///
    /// Fails with [`SafetrainError::MissingProfileData`] when the student
    /// has no resolvable display name, and with
    /// [`SafetrainError::CertificateAlreadyExists`] when the pair already
    /// holds one (an expected steady-state condition, informational to the
    /// caller). Does not award points -- that is the completion resolver's
    /// responsibility, so a retried issuance can never double-credit.
    pub async fn issue(
        &self,
        user_id: &str,
        course_id: &str,
        student_full_name: &str,
        course_name: &str,
    ) -> Result<IssuedCertificate, SafetrainError> {
        let student_full_name = student_full_name.trim();
        if student_full_name.is_empty() {
            return Err(SafetrainError::MissingProfileData {
                user_id: user_id.to_string(),
            });
        }

        // One clock read feeds the number, the stored timestamp, and the
        // printed date, so the artifact can never disagree with the record.
        let issued_at = chrono::Utc::now();
        let record = Certificate {
            certificate_number: generate_certificate_number(
                user_id,
                issued_at.timestamp_millis(),
            ),
            user_id: user_id.to_string(),
            course_id: course_id.to_string(),
            issued_date: issued_at.format(ISO_MILLIS).to_string(),
        };

        let inserted = certificates::insert_if_absent(&self.db, &record).await?;
        if !inserted {
            return Err(SafetrainError::CertificateAlreadyExists {
                user_id: user_id.to_string(),
                course_id: course_id.to_string(),
            });
        }

        info!(
            user_id,
            course_id,
            certificate_number = %record.certificate_number,
            "certificate issued"
        );

        let artifact_html = render_certificate_html(
            &self.portal_name,
            student_full_name,
            course_name,
            &issued_at.format("%d/%m/%Y").to_string(),
            &record.certificate_number,
        );

        Ok(IssuedCertificate {
            record,
            artifact_html,
        })
    }

    /// All certificates held by a learner, newest first.
    pub async fn certificates_for(
        &self,
        user_id: &str,
    ) -> Result<Vec<Certificate>, SafetrainError> {
        certificates::list_certificates(&self.db, user_id).await
    }
}

/// `CERT-<unix millis>-<last 4 chars of user id>`.
fn generate_certificate_number(user_id: &str, timestamp_millis: i64) -> String {
    let tail: String = user_id
        .chars()
        .rev()
        .take(4)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("CERT-{timestamp_millis}-{tail}")
}

/// Fixed-layout A4-landscape certificate document.
fn render_certificate_html(
    portal_name: &str,
    student_name: &str,
    course_name: &str,
    completion_date: &str,
    certificate_number: &str,
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Certificate {certificate_number}</title>
<style>
  @page {{ size: A4 landscape; margin: 0; }}
  body {{ margin: 0; background: #0d47a1; color: #ffffff;
         font-family: Helvetica, Arial, sans-serif; text-align: center; }}
  .frame {{ border: 3px solid #d4af37; margin: 24px; padding: 8px; }}
  .inner {{ border: 1px solid #d4af37; padding: 48px 32px; }}
  h1 {{ font-size: 48px; letter-spacing: 6px; margin: 0 0 8px; }}
  .subtitle {{ font-size: 16px; margin-bottom: 40px; }}
  .student {{ font-size: 32px; font-weight: bold; margin: 16px 0; }}
  .course {{ font-size: 26px; font-weight: bold; margin: 16px 0 32px; }}
  .meta {{ font-size: 13px; margin-top: 40px; }}
  .signatures {{ display: flex; justify-content: space-around; margin-top: 56px; }}
  .signature {{ border-top: 1px solid #ffffff; padding-top: 6px;
               width: 220px; font-size: 12px; }}
</style>
</head>
<body>
<div class="frame"><div class="inner">
  <h1>CERTIFICATE</h1>
  <p class="subtitle">{portal_name} &mdash; Workplace Safety Training</p>
  <p>This certifies that</p>
  <p class="student">{student_name}</p>
  <p>has successfully completed the course</p>
  <p class="course">{course_name}</p>
  <p>demonstrating knowledge and competence in workplace safety in
     accordance with applicable regulations.</p>
  <p class="meta">Issued on: {completion_date}<br>
     Certificate No.: {certificate_number}</p>
  <div class="signatures">
    <div class="signature">{portal_name}<br>Training Platform</div>
    <div class="signature">Responsible Instructor<br>Digital Certificate</div>
  </div>
</div></div>
</body>
</html>
"#
    )
}
