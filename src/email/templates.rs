//! Email template functions
//!
//! Plain-text bodies for the notifications the application sends.
use super::{EmailResult, Mailer};
use crate::constants::ANONYMOUS_NAME;
use chrono::NaiveDateTime;

/// Everything the administrator is told about a new complaint.
#[derive(Debug)]
pub struct ComplaintNotice<'a> {
    pub complaint_id: i32,
    /// None for anonymous complaints.
    pub student_name: Option<&'a str>,
    pub subject: &'a str,
    pub severity: &'a str,
    pub details: &'a str,
    /// Absolute URL of the proof file, if one was uploaded.
    pub proof_url: Option<String>,
    pub created_at: NaiveDateTime,
}

pub fn complaint_subject(severity: &str) -> String {
    format!("New Complaint (Severity: {})", severity)
}

pub fn complaint_body(notice: &ComplaintNotice<'_>) -> String {
    format!(
        "Complaint ID: {}\n\
         Student: {}\n\
         Subject: {}\n\
         Severity: {}\n\
         Details: {}\n\
         Proof: {}\n\
         Date: {}\n",
        notice.complaint_id,
        notice.student_name.unwrap_or(ANONYMOUS_NAME),
        notice.subject,
        notice.severity,
        notice.details,
        notice.proof_url.as_deref().unwrap_or("None"),
        notice.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
    )
}

/// Notify the administrator of a new complaint
pub async fn send_complaint_notification(
    mailer: &dyn Mailer,
    admin_address: &str,
    notice: &ComplaintNotice<'_>,
) -> EmailResult<()> {
    mailer
        .send_email(
            admin_address,
            &complaint_subject(notice.severity),
            &complaint_body(notice),
        )
        .await
}

/// Send a test email to the administrator
pub async fn send_test_email(
    mailer: &dyn Mailer,
    admin_address: &str,
    site_name: &str,
) -> EmailResult<()> {
    mailer
        .send_email(
            admin_address,
            "Test Email",
            &format!("This is a test email from {}.", site_name),
        )
        .await
}
