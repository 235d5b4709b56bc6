//! Complaint filing

use crate::app_config::AppConfig;
use crate::constants::{DEFAULT_COMPLAINT_STATUS, DEFAULT_SEVERITY};
use crate::email::templates::{send_complaint_notification, ComplaintNotice};
use crate::email::{EmailResult, Mailer};
use crate::flash::{self, FlashMessage};
use crate::middleware::ClientCtx;
use crate::orm::complaints;
use crate::storage::{safe_upload_name, StorageBackend};
use crate::user::Profile;
use crate::web::redirect;
use actix_multipart::{Field, Multipart};
use actix_web::{error, get, post, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use chrono::Utc;
use futures::{StreamExt, TryStreamExt};
use sea_orm::{entity::*, DatabaseConnection, DbErr};
use std::sync::Arc;

/// Limit for any non-file field.
const TEXT_FIELD_LIMIT: usize = 64 * 1024;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_complaint_form).service(post_complaint);
}

#[derive(Template)]
#[template(path = "complaint.html")]
struct ComplaintFormTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
    max_upload_size_mb: u32,
}

/// Validated complaint fields, with the proof already stored.
#[derive(Debug, Clone)]
pub struct ComplaintSubmission {
    pub subject: String,
    pub severity: String,
    pub details: String,
    pub anonymous: bool,
    /// Path relative to the static root.
    pub proof_file: Option<String>,
}

#[derive(Debug)]
pub struct SubmittedComplaint {
    pub complaint: complaints::Model,
    pub email_sent: bool,
}

/// Persists a complaint. Anonymous complaints never reference `student`.
pub async fn insert_complaint(
    db: &DatabaseConnection,
    student: &Profile,
    submission: &ComplaintSubmission,
) -> Result<complaints::Model, DbErr> {
    let severity = match submission.severity.trim() {
        "" => DEFAULT_SEVERITY.to_owned(),
        severity => severity.to_owned(),
    };

    complaints::ActiveModel {
        student_id: Set(if submission.anonymous {
            None
        } else {
            Some(student.id)
        }),
        subject: Set(submission.subject.trim().to_owned()),
        severity: Set(severity),
        details: Set(submission.details.to_owned()),
        anonymous: Set(submission.anonymous),
        proof_file: Set(submission.proof_file.clone()),
        status: Set(DEFAULT_COMPLAINT_STATUS.to_owned()),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
}

/// Emails the administrator about a stored complaint.
pub async fn notify_admin(
    mailer: &dyn Mailer,
    config: &AppConfig,
    complaint: &complaints::Model,
    student: &Profile,
) -> EmailResult<()> {
    let notice = ComplaintNotice {
        complaint_id: complaint.id,
        student_name: if complaint.anonymous {
            None
        } else {
            Some(&student.name)
        },
        subject: &complaint.subject,
        severity: &complaint.severity,
        details: &complaint.details,
        proof_url: complaint.proof_file.as_ref().map(|proof| {
            format!("{}/static/{}", config.site.base_url.trim_end_matches('/'), proof)
        }),
        created_at: complaint.created_at,
    };

    send_complaint_notification(mailer, &config.email.admin_address, &notice).await
}

/// Stores the complaint, then attempts the notification once.
///
/// The record is kept whatever happens to the email.
pub async fn submit_complaint(
    db: &DatabaseConnection,
    mailer: &dyn Mailer,
    config: &AppConfig,
    student: &Profile,
    submission: &ComplaintSubmission,
) -> Result<SubmittedComplaint, DbErr> {
    let complaint = insert_complaint(db, student, submission).await?;

    let email_sent = match notify_admin(mailer, config, &complaint, student).await {
        Ok(()) => {
            log::info!("Email sent successfully for complaint {}", complaint.id);
            true
        }
        Err(e) => {
            log::error!("Email failed for complaint {}: {}", complaint.id, e);
            log::error!("Mail transport: {}", mailer.describe());
            false
        }
    };

    Ok(SubmittedComplaint {
        complaint,
        email_sent,
    })
}

struct UploadedProof {
    filename: String,
    data: Vec<u8>,
}

#[derive(Default)]
struct ComplaintForm {
    csrf_token: String,
    subject: String,
    severity: String,
    details: String,
    anonymous: bool,
    proof: Option<UploadedProof>,
}

impl ComplaintForm {
    fn validate(&self) -> Result<(), &'static str> {
        if self.subject.trim().is_empty() {
            return Err("Please enter a subject for your complaint.");
        }
        if self.details.trim().is_empty() {
            return Err("Please describe what happened.");
        }
        Ok(())
    }
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, Error> {
    let mut buf: Vec<u8> = Vec::new();
    while let Some(chunk) = field.next().await {
        let bytes = chunk.map_err(|e| {
            log::error!("post_complaint: multipart read error: {}", e);
            error::ErrorBadRequest("Error interpreting user input.")
        })?;
        if buf.len() + bytes.len() > limit {
            return Err(error::ErrorPayloadTooLarge("Upload is too large."));
        }
        buf.extend_from_slice(&bytes);
    }
    Ok(buf)
}

async fn read_text_field(field: &mut Field) -> Result<String, Error> {
    String::from_utf8(read_field(field, TEXT_FIELD_LIMIT).await?)
        .map_err(|_| error::ErrorBadRequest("Error interpreting user input."))
}

async fn parse_complaint_form(
    mut payload: Multipart,
    max_upload_bytes: usize,
) -> Result<ComplaintForm, Error> {
    let mut form = ComplaintForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(|e| {
        log::error!("post_complaint: multipart read error: {}", e);
        error::ErrorBadRequest("Error interpreting user input.")
    })? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_owned();

        match name.as_str() {
            "csrf_token" => form.csrf_token = read_text_field(&mut field).await?,
            "subject" => form.subject = read_text_field(&mut field).await?,
            "severity" => form.severity = read_text_field(&mut field).await?,
            "details" => form.details = read_text_field(&mut field).await?,
            "anonymous" => form.anonymous = !read_text_field(&mut field).await?.is_empty(),
            "proof_file" => {
                let filename = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or_default()
                    .to_owned();
                let data = read_field(&mut field, max_upload_bytes).await?;
                // Browsers send an empty part when no file was chosen.
                if !filename.is_empty() {
                    form.proof = Some(UploadedProof { filename, data });
                }
            }
            _ => {
                read_field(&mut field, TEXT_FIELD_LIMIT).await?;
            }
        }
    }

    Ok(form)
}

#[get("/complaint")]
pub async fn view_complaint_form(
    client: ClientCtx,
    session: actix_session::Session,
    config: web::Data<AppConfig>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;

    Ok(ComplaintFormTemplate {
        client,
        flashes: flash::take(&session),
        max_upload_size_mb: config.limits.max_upload_size_mb,
    }
    .to_response())
}

#[post("/complaint")]
pub async fn post_complaint(
    client: ClientCtx,
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    config: web::Data<AppConfig>,
    mailer: web::Data<Arc<dyn Mailer>>,
    storage: web::Data<Arc<dyn StorageBackend>>,
    payload: Multipart,
) -> Result<HttpResponse, Error> {
    let student = client.require_login()?;

    let form = parse_complaint_form(payload, config.limits.max_upload_bytes()).await?;
    crate::middleware::csrf::validate_csrf_token(&session, &form.csrf_token)?;

    if let Err(message) = form.validate() {
        log::debug!("Complaint rejected: {}", message);
        flash::danger(&session, message);
        return Ok(redirect("/complaint"));
    }

    let proof_file = match form.proof {
        Some(proof) => {
            let stored_name = safe_upload_name(&proof.filename);
            let path = storage
                .put_object(proof.data, &stored_name)
                .await
                .map_err(|e| {
                    log::error!("post_complaint: put_object() {}", e);
                    error::ErrorInternalServerError("Failed to store upload")
                })?;
            Some(path)
        }
        None => None,
    };

    let submission = ComplaintSubmission {
        subject: form.subject,
        severity: form.severity,
        details: form.details,
        anonymous: form.anonymous,
        proof_file,
    };

    let submitted = match submit_complaint(
        db.get_ref(),
        mailer.get_ref().as_ref(),
        config.get_ref(),
        student,
        &submission,
    )
    .await
    {
        Ok(submitted) => submitted,
        Err(e) => {
            log::error!("post_complaint: submit_complaint() {}", e);
            if let Some(path) = &submission.proof_file {
                match storage.delete_object(path).await {
                    Ok(()) => log::info!("post_complaint: removed unsaved proof {}", path),
                    Err(e) => log::error!("post_complaint: orphaned proof {}: {}", path, e),
                }
            }
            return Err(error::ErrorInternalServerError("Failed to save complaint"));
        }
    };

    let complaint_id = submitted.complaint.id;
    if submitted.email_sent {
        flash::success(&session, "Complaint submitted and email sent to Admin!");
    } else {
        flash::warning(
            &session,
            format!(
                "Complaint #{} saved successfully, but email notification failed. Admin will still review it.",
                complaint_id
            ),
        );
    }

    Ok(redirect(&format!("/track/{}", complaint_id)))
}
