use crate::flash::{self, FlashMessage};
use crate::middleware::ClientCtx;
use crate::orm::complaints;
use crate::web::redirect;
use actix_web::{error, get, post, web, Error, HttpResponse};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::{entity::*, DatabaseConnection};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_track_search)
        .service(post_track_search)
        .service(view_complaint);
}

#[derive(Template)]
#[template(path = "track.html")]
struct TrackTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
    complaint: complaints::Model,
}

impl TrackTemplate {
    fn created_at(&self) -> String {
        self.complaint
            .created_at
            .format("%Y-%m-%d %H:%M UTC")
            .to_string()
    }
}

#[derive(Template)]
#[template(path = "track_search.html")]
struct TrackSearchTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
}

#[derive(Deserialize)]
pub struct FormData {
    csrf_token: String,
    complaint_id: String,
}

/// Parses a user-entered complaint number, tolerating a leading `#`.
fn parse_complaint_id(input: &str) -> Option<i32> {
    input
        .trim()
        .trim_start_matches('#')
        .parse::<i32>()
        .ok()
        .filter(|id| *id > 0)
}

#[get("/track")]
pub async fn view_track_search(
    client: ClientCtx,
    session: actix_session::Session,
) -> Result<HttpResponse, Error> {
    client.require_login()?;

    Ok(TrackSearchTemplate {
        client,
        flashes: flash::take(&session),
    }
    .to_response())
}

#[post("/track")]
pub async fn post_track_search(
    client: ClientCtx,
    session: actix_session::Session,
    form: Option<web::Form<FormData>>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let form = form.ok_or_else(|| error::ErrorBadRequest("Error interpreting user input."))?;
    crate::middleware::csrf::validate_csrf_token(&session, &form.csrf_token)?;

    match parse_complaint_id(&form.complaint_id) {
        Some(id) => Ok(redirect(&format!("/track/{}", id))),
        None => {
            flash::danger(&session, "Please enter a valid complaint number.");
            Ok(redirect("/track"))
        }
    }
}

#[get("/track/{complaint_id}")]
pub async fn view_complaint(
    client: ClientCtx,
    session: actix_session::Session,
    db: web::Data<DatabaseConnection>,
    path: web::Path<i32>,
) -> Result<HttpResponse, Error> {
    client.require_login()?;
    let complaint_id = path.into_inner();

    let complaint = complaints::Entity::find_by_id(complaint_id)
        .one(db.get_ref())
        .await
        .map_err(|e| {
            log::error!("view_complaint: {}", e);
            error::ErrorInternalServerError("Could not look up complaint.")
        })?
        .ok_or_else(|| error::ErrorNotFound("Complaint not found."))?;

    Ok(TrackTemplate {
        client,
        flashes: flash::take(&session),
        complaint,
    }
    .to_response())
}
