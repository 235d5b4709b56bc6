use crate::flash::{self, FlashMessage};
use crate::middleware::ClientCtx;
use crate::session::{login_user, verify_password};
use crate::user::find_by_email;
use crate::web::redirect;
use actix_web::{error, get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::{DatabaseConnection, DbErr};
use serde::Deserialize;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(post_login).service(view_login);
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub client: ClientCtx,
    pub flashes: Vec<FlashMessage>,
}

#[derive(Deserialize)]
pub struct FormData {
    csrf_token: String,
    email: String,
    password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum LoginResultStatus {
    Success,
    BadEmail,
    BadPassword,
}

pub struct LoginResult {
    pub result: LoginResultStatus,
    pub user_id: Option<i32>,
}

impl LoginResult {
    fn success(user_id: i32) -> Self {
        Self {
            result: LoginResultStatus::Success,
            user_id: Some(user_id),
        }
    }
    fn fail(result: LoginResultStatus) -> Self {
        Self {
            result,
            user_id: None,
        }
    }
}

/// Checks credentials without touching the session.
pub async fn login(db: &DatabaseConnection, email: &str, pass: &str) -> Result<LoginResult, DbErr> {
    let user = match find_by_email(db, email).await? {
        Some(user) => user,
        None => return Ok(LoginResult::fail(LoginResultStatus::BadEmail)),
    };

    if !verify_password(pass, &user.password) {
        return Ok(LoginResult::fail(LoginResultStatus::BadPassword));
    }

    Ok(LoginResult::success(user.id))
}

#[post("/login")]
pub async fn post_login(
    client: ClientCtx,
    db: web::Data<DatabaseConnection>,
    session: actix_session::Session,
    form: web::Form<FormData>,
) -> Result<HttpResponse, Error> {
    crate::middleware::csrf::validate_csrf_token(&session, &form.csrf_token)?;

    let result = login(db.get_ref(), &form.email, &form.password)
        .await
        .map_err(|e| {
            log::error!("error {:?}", e);
            error::ErrorInternalServerError("DB error")
        })?;

    match (result.result, result.user_id) {
        (LoginResultStatus::Success, Some(user_id)) => {
            login_user(&session, user_id)?;
            log::info!("User logged in: user_id={}", user_id);
            flash::success(&session, "Login successful!");
            Ok(redirect("/awareness"))
        }
        (status, _) => {
            log::debug!("login failure: {:?}", status);
            // Same message for both cases to avoid email enumeration.
            flash::danger(&session, "Invalid email or password");
            Ok(LoginTemplate {
                client,
                flashes: flash::take(&session),
            }
            .to_response())
        }
    }
}

#[get("/login")]
pub async fn view_login(client: ClientCtx, session: actix_session::Session) -> impl Responder {
    LoginTemplate {
        client,
        flashes: flash::take(&session),
    }
    .to_response()
}
