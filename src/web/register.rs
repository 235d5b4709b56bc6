use crate::flash::{self, FlashMessage};
use crate::middleware::ClientCtx;
use crate::orm::users;
use crate::session::hash_password;
use crate::user::{find_by_email, normalize_email};
use crate::web::redirect;
use actix_web::{error, get, post, web, Error, HttpResponse, Responder};
use askama_actix::{Template, TemplateToResponse};
use sea_orm::{entity::*, DatabaseConnection, DbErr};
use serde::Deserialize;
use validator::Validate;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_register).service(post_register);
}

#[derive(Template)]
#[template(path = "register.html")]
struct RegisterTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
}

#[derive(Deserialize, Validate)]
pub struct FormData {
    csrf_token: String,
    #[validate(length(min = 1, max = 150))]
    name: String,
    #[validate(email)]
    email: String,
    #[validate(length(min = 8, max = 1000))]
    password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub enum RegisterOutcome {
    Created(i32),
    EmailTaken,
}

/// Inserts a user unless the email is already registered.
///
/// `password_hash` must already be a PHC string.
pub async fn register_user(
    db: &DatabaseConnection,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<RegisterOutcome, DbErr> {
    let email = normalize_email(email);

    if find_by_email(db, &email).await?.is_some() {
        return Ok(RegisterOutcome::EmailTaken);
    }

    let user = users::ActiveModel {
        name: Set(name.trim().to_owned()),
        email: Set(email.clone()),
        password: Set(password_hash.to_owned()),
        ..Default::default()
    };

    match user.insert(db).await {
        Ok(user) => Ok(RegisterOutcome::Created(user.id)),
        Err(e) => {
            // A concurrent registration may have won; the unique column rejected ours.
            if find_by_email(db, &email).await?.is_some() {
                Ok(RegisterOutcome::EmailTaken)
            } else {
                Err(e)
            }
        }
    }
}

#[get("/register")]
pub async fn view_register(client: ClientCtx, session: actix_session::Session) -> impl Responder {
    RegisterTemplate {
        client,
        flashes: flash::take(&session),
    }
    .to_response()
}

#[post("/register")]
pub async fn post_register(
    db: web::Data<DatabaseConnection>,
    session: actix_session::Session,
    form: web::Form<FormData>,
) -> Result<HttpResponse, Error> {
    crate::middleware::csrf::validate_csrf_token(&session, &form.csrf_token)?;

    if let Err(e) = form.validate() {
        log::debug!("User registration validation failed: {}", e);
        flash::danger(
            &session,
            "Please provide a name, a valid email and a password of at least 8 characters.",
        );
        return Ok(redirect("/register"));
    }

    let password_hash = hash_password(&form.password).map_err(|e| {
        log::error!("Failed to hash password: {}", e);
        error::ErrorInternalServerError("Failed to create user")
    })?;

    let outcome = register_user(db.get_ref(), &form.name, &form.email, &password_hash)
        .await
        .map_err(|e| {
            log::error!("Failed to create user: {}", e);
            error::ErrorInternalServerError("Failed to create user")
        })?;

    match outcome {
        RegisterOutcome::Created(user_id) => {
            log::info!("New user registered: {} (user_id: {})", form.name.trim(), user_id);
            flash::success(&session, "Registration successful. Please login.");
            Ok(redirect("/login"))
        }
        RegisterOutcome::EmailTaken => {
            log::debug!("Registration rejected, email already registered");
            flash::danger(&session, "Email already registered!");
            Ok(redirect("/register"))
        }
    }
}
