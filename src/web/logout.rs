use crate::middleware::ClientCtx;
use crate::session::logout_user;
use crate::web::redirect;
use actix_web::{get, Error, HttpResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_logout);
}

#[get("/logout")]
pub async fn view_logout(
    client: ClientCtx,
    session: actix_session::Session,
) -> Result<HttpResponse, Error> {
    let user = client.require_login()?;
    log::info!("User logged out: user_id={}", user.id);

    logout_user(&session);
    crate::flash::info(&session, "Logged out");

    Ok(redirect("/login"))
}
