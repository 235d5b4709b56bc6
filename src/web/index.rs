use crate::flash::{self, FlashMessage};
use crate::middleware::ClientCtx;
use actix_web::{get, Responder};
use askama_actix::{Template, TemplateToResponse};

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_index);
}

#[derive(Template)]
#[template(path = "welcome.html")]
struct WelcomeTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
}

#[get("/")]
pub async fn view_index(client: ClientCtx, session: actix_session::Session) -> impl Responder {
    WelcomeTemplate {
        client,
        flashes: flash::take(&session),
    }
    .to_response()
}
