use crate::app_config::AppConfig;
use crate::email::templates::send_test_email;
use crate::email::Mailer;
use actix_web::{error, get, web, Error, HttpResponse};
use std::sync::Arc;

pub(super) fn configure(conf: &mut actix_web::web::ServiceConfig) {
    conf.service(view_test_email);
}

/// Sends a test message to the administrator. Only routed in debug mode.
#[get("/test-email")]
pub async fn view_test_email(
    config: web::Data<AppConfig>,
    mailer: web::Data<Arc<dyn Mailer>>,
) -> Result<HttpResponse, Error> {
    if !config.site.debug {
        return Err(error::ErrorNotFound("Not found."));
    }

    match send_test_email(
        mailer.get_ref().as_ref(),
        &config.email.admin_address,
        &config.site.name,
    )
    .await
    {
        Ok(()) => {
            log::info!("Test email sent to {}", config.email.admin_address);
            Ok(HttpResponse::Ok()
                .content_type("text/plain; charset=utf-8")
                .body("Test email sent successfully!"))
        }
        Err(e) => {
            log::error!("Test email failed via {}: {}", mailer.describe(), e);
            Ok(HttpResponse::BadGateway()
                .content_type("text/plain; charset=utf-8")
                .body(format!("Email failed: {}", e)))
        }
    }
}
