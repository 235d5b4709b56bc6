//! Rendered error pages for [`actix_web::middleware::ErrorHandlers`].

use crate::flash::FlashMessage;
use crate::middleware::ClientCtx;
use actix_web::dev::ServiceResponse;
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{error, HttpMessage, HttpResponse, Result};
use askama_actix::Template;

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate {
    client: ClientCtx,
    flashes: Vec<FlashMessage>,
    status: u16,
    title: &'static str,
    message: &'static str,
}

pub fn render_403<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(
        res,
        "Forbidden",
        "Your form has expired. Please go back, reload the page and try again.",
    )
}

pub fn render_404<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(
        res,
        "Not Found",
        "The page you were looking for does not exist.",
    )
}

pub fn render_500<B>(res: ServiceResponse<B>) -> Result<ErrorHandlerResponse<B>> {
    render_error(
        res,
        "Server Error",
        "Something went wrong on our side. Please try again later.",
    )
}

fn render_error<B>(
    res: ServiceResponse<B>,
    title: &'static str,
    message: &'static str,
) -> Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let (req, _) = res.into_parts();
    let client = ClientCtx::get_or_default_from_extensions(&mut req.extensions_mut());

    let body = ErrorTemplate {
        client,
        flashes: Vec::new(),
        status: status.as_u16(),
        title,
        message,
    }
    .render()
    .map_err(|e| {
        log::error!("render_error: {}", e);
        error::ErrorInternalServerError("Failed to render error page")
    })?;

    let res = HttpResponse::build(status)
        .content_type("text/html; charset=utf-8")
        .body(body);

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, res).map_into_right_body(),
    ))
}
