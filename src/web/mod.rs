pub mod awareness;
pub mod complaint;
pub mod error;
pub mod index;
pub mod login;
pub mod logout;
pub mod polls;
pub mod register;
pub mod test_email;
pub mod track;

use actix_web::http::header;
use actix_web::HttpResponse;

/// Configures the web app by adding services from each web file.
///
/// @see https://docs.rs/actix-web/4.0.1/actix_web/struct.App.html#method.configure
pub fn configure(conf: &mut actix_web::web::ServiceConfig) {
    // Descending order. Order is important.
    // Route resolution will stop at the first match.
    index::configure(conf);
    register::configure(conf);
    login::configure(conf);
    logout::configure(conf);
    complaint::configure(conf);
    track::configure(conf);
    awareness::configure(conf);
    polls::configure(conf);
    test_email::configure(conf);
}

/// 302 to `location`, the answer to every successful form post.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .append_header((header::LOCATION, location))
        .finish()
}
