//! Shared helpers for integration tests
#![allow(dead_code)]
#![allow(unused_macros)]

pub mod database;
pub mod fixtures;
pub mod http;
pub mod mailer;

/// Builds the application service the way `main` does, around a [`TestContext`].
///
/// [`TestContext`]: fixtures::TestContext
macro_rules! init_app {
    ($ctx:expr) => {{
        use actix_web::http::StatusCode;
        use actix_web::middleware::ErrorHandlers;
        use actix_web::{test, web, App};

        let ctx = &$ctx;
        test::init_service(
            App::new()
                .app_data(web::Data::new(ctx.db.clone()))
                .app_data(web::Data::new(ctx.config.clone()))
                .app_data(web::Data::new(ctx.mailer_handle()))
                .app_data(web::Data::new(ctx.storage.clone()))
                .wrap(
                    ErrorHandlers::new()
                        .handler(StatusCode::FORBIDDEN, campus_shield::web::error::render_403)
                        .handler(StatusCode::NOT_FOUND, campus_shield::web::error::render_404)
                        .handler(
                            StatusCode::INTERNAL_SERVER_ERROR,
                            campus_shield::web::error::render_500,
                        ),
                )
                .wrap(campus_shield::middleware::ClientCtx::default())
                .wrap(campus_shield::session::session_middleware(
                    actix_web::cookie::Key::generate(),
                ))
                .configure(campus_shield::web::configure),
        )
        .await
    }};
}

/// Sends `$req` with the jar's cookies and remembers any cookies set in the response.
macro_rules! send {
    ($app:expr, $jar:expr, $req:expr) => {{
        let resp = actix_web::test::call_service(&$app, $jar.attach($req).to_request()).await;
        $jar.store(&resp);
        resp
    }};
}

/// GETs `$uri` and returns the csrf token from its form.
macro_rules! page_token {
    ($app:expr, $jar:expr, $uri:expr) => {{
        let resp = send!($app, $jar, actix_web::test::TestRequest::get().uri($uri));
        assert_eq!(resp.status(), actix_web::http::StatusCode::OK);
        common::http::csrf_token(&common::http::body_string(resp).await)
    }};
}

/// Logs in through the form and returns the session's csrf token.
macro_rules! login_as {
    ($app:expr, $jar:expr, $email:expr, $password:expr) => {{
        let token = page_token!($app, $jar, "/login");
        let resp = send!(
            $app,
            $jar,
            common::http::form(
                "/login",
                &[
                    ("csrf_token", token.as_str()),
                    ("email", AsRef::<str>::as_ref($email)),
                    ("password", AsRef::<str>::as_ref($password)),
                ],
            )
        );
        assert_eq!(common::http::location(&resp).as_deref(), Some("/awareness"));
        token
    }};
}
