#[macro_use]
mod common;

use actix_web::http::StatusCode;
use actix_web::test::TestRequest;
use common::fixtures::TestContext;
use common::http::{body_string, CookieJar};
use common::mailer::RecordingMailer;

#[actix_rt::test]
async fn test_email_route_hidden_outside_debug() {
    let ctx = TestContext::new().await;
    let app = init_app!(ctx);
    let mut jar = CookieJar::default();

    let resp = send!(app, jar, TestRequest::get().uri("/test-email"));
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(ctx.mailer.sent().is_empty());
}

#[actix_rt::test]
async fn test_email_route_in_debug() {
    let mut ctx = TestContext::new().await;
    ctx.config.site.debug = true;
    let app = init_app!(ctx);
    let mut jar = CookieJar::default();

    let resp = send!(app, jar, TestRequest::get().uri("/test-email"));
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(body_string(resp).await.contains("sent"));

    let sent = ctx.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "admin@campus.test");
    assert_eq!(sent[0].subject, "Test Email");
}

#[actix_rt::test]
async fn test_email_route_reports_failure() {
    let mut ctx = TestContext::with_mailer(RecordingMailer::failing()).await;
    ctx.config.site.debug = true;
    ctx.config.email.smtp_password = "hunter2".to_owned();
    let app = init_app!(ctx);
    let mut jar = CookieJar::default();

    let resp = send!(app, jar, TestRequest::get().uri("/test-email"));
    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body = body_string(resp).await;
    assert!(body.starts_with("Email failed:"));
    assert!(!body.contains("hunter2"));
}
