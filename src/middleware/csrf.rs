//! Per-session form tokens.
//!
//! [`ClientCtx`](super::ClientCtx) issues one token per session and templates
//! echo it back in a hidden `csrf_token` field:
//! ```html,ignore
//! <input type="hidden" name="csrf_token" value="{{ client.get_csrf_token() }}">
//! ```
//! POST handlers hand the submitted value to [`validate_csrf_token`] before
//! touching anything else.

use actix_session::Session;
use actix_web::{error, Error};
use rand::{distributions::Alphanumeric, Rng};

pub const CSRF_TOKEN_LENGTH: usize = 32;

const SESSION_KEY: &str = "csrf_token";

pub fn generate_csrf_token() -> String {
    let mut rng = rand::thread_rng();
    (0..CSRF_TOKEN_LENGTH)
        .map(|_| char::from(rng.sample(Alphanumeric)))
        .collect()
}

/// The token held by `session`, if one was issued and the cookie decodes.
fn stored_token(session: &Session) -> Option<String> {
    session.get::<String>(SESSION_KEY).unwrap_or_else(|e| {
        log::warn!("csrf: unreadable session token: {}", e);
        None
    })
}

/// Returns the session's token, issuing a fresh one on first use.
pub fn get_or_create_csrf_token(session: &Session) -> Result<String, Error> {
    if let Some(token) = stored_token(session) {
        return Ok(token);
    }

    let token = generate_csrf_token();
    session.insert(SESSION_KEY, &token).map_err(|e| {
        log::error!("csrf: session.insert() {}", e);
        error::ErrorInternalServerError("Could not start a form session.")
    })?;
    Ok(token)
}

/// Rejects with 403 unless `submitted` equals the session's token.
pub fn validate_csrf_token(session: &Session, submitted: &str) -> Result<(), Error> {
    match stored_token(session) {
        Some(expected) if !expected.is_empty() && expected == submitted => Ok(()),
        Some(_) => {
            log::warn!("csrf: submitted token does not match session");
            Err(error::ErrorForbidden("Form token mismatch."))
        }
        None => {
            log::warn!("csrf: form posted without a session token");
            Err(error::ErrorForbidden("Form session expired."))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::SessionExt;
    use actix_web::test::TestRequest;

    #[test]
    fn test_token_is_stable_per_session() {
        let req = TestRequest::default().to_http_request();
        let session = req.get_session();

        let first = get_or_create_csrf_token(&session).unwrap();
        let second = get_or_create_csrf_token(&session).unwrap();
        assert_eq!(first.len(), CSRF_TOKEN_LENGTH);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_eq!(first, second);
        assert!(validate_csrf_token(&session, &first).is_ok());
    }

    #[test]
    fn test_wrong_or_missing_token_rejected() {
        let req = TestRequest::default().to_http_request();
        let session = req.get_session();
        assert!(validate_csrf_token(&session, "anything").is_err());
        assert!(validate_csrf_token(&session, "").is_err());

        get_or_create_csrf_token(&session).unwrap();
        assert!(validate_csrf_token(&session, "not-the-token").is_err());
        assert!(validate_csrf_token(&session, "").is_err());
    }

    #[test]
    fn test_sessions_get_their_own_tokens() {
        let a = TestRequest::default().to_http_request();
        let b = TestRequest::default().to_http_request();
        let token_a = get_or_create_csrf_token(&a.get_session()).unwrap();
        let token_b = get_or_create_csrf_token(&b.get_session()).unwrap();

        assert_ne!(token_a, token_b);
        assert!(validate_csrf_token(&b.get_session(), &token_a).is_err());
    }
}
