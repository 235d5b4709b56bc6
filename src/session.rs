//! Password hashing and cookie session identity.

use actix_session::{config::PersistentSession, storage::CookieSessionStore, Session, SessionMiddleware};
use actix_web::cookie::{Key, SameSite};
use actix_web::{error, Error};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use once_cell::sync::Lazy;

const USER_ID_KEY: &str = "user_id";

static ARGON2: Lazy<Argon2<'static>> = Lazy::new(Argon2::default);

pub fn get_argon2() -> &'static Argon2<'static> {
    &ARGON2
}

/// Hashes a password into a PHC string with a fresh salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    Ok(get_argon2()
        .hash_password(password.as_bytes(), &SaltString::generate(&mut OsRng))?
        .to_string())
}

/// Checks a password against a stored PHC string. Unparsable hashes never match.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => get_argon2()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            log::error!("verify_password: stored hash is malformed: {}", e);
            false
        }
    }
}

/// Cookie-backed session store signed with `key`.
pub fn session_middleware(key: Key) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_same_site(SameSite::Lax)
        .cookie_secure(false) // Allow HTTP for development
        .session_lifecycle(PersistentSession::default())
        .build()
}

/// Binds the session to a user.
pub fn login_user(session: &Session, user_id: i32) -> Result<(), Error> {
    session.renew();
    session
        .insert(USER_ID_KEY, user_id)
        .map_err(|_| error::ErrorInternalServerError("middleware error"))
}

/// Forgets the session's user. Other session state (flashes, CSRF token) survives.
pub fn logout_user(session: &Session) {
    session.remove(USER_ID_KEY);
}

/// Returns the user id stored in the session, if any.
pub fn get_user_id(session: &Session) -> Option<i32> {
    match session.get::<i32>(USER_ID_KEY) {
        Ok(id) => id,
        Err(e) => {
            log::debug!("get_user_id: unreadable session value: {}", e);
            None
        }
    }
}
