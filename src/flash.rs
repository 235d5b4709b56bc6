//! One-shot messages carried in the session until the next rendered page.

use actix_session::Session;
use serde::{Deserialize, Serialize};

const FLASH_SESSION_KEY: &str = "_flashes";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Danger,
}

impl FlashLevel {
    pub fn css_class(&self) -> &'static str {
        match self {
            FlashLevel::Success => "flash-success",
            FlashLevel::Info => "flash-info",
            FlashLevel::Warning => "flash-warning",
            FlashLevel::Danger => "flash-danger",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub message: String,
}

/// Queues a message for the next rendered page.
pub fn push(session: &Session, level: FlashLevel, message: impl Into<String>) {
    let mut queued = session
        .get::<Vec<FlashMessage>>(FLASH_SESSION_KEY)
        .ok()
        .flatten()
        .unwrap_or_default();
    queued.push(FlashMessage {
        level,
        message: message.into(),
    });
    if let Err(e) = session.insert(FLASH_SESSION_KEY, queued) {
        log::error!("flash::push: session.insert() {}", e);
    }
}

pub fn success(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Success, message)
}

pub fn info(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Info, message)
}

pub fn warning(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Warning, message)
}

pub fn danger(session: &Session, message: impl Into<String>) {
    push(session, FlashLevel::Danger, message)
}

/// Removes and returns every queued message.
pub fn take(session: &Session) -> Vec<FlashMessage> {
    match session.remove_as::<Vec<FlashMessage>>(FLASH_SESSION_KEY) {
        Some(Ok(messages)) => messages,
        Some(Err(raw)) => {
            log::warn!("flash::take: discarding unreadable flashes: {}", raw);
            Vec::new()
        }
        None => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_session::SessionExt;
    use actix_web::test::TestRequest;

    #[test]
    fn test_take_drains_in_order() {
        let req = TestRequest::default().to_http_request();
        let session = req.get_session();

        success(&session, "saved");
        warning(&session, "mail failed");

        let taken = take(&session);
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].level, FlashLevel::Success);
        assert_eq!(taken[0].message, "saved");
        assert_eq!(taken[1].level, FlashLevel::Warning);

        assert!(take(&session).is_empty());
    }

    #[test]
    fn test_css_class() {
        assert_eq!(FlashLevel::Danger.css_class(), "flash-danger");
    }
}
